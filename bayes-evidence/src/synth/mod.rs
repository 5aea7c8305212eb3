//! Synthetic mixed-type datasets.
//!
//! [`SyntheticData`] is threaded through a chain of sampling calls. Each call
//! generates a block of columns of one dtype and merges it into the dataset:
//! the first block becomes the dataset, later blocks are appended, and a
//! masked block overwrites only the selected rows of existing columns.
//!
//! ```rust
//! use bayes_evidence::dtypes::Dtype;
//! use bayes_evidence::synth::{Columns, Regressor, SampleOptions, SyntheticData};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let synth = SyntheticData::new()
//!     .sample_binary(&mut rng, 0.5, 100, Columns::Count(1), SampleOptions::default())
//!     .unwrap()
//!     .sample_numeric(
//!         &mut rng,
//!         0.0,
//!         1.0,
//!         Some(&Regressor::new("binary_0", 2.0)),
//!         100,
//!         Columns::Count(2),
//!         SampleOptions::default(),
//!     )
//!     .unwrap();
//!
//! let data = synth.data().unwrap();
//! assert_eq!(data.num_rows(), 100);
//! assert_eq!(synth.dtypes().columns_of(Dtype::Numeric), vec!["numeric_0", "numeric_1"]);
//! ```

mod naming;

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::kernels::filter::prep_null_mask_filter;
use arrow::compute::kernels::zip::zip;
use arrow::datatypes::Field;
use arrow::record_batch::RecordBatch;
use rand::distr::weighted::WeightedIndex;
use rand::distr::{Bernoulli, Distribution};
use rand::Rng;
use rand_distr::Normal;
use tracing::{debug, instrument};

use crate::dataset::{
    batch_from_columns, cast_strict, check_mask_len, column, float_column, upsert_column, Mask,
};
use crate::dtypes::{Dtype, DtypeTable};
use crate::error::{EvidenceError, Result};

pub use naming::Columns;
use naming::{resolve_names, NameCounters};

/// Per-call options shared by all samplers.
#[derive(Debug, Clone, Default)]
pub struct SampleOptions {
    /// Rows to overwrite in existing columns. Unselected rows are kept.
    pub mask: Option<Mask>,
    /// Names that take precedence over the `columns` argument.
    pub column_names: Option<Vec<String>>,
}

impl SampleOptions {
    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Linear dependence of a numeric block on an existing column.
#[derive(Debug, Clone, PartialEq)]
pub struct Regressor {
    pub column: String,
    pub slope: f64,
}

impl Regressor {
    pub fn new(column: impl Into<String>, slope: f64) -> Self {
        Self {
            column: column.into(),
            slope,
        }
    }
}

/// A synthetic dataset under construction, with its dtype table.
#[derive(Debug, Clone, Default)]
pub struct SyntheticData {
    data: Option<RecordBatch>,
    dtypes: DtypeTable,
    counters: NameCounters,
}

impl SyntheticData {
    /// An empty builder with no dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The dataset so far, if any block has been sampled.
    pub fn data(&self) -> Option<&RecordBatch> {
        self.data.as_ref()
    }

    /// Dtype of every column produced so far.
    pub fn dtypes(&self) -> &DtypeTable {
        &self.dtypes
    }

    /// Row count, fixed by the first block.
    pub fn num_rows(&self) -> Option<usize> {
        self.data.as_ref().map(RecordBatch::num_rows)
    }

    pub fn into_parts(self) -> (Option<RecordBatch>, DtypeTable) {
        (self.data, self.dtypes)
    }

    /// Samples Bernoulli(`p`) columns stored as 0/1 `Int64`.
    #[instrument(skip(self, rng, columns, options), fields(dtype = "binary"))]
    pub fn sample_binary<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        p: f64,
        rows: usize,
        columns: Columns,
        options: SampleOptions,
    ) -> Result<Self> {
        let dist = Bernoulli::new(p)
            .map_err(|e| EvidenceError::invalid_parameter(format!("binary p = {p}: {e}")))?;
        let names = self.prepare(Dtype::Binary, rows, &columns, &options)?;

        let arrays = names
            .iter()
            .map(|_| {
                let values =
                    Int64Array::from_iter_values((0..rows).map(|_| i64::from(dist.sample(rng))));
                Arc::new(values) as ArrayRef
            })
            .collect();
        self.merge(Dtype::Binary, names, arrays, rows, options.mask.as_ref())
    }

    /// Samples categorical columns over `p.len()` levels, labelled `"0".."K-1"`.
    #[instrument(skip(self, rng, columns, options), fields(dtype = "nominal"))]
    pub fn sample_nominal<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        p: &[f64],
        rows: usize,
        columns: Columns,
        options: SampleOptions,
    ) -> Result<Self> {
        let dist = categorical(Dtype::Nominal, p)?;
        let names = self.prepare(Dtype::Nominal, rows, &columns, &options)?;

        let arrays = names
            .iter()
            .map(|_| {
                let labels: StringArray = (0..rows)
                    .map(|_| Some(dist.sample(rng).to_string()))
                    .collect();
                Arc::new(labels) as ArrayRef
            })
            .collect();
        self.merge(Dtype::Nominal, names, arrays, rows, options.mask.as_ref())
    }

    /// Samples categorical columns over `p.len()` levels, stored as `0..K-1`.
    #[instrument(skip(self, rng, columns, options), fields(dtype = "ordinal"))]
    pub fn sample_ordinal<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        p: &[f64],
        rows: usize,
        columns: Columns,
        options: SampleOptions,
    ) -> Result<Self> {
        let dist = categorical(Dtype::Ordinal, p)?;
        let names = self.prepare(Dtype::Ordinal, rows, &columns, &options)?;

        let arrays = names
            .iter()
            .map(|_| {
                let levels =
                    Int64Array::from_iter_values((0..rows).map(|_| dist.sample(rng) as i64));
                Arc::new(levels) as ArrayRef
            })
            .collect();
        self.merge(Dtype::Ordinal, names, arrays, rows, options.mask.as_ref())
    }

    /// Samples Gaussian columns.
    ///
    /// With a `regressor` and an existing dataset, row `i` is shifted by
    /// `slope * regressor[i]`. A null regressor value yields a null cell.
    /// Without a dataset the regressor is ignored.
    #[instrument(skip(self, rng, columns, options), fields(dtype = "numeric"))]
    #[allow(clippy::too_many_arguments)]
    pub fn sample_numeric<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        mean: f64,
        std: f64,
        regressor: Option<&Regressor>,
        rows: usize,
        columns: Columns,
        options: SampleOptions,
    ) -> Result<Self> {
        if !mean.is_finite() {
            return Err(EvidenceError::invalid_parameter(format!(
                "numeric mean must be finite, got {mean}"
            )));
        }
        if std.is_nan() || std < 0.0 {
            return Err(EvidenceError::invalid_parameter(format!(
                "numeric std must be non-negative, got {std}"
            )));
        }
        let dist = Normal::new(mean, std).map_err(|e| {
            EvidenceError::invalid_parameter(format!("numeric std = {std}: {e}"))
        })?;
        let names = self.prepare(Dtype::Numeric, rows, &columns, &options)?;

        let offsets = match (regressor, &self.data) {
            (Some(regressor), Some(data)) => {
                if !regressor.slope.is_finite() {
                    return Err(EvidenceError::invalid_parameter(format!(
                        "regressor slope must be finite, got {}",
                        regressor.slope
                    )));
                }
                let x = float_column(data, &regressor.column)?;
                Some((x, regressor.slope))
            }
            (Some(regressor), None) => {
                debug!(column = %regressor.column, "no dataset yet, regressor ignored");
                None
            }
            (None, _) => None,
        };

        let arrays = names
            .iter()
            .map(|_| {
                let values: Float64Array = (0..rows)
                    .map(|row| {
                        let noise = dist.sample(rng);
                        match &offsets {
                            Some((x, slope)) => {
                                x.is_valid(row).then(|| noise + slope * x.value(row))
                            }
                            None => Some(noise),
                        }
                    })
                    .collect();
                Arc::new(values) as ArrayRef
            })
            .collect();
        self.merge(Dtype::Numeric, names, arrays, rows, options.mask.as_ref())
    }

    /// Validates shapes and resolves the block's column names.
    fn prepare(
        &mut self,
        dtype: Dtype,
        rows: usize,
        columns: &Columns,
        options: &SampleOptions,
    ) -> Result<Vec<String>> {
        if let Some(existing) = self.num_rows() {
            if existing != rows {
                return Err(EvidenceError::ShapeMismatch {
                    expected: existing,
                    found: rows,
                });
            }
        }
        if let Some(mask) = &options.mask {
            check_mask_len(mask, rows)?;
        }

        let taken: HashSet<String> = self
            .data
            .as_ref()
            .map(|data| {
                data.schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect()
            })
            .unwrap_or_default();
        resolve_names(
            dtype,
            columns,
            options.column_names.as_deref(),
            &mut self.counters,
            &taken,
        )
    }

    fn merge(
        mut self,
        dtype: Dtype,
        names: Vec<String>,
        arrays: Vec<ArrayRef>,
        rows: usize,
        mask: Option<&Mask>,
    ) -> Result<Self> {
        let mut data = match self.data.take() {
            Some(data) => data,
            None if mask.is_some() && !names.is_empty() => {
                return Err(EvidenceError::column_not_found(&names[0]));
            }
            None => {
                debug!(rows, columns = names.len(), "first block becomes the dataset");
                let fields = names
                    .iter()
                    .zip(&arrays)
                    .map(|(name, array)| {
                        Field::new(name, array.data_type().clone(), array.null_count() > 0)
                    })
                    .collect();
                self.data = Some(batch_from_columns(fields, arrays, rows)?);
                self.record(dtype, names);
                return Ok(self);
            }
        };

        match mask {
            Some(mask) => {
                let mask = if mask.null_count() > 0 {
                    prep_null_mask_filter(mask)
                } else {
                    mask.clone()
                };
                debug!(
                    selected = mask.true_count(),
                    columns = names.len(),
                    "overwriting masked rows"
                );
                for (name, block) in names.iter().zip(&arrays) {
                    let existing = cast_strict(column(&data, name)?, name, &dtype.storage_type())?;
                    let merged = zip(&mask, block, &existing)?;
                    data = upsert_column(&data, name, merged)?;
                }
            }
            None => {
                debug!(columns = names.len(), "appending block");
                for (name, block) in names.iter().zip(arrays) {
                    data = upsert_column(&data, name, block)?;
                }
            }
        }

        self.data = Some(data);
        self.record(dtype, names);
        Ok(self)
    }

    fn record(&mut self, dtype: Dtype, names: Vec<String>) {
        for name in names {
            self.counters.observe(&name);
            if let Some(previous) = self.dtypes.set(name.clone(), dtype) {
                if previous != dtype {
                    debug!(column = %name, from = %previous, to = %dtype, "dtype changed");
                }
            }
        }
    }
}

fn categorical(dtype: Dtype, p: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(p)
        .map_err(|e| EvidenceError::invalid_parameter(format!("{dtype} weights {p:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, BooleanArray};
    use arrow::datatypes::{DataType, Float64Type, Int64Type};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn opts() -> SampleOptions {
        SampleOptions::default()
    }

    #[test]
    fn test_storage_types_per_dtype() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_binary(&mut rng, 0.3, 20, Columns::Count(1), opts())
            .unwrap()
            .sample_nominal(&mut rng, &[0.2, 0.5, 0.3], 20, Columns::Count(1), opts())
            .unwrap()
            .sample_ordinal(
                &mut rng,
                &[1.0, 1.0, 1.0, 1.0],
                20,
                Columns::Count(1),
                opts(),
            )
            .unwrap()
            .sample_numeric(&mut rng, 5.0, 1.0, None, 20, Columns::Count(1), opts())
            .unwrap();

        let data = synth.data().unwrap();
        let schema = data.schema();
        assert_eq!(schema.field(0).name(), "binary_0");
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Int64);
        assert_eq!(schema.field(3).data_type(), &DataType::Float64);

        let binary = data.column(0).as_primitive::<Int64Type>();
        assert!(binary.values().iter().all(|v| *v == 0 || *v == 1));
        let nominal = data.column(1).as_string::<i32>();
        assert!(nominal.iter().all(|l| matches!(l, Some("0" | "1" | "2"))));
        let ordinal = data.column(2).as_primitive::<Int64Type>();
        assert!(ordinal.values().iter().all(|v| (0..4).contains(v)));

        for (name, dtype) in synth.dtypes().iter() {
            assert_eq!(schema.field_with_name(name).unwrap().data_type(), &dtype.storage_type());
        }
    }

    #[test]
    fn test_auto_naming_continues() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_numeric(&mut rng, 0.0, 1.0, None, 10, Columns::Count(2), opts())
            .unwrap()
            .sample_numeric(&mut rng, 0.0, 1.0, None, 10, Columns::Count(3), opts())
            .unwrap();
        let names: Vec<String> = synth
            .data()
            .unwrap()
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            vec!["numeric_0", "numeric_1", "numeric_2", "numeric_3", "numeric_4"]
        );
    }

    #[test]
    fn test_named_columns_are_skipped_by_counter() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_binary(&mut rng, 0.5, 5, Columns::names(["binary_0"]), opts())
            .unwrap()
            .sample_binary(&mut rng, 0.5, 5, Columns::Count(1), opts())
            .unwrap();
        assert_eq!(synth.dtypes().columns_of(Dtype::Binary), vec!["binary_0", "binary_1"]);
    }

    #[test]
    fn test_auto_naming_continues_past_highest_named_index() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_numeric(
                &mut rng,
                0.0,
                1.0,
                None,
                5,
                Columns::names(["numeric_7"]),
                opts(),
            )
            .unwrap()
            .sample_numeric(&mut rng, 0.0, 1.0, None, 5, Columns::Count(2), opts())
            .unwrap();
        assert_eq!(
            synth.dtypes().columns_of(Dtype::Numeric),
            vec!["numeric_7", "numeric_8", "numeric_9"]
        );

        let synth = synth
            .sample_ordinal(
                &mut rng,
                &[0.5, 0.5],
                5,
                Columns::Count(1),
                opts().with_column_names(["ordinal_4"]),
            )
            .unwrap()
            .sample_ordinal(&mut rng, &[0.5, 0.5], 5, Columns::Count(1), opts())
            .unwrap();
        assert_eq!(
            synth.dtypes().columns_of(Dtype::Ordinal),
            vec!["ordinal_4", "ordinal_5"]
        );
    }

    #[test]
    fn test_zero_columns_keeps_rows() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_ordinal(&mut rng, &[0.5, 0.5], 12, Columns::Count(0), opts())
            .unwrap();
        assert_eq!(synth.num_rows(), Some(12));
        assert!(synth.dtypes().is_empty());

        let synth = synth
            .sample_numeric(&mut rng, 0.0, 1.0, None, 12, Columns::Count(0), opts())
            .unwrap();
        assert_eq!(synth.data().unwrap().num_columns(), 0);
    }

    #[test]
    fn test_masked_overwrite_keeps_unmasked_rows() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_numeric(&mut rng, 0.0, 1.0, None, 6, Columns::Count(1), opts())
            .unwrap();
        let before = synth.data().unwrap().column(0).as_primitive::<Float64Type>().clone();

        // A null mask entry keeps the existing value.
        let mask = BooleanArray::from(vec![
            Some(true),
            Some(false),
            None,
            Some(true),
            Some(false),
            Some(false),
        ]);
        let synth = synth
            .sample_numeric(
                &mut rng,
                100.0,
                0.1,
                None,
                6,
                Columns::names(["numeric_0"]),
                opts().with_mask(mask),
            )
            .unwrap();

        let after = synth.data().unwrap().column(0).as_primitive::<Float64Type>();
        for row in [1, 2, 4, 5] {
            assert_eq!(after.value(row).to_bits(), before.value(row).to_bits());
        }
        for row in [0, 3] {
            assert!(after.value(row) > 90.0);
        }
        assert_eq!(synth.data().unwrap().num_columns(), 1);
    }

    #[test]
    fn test_masked_overwrite_changes_dtype() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_ordinal(&mut rng, &[0.0, 1.0], 4, Columns::names(["level"]), opts())
            .unwrap()
            .sample_numeric(
                &mut rng,
                -50.0,
                0.0,
                None,
                4,
                Columns::names(["level"]),
                opts().with_mask(BooleanArray::from(vec![true, false, false, false])),
            )
            .unwrap();

        assert_eq!(synth.dtypes().get("level"), Some(Dtype::Numeric));
        let level = synth.data().unwrap().column(0).as_primitive::<Float64Type>();
        assert_eq!(level.values().to_vec(), vec![-50.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_regressor_offsets_rows() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_ordinal(
                &mut rng,
                &[1.0, 1.0, 1.0],
                30,
                Columns::names(["x"]),
                opts(),
            )
            .unwrap()
            .sample_numeric(
                &mut rng,
                1.0,
                0.0,
                Some(&Regressor::new("x", 10.0)),
                30,
                Columns::names(["y"]),
                opts(),
            )
            .unwrap();
        let data = synth.data().unwrap();
        let x = data.column(0).as_primitive::<Int64Type>();
        let y = data.column(1).as_primitive::<Float64Type>();
        for row in 0..30 {
            assert_eq!(y.value(row), 1.0 + 10.0 * x.value(row) as f64);
        }
    }

    #[test]
    fn test_regressor_ignored_without_dataset() {
        let mut rng = rng();
        let synth = SyntheticData::new()
            .sample_numeric(
                &mut rng,
                3.0,
                0.0,
                Some(&Regressor::new("nope", 1.0)),
                3,
                Columns::Count(1),
                opts(),
            )
            .unwrap();
        let y = synth.data().unwrap().column(0).as_primitive::<Float64Type>();
        assert_eq!(y.values().to_vec(), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_validation_errors() {
        let mut rng = rng();
        let base = SyntheticData::new()
            .sample_binary(&mut rng, 0.5, 8, Columns::Count(1), opts())
            .unwrap();

        let err = base
            .clone()
            .sample_binary(&mut rng, 1.5, 8, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidParameter(_)));

        let err = base
            .clone()
            .sample_nominal(&mut rng, &[0.0, 0.0], 8, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidParameter(_)));

        let err = base
            .clone()
            .sample_ordinal(&mut rng, &[-1.0, 2.0], 8, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidParameter(_)));

        let err = base
            .clone()
            .sample_numeric(&mut rng, 0.0, -1.0, None, 8, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidParameter(_)));
        assert!(err.to_string().contains("non-negative"));

        let err = base
            .clone()
            .sample_numeric(&mut rng, 0.0, f64::NAN, None, 8, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidParameter(_)));

        let err = base
            .clone()
            .sample_binary(&mut rng, 0.5, 9, Columns::Count(1), opts())
            .unwrap_err();
        assert!(matches!(
            err,
            EvidenceError::ShapeMismatch {
                expected: 8,
                found: 9
            }
        ));

        let short = BooleanArray::from(vec![true; 3]);
        let err = base
            .clone()
            .sample_binary(&mut rng, 0.5, 8, Columns::Count(1), opts().with_mask(short))
            .unwrap_err();
        assert!(matches!(err, EvidenceError::ShapeMismatch { .. }));

        let mask = BooleanArray::from(vec![true; 8]);
        let err = base
            .clone()
            .sample_binary(
                &mut rng,
                0.5,
                8,
                Columns::names(["absent"]),
                opts().with_mask(mask),
            )
            .unwrap_err();
        assert!(matches!(err, EvidenceError::ColumnNotFound { .. }));

        let err = base
            .sample_numeric(
                &mut rng,
                0.0,
                1.0,
                Some(&Regressor::new("absent", 1.0)),
                8,
                Columns::Count(1),
                opts(),
            )
            .unwrap_err();
        assert!(matches!(err, EvidenceError::ColumnNotFound { .. }));
    }
}
