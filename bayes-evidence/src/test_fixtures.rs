//! Canned datasets for engine tests, benches and calibration runs.
//!
//! Each small fixture comes with the log Bayes factor the default priors
//! give for it, accurate to about six digits.

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dtypes::{Dtype, DtypeTable};
use crate::error::Result;
use crate::synth::{Columns, Regressor, SampleOptions, SyntheticData};

/// `ln BF10` of `score` split by `treated` (or by `group`) in [`two_group_batch`].
pub const TWO_GROUP_LOG_BF: f64 = 2.247009;

/// `BF10` of `response` across `arm` in [`three_group_batch`].
pub const THREE_GROUP_BF: f64 = 23008.01;

/// `ln BF10` of `response` on `dose` in [`dose_response_batch`].
pub const DOSE_RESPONSE_LOG_BF: f64 = 12.553844;

/// Thirteen rows, seven treated. Columns: `treated` (binary), `group`
/// (nominal, same split as `treated`) and `score` (numeric).
pub fn two_group_batch() -> Result<(RecordBatch, DtypeTable)> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("treated", DataType::Int64, false),
        Field::new("group", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
    ]));

    let treated: Vec<i64> = [1; 7].into_iter().chain([0; 6]).collect();
    let group: Vec<&str> = treated
        .iter()
        .map(|t| if *t == 1 { "treated" } else { "control" })
        .collect();
    let score = vec![
        1.2, 0.4, 2.2, 1.9, 0.7, 1.4, 2.5, // treated
        0.1, -0.3, 0.8, 0.2, -1.0, 0.5, // control
    ];

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(treated)),
            Arc::new(StringArray::from(group)),
            Arc::new(Float64Array::from(score)),
        ],
    )?;

    let dtypes = [
        ("treated", Dtype::Binary),
        ("group", Dtype::Nominal),
        ("score", Dtype::Numeric),
    ]
    .into_iter()
    .collect();
    Ok((batch, dtypes))
}

/// Nine rows in three well separated arms `a`, `b`, `c`.
pub fn three_group_batch() -> Result<(RecordBatch, DtypeTable)> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("arm", DataType::Utf8, false),
        Field::new("response", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![
                "a", "a", "a", "b", "b", "b", "c", "c", "c",
            ])),
            Arc::new(Float64Array::from(vec![
                1.0, 1.2, 0.9, 3.0, 3.2, 2.8, 5.1, 4.9, 5.0,
            ])),
        ],
    )?;

    let dtypes = [("arm", Dtype::Nominal), ("response", Dtype::Numeric)]
        .into_iter()
        .collect();
    Ok((batch, dtypes))
}

/// Eight rows with a near-linear response to an ordinal dose `1..=8`.
pub fn dose_response_batch() -> Result<(RecordBatch, DtypeTable)> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("dose", DataType::Int64, false),
        Field::new("response", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from((1..=8).collect::<Vec<i64>>())),
            Arc::new(Float64Array::from(vec![
                1.0, 2.1, 2.9, 4.2, 5.1, 5.8, 7.2, 8.1,
            ])),
        ],
    )?;

    let dtypes = [("dose", Dtype::Ordinal), ("response", Dtype::Numeric)]
        .into_iter()
        .collect();
    Ok((batch, dtypes))
}

/// A seeded synthetic dataset with one column of every dtype.
///
/// `numeric_0` depends on `binary_0` with the given slope; `numeric_1` is
/// independent noise.
pub fn mixed_dataset(rows: usize, slope: f64, seed: u64) -> Result<SyntheticData> {
    let mut rng = StdRng::seed_from_u64(seed);
    SyntheticData::new()
        .sample_binary(
            &mut rng,
            0.5,
            rows,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_nominal(
            &mut rng,
            &[0.3, 0.3, 0.4],
            rows,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_ordinal(
            &mut rng,
            &[0.25, 0.25, 0.25, 0.25],
            rows,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_numeric(
            &mut rng,
            0.0,
            1.0,
            Some(&Regressor::new("binary_0", slope)),
            rows,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_numeric(
            &mut rng,
            0.0,
            1.0,
            None,
            rows,
            Columns::Count(1),
            SampleOptions::default(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_dtypes_cover_columns() {
        for fixture in [two_group_batch, three_group_batch, dose_response_batch] {
            let (batch, dtypes) = fixture().unwrap();
            assert_eq!(batch.num_columns(), dtypes.len());
            for field in batch.schema().fields() {
                assert!(dtypes.contains(field.name()));
            }
        }
    }

    #[test]
    fn test_mixed_dataset_shape() {
        let synth = mixed_dataset(50, 1.0, 3).unwrap();
        assert_eq!(synth.num_rows(), Some(50));
        assert_eq!(synth.dtypes().len(), 5);
        assert_eq!(synth.dtypes().get("numeric_1"), Some(Dtype::Numeric));
    }
}
