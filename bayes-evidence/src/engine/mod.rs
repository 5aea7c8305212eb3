//! Bayes factor engine.
//!
//! The engine resolves the dtypes of the outcome and predictor, selects a
//! test with [`select_test`], prepares the samples from the record batch and
//! asks its [`EvidenceBackend`] for the evidence.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, Int64Array};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use bayes_evidence::dtypes::{Dtype, DtypeTable};
//! use bayes_evidence::engine::{BayesFactorEngine, EvidenceRequest, TestKind};
//!
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("treated", DataType::Int64, false),
//!     Field::new("score", DataType::Float64, false),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Int64Array::from(vec![1, 1, 1, 1, 0, 0, 0, 0])),
//!         Arc::new(Float64Array::from(vec![2.1, 2.5, 1.9, 2.8, 0.2, 0.4, -0.1, 0.6])),
//!     ],
//! )
//! .unwrap();
//!
//! let dtypes: DtypeTable = [("treated", Dtype::Binary), ("score", Dtype::Numeric)]
//!     .into_iter()
//!     .collect();
//! let engine = BayesFactorEngine::new(dtypes);
//! let outcome = engine
//!     .bayes_factor(&batch, "score", &EvidenceRequest::predictor("treated"), false)
//!     .unwrap();
//! assert_eq!(outcome.test(), Some(TestKind::TwoSample));
//! assert!(outcome.value().unwrap() > 1.0);
//! ```

mod request;
mod selection;

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray};
use arrow::record_batch::RecordBatch;
use tracing::{debug, info, instrument};

use crate::backend::{EvidenceBackend, Formula, JzsBackend};
use crate::config::EvidenceConfig;
use crate::dataset::{
    check_mask_len, complete_pairs, filter_rows, flag_column, float_column, label_column,
};
use crate::dtypes::{Dtype, DtypeTable};
use crate::error::{EvidenceError, Result};

pub use request::{EvidenceOutcome, EvidenceRequest};
pub use selection::{select_test, TestKind, UnsupportedReason};

/// Smallest group the two-sample test is run on.
pub const MIN_GROUP_SIZE: usize = 2;

/// Selects and runs the test matching the dtypes of a field pair.
///
/// The dtype table is fixed at construction and never mutated, so a single
/// engine can be shared across threads.
pub struct BayesFactorEngine {
    dtypes: DtypeTable,
    backend: Arc<dyn EvidenceBackend>,
}

impl fmt::Debug for BayesFactorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BayesFactorEngine")
            .field("dtypes", &self.dtypes)
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn tag(dtype: Option<Dtype>) -> &'static str {
    dtype.map_or("none", |d| d.as_str())
}

impl BayesFactorEngine {
    /// Creates an engine with the default backend and priors.
    pub fn new(dtypes: DtypeTable) -> Self {
        Self::with_config(dtypes, EvidenceConfig::default())
    }

    /// Creates an engine with the default backend and the given priors.
    pub fn with_config(dtypes: DtypeTable, config: EvidenceConfig) -> Self {
        Self::with_backend(dtypes, Arc::new(JzsBackend::new(config)))
    }

    /// Creates an engine with a custom backend.
    pub fn with_backend(dtypes: DtypeTable, backend: Arc<dyn EvidenceBackend>) -> Self {
        Self { dtypes, backend }
    }

    /// The dtype table the engine was built with.
    pub fn dtypes(&self) -> &DtypeTable {
        &self.dtypes
    }

    /// The backend evidence is delegated to.
    pub fn backend(&self) -> &dyn EvidenceBackend {
        self.backend.as_ref()
    }

    /// Computes the Bayes factor of `y_field` against the request.
    ///
    /// Returns [`EvidenceOutcome::Unsupported`] when the outcome is not
    /// numeric. Fields missing from the dtype table are an error. With
    /// `verbose` the resolved dtype pair is logged at `info`.
    #[instrument(skip(self, data, request), fields(x_field = request.x_field()))]
    pub fn bayes_factor(
        &self,
        data: &RecordBatch,
        y_field: &str,
        request: &EvidenceRequest,
        verbose: bool,
    ) -> Result<EvidenceOutcome> {
        let y_type = self.dtypes.require(y_field)?;
        let x_type = request
            .x_field()
            .map(|x| self.dtypes.require(x))
            .transpose()?;

        if verbose {
            info!(x_type = tag(x_type), y_type = %y_type, "resolved dtype pair");
        } else {
            debug!(x_type = tag(x_type), y_type = %y_type, "resolved dtype pair");
        }

        let test = match select_test(x_type, y_type) {
            Ok(test) => test,
            Err(reason) => {
                debug!(%reason, "no test for dtype pair");
                return Ok(EvidenceOutcome::Unsupported { reason });
            }
        };

        match request {
            EvidenceRequest::TwoSample { mask } => {
                if mask.is_empty() {
                    return Err(EvidenceError::invalid_request(
                        "a two-sample request needs a non-empty mask",
                    ));
                }
                check_mask_len(mask, data.num_rows())?;
                self.two_sample(data, y_field, mask)
            }
            EvidenceRequest::Predictor { x_field, mask } => {
                let subset;
                let frame = match mask {
                    Some(mask) => {
                        subset = filter_rows(data, mask)?;
                        debug!(rows = subset.num_rows(), "filtered to masked rows");
                        &subset
                    }
                    None => data,
                };
                match test {
                    TestKind::TwoSample => {
                        let flags = flag_column(frame, x_field)?;
                        self.two_sample(frame, y_field, &flags)
                    }
                    TestKind::OneWay => self.one_way(frame, y_field, x_field),
                    TestKind::Regression => self.regression(frame, y_field, x_field),
                }
            }
        }
    }

    fn two_sample(
        &self,
        frame: &RecordBatch,
        y_field: &str,
        partition: &BooleanArray,
    ) -> Result<EvidenceOutcome> {
        let values = float_column(frame, y_field)?;
        let mut group_a = Vec::new();
        let mut group_b = Vec::new();
        for (value, in_a) in values.iter().zip(partition.iter()) {
            match (value, in_a) {
                (Some(v), Some(true)) => group_a.push(v),
                (Some(v), Some(false)) => group_b.push(v),
                _ => {}
            }
        }
        log_dropped(frame.num_rows(), group_a.len() + group_b.len());

        if group_a.len() < MIN_GROUP_SIZE || group_b.len() < MIN_GROUP_SIZE {
            debug!(
                n_a = group_a.len(),
                n_b = group_b.len(),
                "degenerate split, reporting zero evidence"
            );
            return Ok(EvidenceOutcome::Evidence {
                bayes_factor: 0.0,
                test: TestKind::TwoSample,
            });
        }

        let result = self.backend.two_sample(&group_a, &group_b)?;
        Ok(EvidenceOutcome::Evidence {
            bayes_factor: result.bayes_factor,
            test: TestKind::TwoSample,
        })
    }

    fn one_way(
        &self,
        frame: &RecordBatch,
        y_field: &str,
        x_field: &str,
    ) -> Result<EvidenceOutcome> {
        let values = float_column(frame, y_field)?;
        let labels = label_column(frame, x_field)?;
        let mut y = Vec::with_capacity(values.len());
        let mut groups = Vec::with_capacity(values.len());
        for (value, label) in values.iter().zip(labels.iter()) {
            if let (Some(v), Some(l)) = (value, label) {
                y.push(v);
                groups.push(l.to_string());
            }
        }
        log_dropped(frame.num_rows(), y.len());

        let formula = Formula::new(y_field, x_field)?;
        let table = self.backend.one_way(&formula, &y, &groups)?;
        let entry = table.require(formula.predictor())?;
        Ok(EvidenceOutcome::Evidence {
            bayes_factor: entry.bayes_factor,
            test: TestKind::OneWay,
        })
    }

    fn regression(
        &self,
        frame: &RecordBatch,
        y_field: &str,
        x_field: &str,
    ) -> Result<EvidenceOutcome> {
        let values = float_column(frame, y_field)?;
        let predictor = float_column(frame, x_field)?;
        let (y, x) = complete_pairs(&values, &predictor);
        log_dropped(frame.num_rows(), y.len());

        let formula = Formula::new(y_field, x_field)?;
        let table = self.backend.regression(&formula, &y, &x)?;
        let entry = table.require(formula.predictor())?;
        Ok(EvidenceOutcome::Evidence {
            bayes_factor: entry.bayes_factor,
            test: TestKind::Regression,
        })
    }
}

fn log_dropped(rows: usize, kept: usize) {
    if kept < rows {
        debug!(dropped = rows - kept, "rows with missing values excluded");
    }
}
