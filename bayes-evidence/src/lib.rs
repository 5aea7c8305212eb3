//! # bayes-evidence - dtype-driven Bayes factors on Arrow data
//!
//! bayes-evidence computes the Bayes factor (alternative over null) for a
//! pair of columns in an Arrow [`RecordBatch`](arrow::record_batch::RecordBatch).
//! Which test runs is decided by the declared semantic dtype of each column,
//! not by its storage type:
//!
//! | predictor | outcome | test |
//! |---|---|---|
//! | explicit mask | numeric | two-sample |
//! | binary | numeric | two-sample |
//! | nominal | numeric | one-way |
//! | ordinal, numeric | numeric | regression |
//!
//! Every other combination is reported as
//! [`EvidenceOutcome::Unsupported`](engine::EvidenceOutcome::Unsupported).
//!
//! A companion builder, [`SyntheticData`](synth::SyntheticData), generates
//! mixed-type datasets with known structure for calibrating the engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use bayes_evidence::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> bayes_evidence::Result<()> {
//! let mut rng = StdRng::seed_from_u64(11);
//! let (data, dtypes) = SyntheticData::new()
//!     .sample_binary(&mut rng, 0.5, 200, Columns::Count(1), SampleOptions::default())?
//!     .sample_numeric(
//!         &mut rng,
//!         0.0,
//!         1.0,
//!         Some(&Regressor::new("binary_0", 1.5)),
//!         200,
//!         Columns::Count(1),
//!         SampleOptions::default(),
//!     )?
//!     .into_parts();
//! let data = data.expect("two blocks were sampled");
//!
//! let engine = BayesFactorEngine::new(dtypes);
//! let outcome = engine.bayes_factor(
//!     &data,
//!     "numeric_0",
//!     &EvidenceRequest::predictor("binary_0"),
//!     false,
//! )?;
//! assert_eq!(outcome.test(), Some(TestKind::TwoSample));
//! assert!(outcome.value().unwrap() > 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`dtypes`**: the [`Dtype`](dtypes::Dtype) tag and the dtype table
//! - **`engine`**: test selection and sample preparation
//! - **`backend`**: the [`EvidenceBackend`](backend::EvidenceBackend) seam and
//!   the bundled JZS implementation
//! - **`synth`**: the synthetic dataset builder
//! - **`config`**: prior scales and quadrature settings
//! - **`dataset`**: column access and casting helpers

pub mod backend;
pub mod config;
pub mod dataset;
pub mod dtypes;
pub mod engine;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod synth;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

pub use error::{EvidenceError, Result};
