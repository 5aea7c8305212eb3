//! Prelude for commonly used types and traits in bayes-evidence.

pub use crate::backend::{
    CaptureSink, DiagnosticSink, EvidenceBackend, Formula, JzsBackend, TracingSink,
};
pub use crate::config::{EvidenceConfig, PriorScale};
pub use crate::dataset::Mask;
pub use crate::dtypes::{Dtype, DtypeTable};
pub use crate::engine::{BayesFactorEngine, EvidenceOutcome, EvidenceRequest, TestKind};
pub use crate::error::{EvidenceError, Result};
pub use crate::synth::{Columns, Regressor, SampleOptions, SyntheticData};
