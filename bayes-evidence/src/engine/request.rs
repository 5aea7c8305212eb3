//! Evidence requests and outcomes.

use serde::Serialize;

use super::selection::{TestKind, UnsupportedReason};
use crate::dataset::Mask;

/// What the outcome column is compared against.
#[derive(Debug, Clone)]
pub enum EvidenceRequest {
    /// Two groups given directly: mask `true` against mask `false`.
    TwoSample { mask: Mask },
    /// Groups or slope derived from a predictor column, optionally on a
    /// row subset.
    Predictor {
        x_field: String,
        mask: Option<Mask>,
    },
}

impl EvidenceRequest {
    /// Two-sample comparison on an explicit partition.
    pub fn two_sample(mask: Mask) -> Self {
        EvidenceRequest::TwoSample { mask }
    }

    /// Predictor-driven test over all rows.
    pub fn predictor(x_field: impl Into<String>) -> Self {
        EvidenceRequest::Predictor {
            x_field: x_field.into(),
            mask: None,
        }
    }

    /// Predictor-driven test restricted to the rows selected by `mask`.
    pub fn predictor_within(x_field: impl Into<String>, mask: Mask) -> Self {
        EvidenceRequest::Predictor {
            x_field: x_field.into(),
            mask: Some(mask),
        }
    }

    /// The predictor column, if any.
    pub fn x_field(&self) -> Option<&str> {
        match self {
            EvidenceRequest::TwoSample { .. } => None,
            EvidenceRequest::Predictor { x_field, .. } => Some(x_field),
        }
    }
}

/// Result of [`BayesFactorEngine::bayes_factor`](super::BayesFactorEngine::bayes_factor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvidenceOutcome {
    /// A test ran. `bayes_factor` is non-negative; a degenerate two-sample
    /// split yields exactly `0.0`.
    Evidence { bayes_factor: f64, test: TestKind },
    /// No test is defined for the dtype pair.
    Unsupported { reason: UnsupportedReason },
}

impl EvidenceOutcome {
    /// The Bayes factor, or `None` when unsupported.
    pub fn value(&self) -> Option<f64> {
        match self {
            EvidenceOutcome::Evidence { bayes_factor, .. } => Some(*bayes_factor),
            EvidenceOutcome::Unsupported { .. } => None,
        }
    }

    /// The test that ran, or `None` when unsupported.
    pub fn test(&self) -> Option<TestKind> {
        match self {
            EvidenceOutcome::Evidence { test, .. } => Some(*test),
            EvidenceOutcome::Unsupported { .. } => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, EvidenceOutcome::Unsupported { .. })
    }
}
