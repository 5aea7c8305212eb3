//! Dtype-driven test selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dtypes::Dtype;

/// Statistical test the engine runs for a dtype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Two independent groups, t-test analogue
    TwoSample,
    /// Grouping factor, one-way ANOVA analogue
    OneWay,
    /// Continuous or ordinal predictor, linear regression
    Regression,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::TwoSample => "two_sample",
            TestKind::OneWay => "one_way",
            TestKind::Regression => "regression",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why no test applies to a dtype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedReason {
    /// Only numeric outcomes are supported
    OutcomeNotNumeric { outcome: Dtype },
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::OutcomeNotNumeric { outcome } => {
                write!(f, "outcome dtype '{outcome}' is not numeric")
            }
        }
    }
}

/// Picks the test for an outcome of dtype `y` and an optional predictor of
/// dtype `x`. `None` means the groups come from an explicit mask.
pub fn select_test(x: Option<Dtype>, y: Dtype) -> Result<TestKind, UnsupportedReason> {
    match (x, y) {
        (_, Dtype::Binary | Dtype::Nominal | Dtype::Ordinal) => {
            Err(UnsupportedReason::OutcomeNotNumeric { outcome: y })
        }
        (None, Dtype::Numeric) => Ok(TestKind::TwoSample),
        (Some(Dtype::Binary), Dtype::Numeric) => Ok(TestKind::TwoSample),
        (Some(Dtype::Nominal), Dtype::Numeric) => Ok(TestKind::OneWay),
        (Some(Dtype::Ordinal | Dtype::Numeric), Dtype::Numeric) => Ok(TestKind::Regression),
    }
}
