//! Statistical evidence backends.
//!
//! The engine never computes a Bayes factor itself. It prepares samples or
//! a model frame and hands them to an [`EvidenceBackend`], then extracts one
//! named scalar from the structured result. [`JzsBackend`] is the bundled
//! implementation; anything else that implements the trait can be plugged
//! into the engine.

pub mod jzs;
pub mod quadrature;
pub mod sink;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EvidenceError, Result};

pub use jzs::JzsBackend;
pub use sink::{CaptureSink, DiagnosticSink, TracingSink};

static FORMULA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_.][A-Za-z0-9_.]*)\s*~\s*([A-Za-z_.][A-Za-z0-9_.]*)\s*$")
        .expect("formula pattern is valid")
});

/// A single-predictor model formula, `outcome ~ predictor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Formula {
    outcome: String,
    predictor: String,
}

impl Formula {
    /// Creates a formula from column names.
    ///
    /// Names are taken verbatim; only empty names and names containing `~`
    /// are rejected. Parsing from a string is stricter, see [`FromStr`].
    pub fn new(outcome: impl Into<String>, predictor: impl Into<String>) -> Result<Self> {
        let outcome = outcome.into();
        let predictor = predictor.into();
        for name in [&outcome, &predictor] {
            if name.trim().is_empty() || name.contains('~') {
                return Err(EvidenceError::invalid_request(format!(
                    "'{name}' is not a valid formula term"
                )));
            }
        }
        Ok(Self { outcome, predictor })
    }

    /// Left-hand side.
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Right-hand side term.
    pub fn predictor(&self) -> &str {
        &self.predictor
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.outcome, self.predictor)
    }
}

/// Parses `"outcome ~ predictor"`, where both sides are identifiers made of
/// letters, digits, `_` and `.` (not starting with a digit).
impl FromStr for Formula {
    type Err = EvidenceError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = FORMULA_PATTERN.captures(s).ok_or_else(|| {
            EvidenceError::invalid_request(format!("cannot parse formula '{s}'"))
        })?;
        Ok(Self {
            outcome: caps[1].to_string(),
            predictor: caps[2].to_string(),
        })
    }
}

/// Evidence for one model term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesFactorEntry {
    /// Bayes factor of the model with the term against the null model
    pub bayes_factor: f64,
    /// Natural log of `bayes_factor`
    pub log_bf: f64,
    /// Relative numerical error estimate
    pub error: f64,
}

impl BayesFactorEntry {
    /// Builds an entry from a log Bayes factor.
    pub fn from_log(log_bf: f64, error: f64) -> Self {
        Self {
            bayes_factor: log_bf.exp(),
            log_bf,
            error,
        }
    }
}

/// Term-keyed result of a formula-based test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceTable {
    entries: BTreeMap<String, BayesFactorEntry>,
}

impl EvidenceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for a term.
    pub fn insert(&mut self, term: impl Into<String>, entry: BayesFactorEntry) {
        self.entries.insert(term.into(), entry);
    }

    /// Entry for a term.
    pub fn get(&self, term: &str) -> Option<&BayesFactorEntry> {
        self.entries.get(term)
    }

    /// Entry for a term, failing with [`EvidenceError::MissingTerm`].
    pub fn require(&self, term: &str) -> Result<&BayesFactorEntry> {
        self.get(term).ok_or_else(|| EvidenceError::MissingTerm {
            term: term.to_string(),
        })
    }

    /// Iterates over `(term, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BayesFactorEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no terms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleEvidence {
    /// Bayes factor of a non-zero mean difference against no difference
    pub bayes_factor: f64,
    /// Natural log of `bayes_factor`
    pub log_bf: f64,
    /// Relative numerical error estimate
    pub error: f64,
    /// Pooled-variance t statistic
    pub t_statistic: f64,
    /// Degrees of freedom
    pub df: f64,
}

/// Delegate that computes Bayes factors for the engine.
///
/// Implementations must be stateless with respect to calls. The engine may
/// hold one behind an `Arc` and call it from several threads.
pub trait EvidenceBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Compares the means of two independent samples.
    fn two_sample(&self, group_a: &[f64], group_b: &[f64]) -> Result<TwoSampleEvidence>;

    /// One-way grouped test of `formula.outcome()` across the levels of `groups`.
    ///
    /// The returned table must contain an entry keyed by `formula.predictor()`.
    fn one_way(&self, formula: &Formula, y: &[f64], groups: &[String]) -> Result<EvidenceTable>;

    /// Linear regression of `y` on a single continuous predictor `x`.
    ///
    /// The returned table must contain an entry keyed by `formula.predictor()`.
    fn regression(&self, formula: &Formula, y: &[f64], x: &[f64]) -> Result<EvidenceTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_round_trip() {
        let formula = Formula::new("numeric_0", "nominal_1").unwrap();
        assert_eq!(formula.to_string(), "numeric_0 ~ nominal_1");
        let parsed: Formula = "  numeric_0~nominal_1 ".parse().unwrap();
        assert_eq!(parsed, formula);
        assert_eq!(parsed.outcome(), "numeric_0");
        assert_eq!(parsed.predictor(), "nominal_1");
    }

    #[test]
    fn test_formula_rejects_bad_terms() {
        assert!(Formula::new("y", "  ").is_err());
        assert!(Formula::new("y ~ w", "x").is_err());
        assert!(Formula::new("monthly income", "x").is_ok());
        assert!("1y ~ x".parse::<Formula>().is_err());
        assert!("y ~".parse::<Formula>().is_err());
        assert!("y ~ x ~ z".parse::<Formula>().is_err());
    }

    #[test]
    fn test_evidence_table_lookup() {
        let mut table = EvidenceTable::new();
        table.insert("x", BayesFactorEntry::from_log(0.0, 1e-6));
        assert_eq!(table.require("x").unwrap().bayes_factor, 1.0);
        assert!(matches!(
            table.require("z"),
            Err(EvidenceError::MissingTerm { .. })
        ));
        assert_eq!(table.len(), 1);
    }
}
