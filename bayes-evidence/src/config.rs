//! Prior and quadrature configuration for evidence computation.
//!
//! The defaults reproduce the conventional "medium" default priors:
//! a Cauchy scale of √2/2 on standardized effect size for two-sample tests,
//! 1/2 for fixed effects in one-way tests and √2/4 for continuous
//! regression slopes.
//!
//! ```rust
//! use bayes_evidence::config::{EvidenceConfig, PriorScale};
//!
//! let config = EvidenceConfig::builder()
//!     .two_sample_prior(PriorScale::Wide)
//!     .intervals(2000)
//!     .build()
//!     .unwrap();
//! assert!((config.two_sample_r() - 1.0).abs() < 1e-12);
//! ```

use std::f64::consts::SQRT_2;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvidenceError, Result};

/// Which family of effect a prior scale applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorFamily {
    /// Standardized mean difference between two groups
    TwoSample,
    /// Fixed effects of a grouping factor
    FixedEffect,
    /// Continuous regression slopes
    Continuous,
}

/// Width of a default prior.
///
/// Named widths resolve to family-specific scales; `Custom` is used as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorScale {
    #[default]
    Medium,
    Wide,
    UltraWide,
    Custom(f64),
}

impl PriorScale {
    /// Resolves the scale `r` for the given family.
    pub fn resolve(&self, family: PriorFamily) -> f64 {
        let medium = match family {
            PriorFamily::TwoSample => SQRT_2 / 2.0,
            PriorFamily::FixedEffect => 0.5,
            PriorFamily::Continuous => SQRT_2 / 4.0,
        };
        match self {
            PriorScale::Medium => medium,
            PriorScale::Wide => medium * SQRT_2,
            PriorScale::UltraWide => medium * 2.0,
            PriorScale::Custom(r) => *r,
        }
    }
}

/// Integration grid over `ln g`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Number of Simpson intervals (must be even, default: 4000)
    pub intervals: usize,
    /// Lower bound of `ln g` (default: -30)
    pub log_lower: f64,
    /// Upper bound of `ln g` (default: 60)
    pub log_upper: f64,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            intervals: 4000,
            log_lower: -30.0,
            log_upper: 60.0,
        }
    }
}

/// Configuration for the default evidence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Prior width for two-sample tests (default: medium)
    pub two_sample_prior: PriorScale,
    /// Prior width for one-way fixed effects (default: medium)
    pub fixed_effect_prior: PriorScale,
    /// Prior width for regression slopes (default: medium)
    pub continuous_prior: PriorScale,
    /// Integration grid
    pub quadrature: QuadratureConfig,
    /// Relative quadrature error above which a warning is emitted (default: 1e-4)
    pub warn_relative_error: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            two_sample_prior: PriorScale::Medium,
            fixed_effect_prior: PriorScale::Medium,
            continuous_prior: PriorScale::Medium,
            quadrature: QuadratureConfig::default(),
            warn_relative_error: 1e-4,
        }
    }
}

impl EvidenceConfig {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> EvidenceConfigBuilder {
        EvidenceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parses a configuration from JSON. Missing keys take default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Scale `r` of the two-sample prior.
    pub fn two_sample_r(&self) -> f64 {
        self.two_sample_prior.resolve(PriorFamily::TwoSample)
    }

    /// Scale `r` of the fixed-effect prior.
    pub fn fixed_effect_r(&self) -> f64 {
        self.fixed_effect_prior.resolve(PriorFamily::FixedEffect)
    }

    /// Scale `r` of the continuous prior.
    pub fn continuous_r(&self) -> f64 {
        self.continuous_prior.resolve(PriorFamily::Continuous)
    }

    /// Checks that every scale is positive and the grid is usable.
    pub fn validate(&self) -> Result<()> {
        for (name, r) in [
            ("two_sample_prior", self.two_sample_r()),
            ("fixed_effect_prior", self.fixed_effect_r()),
            ("continuous_prior", self.continuous_r()),
        ] {
            if !(r.is_finite() && r > 0.0) {
                return Err(EvidenceError::configuration(format!(
                    "{name} must resolve to a positive finite scale, got {r}"
                )));
            }
        }

        let q = &self.quadrature;
        if q.intervals < 2 || q.intervals % 2 != 0 {
            return Err(EvidenceError::configuration(format!(
                "quadrature intervals must be an even number >= 2, got {}",
                q.intervals
            )));
        }
        if !(q.log_lower.is_finite() && q.log_upper.is_finite() && q.log_lower < q.log_upper) {
            return Err(EvidenceError::configuration(format!(
                "quadrature bounds must satisfy lower < upper, got [{}, {}]",
                q.log_lower, q.log_upper
            )));
        }
        if self.warn_relative_error.is_nan() || self.warn_relative_error <= 0.0 {
            return Err(EvidenceError::configuration(
                "warn_relative_error must be positive",
            ));
        }
        Ok(())
    }
}

/// Builder for [`EvidenceConfig`].
#[derive(Debug, Clone)]
pub struct EvidenceConfigBuilder {
    config: EvidenceConfig,
}

impl EvidenceConfigBuilder {
    /// Set the two-sample prior width
    pub fn two_sample_prior(mut self, scale: PriorScale) -> Self {
        self.config.two_sample_prior = scale;
        self
    }

    /// Set the fixed-effect prior width
    pub fn fixed_effect_prior(mut self, scale: PriorScale) -> Self {
        self.config.fixed_effect_prior = scale;
        self
    }

    /// Set the continuous prior width
    pub fn continuous_prior(mut self, scale: PriorScale) -> Self {
        self.config.continuous_prior = scale;
        self
    }

    /// Set the number of Simpson intervals
    pub fn intervals(mut self, intervals: usize) -> Self {
        self.config.quadrature.intervals = intervals;
        self
    }

    /// Set the `ln g` integration bounds
    pub fn log_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.config.quadrature.log_lower = lower;
        self.config.quadrature.log_upper = upper;
        self
    }

    /// Set the relative error warning threshold
    pub fn warn_relative_error(mut self, threshold: f64) -> Self {
        self.config.warn_relative_error = threshold;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<EvidenceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
