//! Default-prior (JZS) Bayes factors.
//!
//! All three tests integrate the mean and the error variance out with the
//! usual non-informative priors, then mix a normal effect prior over
//! `g ~ InverseGamma(1/2, s/2)`:
//!
//! - **Two-sample**: standardized difference `δ ~ Cauchy(0, r)`. The Bayes
//!   factor depends on the data only through the pooled t statistic.
//! - **One-way**: `K - 1` orthonormal (Helmert) effect contrasts with
//!   `α/σ ~ N(0, g I)` and `s = r²`.
//! - **Regression**: Zellner–Siow prior with `s = r² n`. The Bayes factor
//!   depends on the data only through `R²`.
//!
//! For two groups the one-way test with fixed-effect scale `r` equals the
//! two-sample test with scale `r √2`.

use std::collections::BTreeMap;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::{debug, instrument};

use super::quadrature::{integrate_log, log_inverse_gamma_half, LogIntegral};
use super::sink::{DiagnosticSink, TracingSink};
use super::{BayesFactorEntry, EvidenceBackend, EvidenceTable, Formula, TwoSampleEvidence};
use crate::config::EvidenceConfig;
use crate::error::{EvidenceError, Result};

/// Closed-form-plus-quadrature backend with default priors.
pub struct JzsBackend {
    config: EvidenceConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for JzsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JzsBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for JzsBackend {
    fn default() -> Self {
        Self::new(EvidenceConfig::default())
    }
}

impl JzsBackend {
    /// Creates a backend that reports diagnostics through `tracing`.
    pub fn new(config: EvidenceConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Creates a backend with an explicit diagnostic sink.
    pub fn with_sink(config: EvidenceConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EvidenceConfig {
        &self.config
    }

    fn check_error(&self, test: &str, integral: &LogIntegral) {
        if integral.relative_error > self.config.warn_relative_error {
            self.sink.warning(&format!(
                "{test}: relative quadrature error {:.2e} exceeds {:.2e}",
                integral.relative_error, self.config.warn_relative_error
            ));
        }
    }
}

fn require_finite(test: &str, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EvidenceError::backend(test, "input contains non-finite values"));
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum()
}

/// Orthonormal Helmert contrasts, one row per level.
fn helmert_contrasts(levels: usize) -> DMatrix<f64> {
    let mut q = DMatrix::zeros(levels, levels.saturating_sub(1));
    for j in 1..levels {
        let c = 1.0 / ((j * (j + 1)) as f64).sqrt();
        for i in 0..j {
            q[(i, j - 1)] = c;
        }
        q[(j, j - 1)] = -(j as f64) * c;
    }
    q
}

impl EvidenceBackend for JzsBackend {
    fn name(&self) -> &str {
        "jzs"
    }

    #[instrument(skip_all, fields(n_a = group_a.len(), n_b = group_b.len()))]
    fn two_sample(&self, group_a: &[f64], group_b: &[f64]) -> Result<TwoSampleEvidence> {
        const TEST: &str = "two-sample";
        require_finite(TEST, group_a)?;
        require_finite(TEST, group_b)?;

        let (n1, n2) = (group_a.len() as f64, group_b.len() as f64);
        if group_a.is_empty() || group_b.is_empty() || group_a.len() + group_b.len() < 3 {
            return Err(EvidenceError::backend(
                TEST,
                format!("not enough observations ({n1} and {n2})"),
            ));
        }

        let (m1, m2) = (mean(group_a), mean(group_b));
        let nu = n1 + n2 - 2.0;
        let pooled = (sum_sq_dev(group_a, m1) + sum_sq_dev(group_b, m2)) / nu;
        if pooled <= 0.0 {
            return Err(EvidenceError::backend(TEST, "data are essentially constant"));
        }

        let t = (m1 - m2) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
        let n_eff = n1 * n2 / (n1 + n2);
        let r2 = self.config.two_sample_r().powi(2);
        let t2_nu = t * t / nu;

        let log_null = -(nu + 1.0) / 2.0 * t2_nu.ln_1p();
        let integral = integrate_log(&self.config.quadrature, |g| {
            let k = 1.0 + n_eff * g;
            -0.5 * k.ln() - (nu + 1.0) / 2.0 * (t2_nu / k).ln_1p()
                + log_inverse_gamma_half(g, r2)
        });
        self.check_error(TEST, &integral);

        let log_bf = integral.log_value - log_null;
        self.sink
            .message(&format!("t = {t:.4}, df = {nu}, log(BF10) = {log_bf:.4}"));
        debug!(t, df = nu, log_bf, "two-sample evidence computed");

        Ok(TwoSampleEvidence {
            bayes_factor: log_bf.exp(),
            log_bf,
            error: integral.relative_error,
            t_statistic: t,
            df: nu,
        })
    }

    #[instrument(skip_all, fields(formula = %formula, n = y.len()))]
    fn one_way(&self, formula: &Formula, y: &[f64], groups: &[String]) -> Result<EvidenceTable> {
        const TEST: &str = "one-way";
        require_finite(TEST, y)?;
        if y.len() != groups.len() {
            return Err(EvidenceError::backend(
                TEST,
                format!("{} outcomes but {} group labels", y.len(), groups.len()),
            ));
        }

        let mut levels: BTreeMap<&str, usize> = BTreeMap::new();
        for g in groups {
            let next = levels.len();
            levels.entry(g.as_str()).or_insert(next);
        }
        let k = levels.len();
        let n = y.len();
        if k < 2 {
            return Err(EvidenceError::backend(
                TEST,
                format!("'{}' needs at least two levels, found {k}", formula.predictor()),
            ));
        }
        if n <= k {
            return Err(EvidenceError::backend(
                TEST,
                format!("{n} observations are not enough for {k} levels"),
            ));
        }

        let y_mean = mean(y);
        let yc = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));
        let yy = yc.norm_squared();
        if yy <= 0.0 {
            return Err(EvidenceError::backend(TEST, "outcome is constant"));
        }

        let q = helmert_contrasts(k);
        let p = k - 1;
        let mut xc = DMatrix::from_fn(n, p, |i, j| q[(levels[groups[i].as_str()], j)]);
        for j in 0..p {
            let col_mean = xc.column(j).mean();
            xc.column_mut(j).add_scalar_mut(-col_mean);
        }

        let eigen = SymmetricEigen::new(xc.transpose() * &xc);
        let lambdas: Vec<f64> = eigen.eigenvalues.iter().map(|l| l.max(0.0)).collect();
        let projected = eigen.eigenvectors.transpose() * (xc.transpose() * &yc);
        let b2: Vec<f64> = projected.iter().map(|b| b * b).collect();

        let explained_limit: f64 = lambdas
            .iter()
            .zip(&b2)
            .filter(|(l, _)| **l > 1e-12)
            .map(|(l, b)| b / l)
            .sum();
        if 1.0 - explained_limit / yy <= 1e-12 {
            return Err(EvidenceError::backend(
                TEST,
                "groups explain the outcome exactly",
            ));
        }

        let r2 = self.config.fixed_effect_r().powi(2);
        let half_df = (n as f64 - 1.0) / 2.0;
        let integral = integrate_log(&self.config.quadrature, |g| {
            let mut log_det = 0.0;
            let mut shrunk = 0.0;
            for (l, b) in lambdas.iter().zip(&b2) {
                let d = 1.0 + g * l;
                log_det += d.ln();
                shrunk += b / d;
            }
            let ratio = 1.0 - g * shrunk / yy;
            -0.5 * log_det - half_df * ratio.ln() + log_inverse_gamma_half(g, r2)
        });
        self.check_error(TEST, &integral);

        let entry = BayesFactorEntry::from_log(integral.log_value, integral.relative_error);
        self.sink.message(&format!(
            "{formula}: {k} levels, log(BF10) = {:.4}",
            entry.log_bf
        ));
        debug!(levels = k, log_bf = entry.log_bf, "one-way evidence computed");

        let mut table = EvidenceTable::new();
        table.insert(formula.predictor(), entry);
        Ok(table)
    }

    #[instrument(skip_all, fields(formula = %formula, n = y.len()))]
    fn regression(&self, formula: &Formula, y: &[f64], x: &[f64]) -> Result<EvidenceTable> {
        const TEST: &str = "regression";
        require_finite(TEST, y)?;
        require_finite(TEST, x)?;
        if y.len() != x.len() {
            return Err(EvidenceError::backend(
                TEST,
                format!("{} outcomes but {} predictor values", y.len(), x.len()),
            ));
        }
        let n = y.len();
        if n < 3 {
            return Err(EvidenceError::backend(
                TEST,
                format!("{n} observations are not enough for one predictor"),
            ));
        }

        let (x_mean, y_mean) = (mean(x), mean(y));
        let sxx = sum_sq_dev(x, x_mean);
        let syy = sum_sq_dev(y, y_mean);
        if sxx <= 0.0 {
            return Err(EvidenceError::backend(
                TEST,
                format!("predictor '{}' has zero variance", formula.predictor()),
            ));
        }
        if syy <= 0.0 {
            return Err(EvidenceError::backend(TEST, "outcome is constant"));
        }
        let sxy: f64 = x
            .iter()
            .zip(y)
            .map(|(xv, yv)| (xv - x_mean) * (yv - y_mean))
            .sum();
        let r_squared = (sxy * sxy / (sxx * syy)).min(1.0);
        if 1.0 - r_squared <= 1e-12 {
            return Err(EvidenceError::backend(
                TEST,
                "outcome is an exact linear function of the predictor",
            ));
        }

        let nf = n as f64;
        let predictors = 1.0;
        let s = self.config.continuous_r().powi(2) * nf;
        let integral = integrate_log(&self.config.quadrature, |g| {
            (nf - predictors - 1.0) / 2.0 * g.ln_1p()
                - (nf - 1.0) / 2.0 * (g * (1.0 - r_squared)).ln_1p()
                + log_inverse_gamma_half(g, s)
        });
        self.check_error(TEST, &integral);

        let entry = BayesFactorEntry::from_log(integral.log_value, integral.relative_error);
        self.sink.message(&format!(
            "{formula}: R^2 = {r_squared:.4}, log(BF10) = {:.4}",
            entry.log_bf
        ));
        debug!(r_squared, log_bf = entry.log_bf, "regression evidence computed");

        let mut table = EvidenceTable::new();
        table.insert(formula.predictor(), entry);
        Ok(table)
    }
}
