//! Log-space quadrature over the g-prior mixing parameter.
//!
//! Every default-prior Bayes factor reduces to `∫ L(g) p(g) dg` over
//! `g ∈ (0, ∞)`. Integrating over `u = ln g` turns the heavy tails into
//! exponential ones. Summing in log space keeps Bayes factors of the
//! order of `e^300` representable until the final exponentiation.

use statrs::function::gamma::ln_gamma;

use crate::config::QuadratureConfig;

/// Result of a log-space integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogIntegral {
    /// Natural log of the integral
    pub log_value: f64,
    /// Relative disagreement between the Simpson and trapezoid estimates
    pub relative_error: f64,
}

/// Log density of `InverseGamma(1/2, scale/2)` at `g`.
///
/// With `scale = r²` this is the mixing density that makes a normal effect
/// with variance `g` marginally Cauchy with scale `r`.
pub fn log_inverse_gamma_half(g: f64, scale: f64) -> f64 {
    let shape = 0.5;
    let rate = scale / 2.0;
    shape * rate.ln() - ln_gamma(shape) - (shape + 1.0) * g.ln() - rate / g
}

/// Integrates `exp(log_integrand(g))` over `g ∈ (0, ∞)`.
///
/// `log_integrand` receives `g` and returns the log of the integrand. The
/// Jacobian of the `u = ln g` substitution is applied here.
pub fn integrate_log<F>(grid: &QuadratureConfig, log_integrand: F) -> LogIntegral
where
    F: Fn(f64) -> f64,
{
    let n = grid.intervals.max(2) + grid.intervals % 2;
    let h = (grid.log_upper - grid.log_lower) / n as f64;

    let values: Vec<f64> = (0..=n)
        .map(|i| {
            let u = grid.log_lower + i as f64 * h;
            let v = log_integrand(u.exp()) + u;
            if v.is_nan() {
                f64::NEG_INFINITY
            } else {
                v
            }
        })
        .collect();

    let simpson = log_weighted_sum(&values, |i| {
        if i == 0 || i == n {
            h / 3.0
        } else if i % 2 == 1 {
            4.0 * h / 3.0
        } else {
            2.0 * h / 3.0
        }
    });
    let trapezoid = log_weighted_sum(&values, |i| if i == 0 || i == n { h / 2.0 } else { h });

    let relative_error = if simpson.is_finite() && trapezoid.is_finite() {
        (simpson - trapezoid).exp_m1().abs()
    } else {
        0.0
    };

    LogIntegral {
        log_value: simpson,
        relative_error,
    }
}

/// `ln Σ w_i e^{v_i}` computed around the maximum term.
fn log_weighted_sum<W>(values: &[f64], weight: W) -> f64
where
    W: Fn(usize) -> f64,
{
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| weight(i) * (v - max).exp())
        .sum();
    max + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prior_density_normalizes() {
        for scale in [0.125, 0.5, 1.0, 250.0] {
            let result = integrate_log(&QuadratureConfig::default(), |g| {
                log_inverse_gamma_half(g, scale)
            });
            assert!(
                result.log_value.abs() < 1e-8,
                "scale {scale}: log integral {}",
                result.log_value
            );
        }
    }

    #[test]
    fn test_known_integral() {
        // ∫ e^{-g} dg = 1
        let result = integrate_log(&QuadratureConfig::default(), |g| -g);
        assert!(result.log_value.abs() < 1e-8);
        assert!(result.relative_error < 1e-6);
    }

    #[test]
    fn test_large_log_values_stay_finite() {
        let result = integrate_log(&QuadratureConfig::default(), |g| 800.0 - g);
        assert!((result.log_value - 800.0).abs() < 1e-8);
    }

    #[test]
    fn test_zero_integrand() {
        let result = integrate_log(&QuadratureConfig::default(), |_| f64::NEG_INFINITY);
        assert_eq!(result.log_value, f64::NEG_INFINITY);
        assert_eq!(result.relative_error, 0.0);
    }
}
