//! One-sample Kolmogorov–Smirnov goodness-of-fit test.
//!
//! Used twice: by the normality classifier against the standard normal, and
//! by the distribution fitter against each fitted CDF.

use serde::Serialize;

/// Statistic and p-value of a one-sample KS test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsResult {
    /// Supremum distance D between the empirical and hypothesized CDF.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Runs a one-sample KS test of `data` against `cdf`.
///
/// `data` need not be sorted. Returns `None` for an empty sample or when the
/// CDF returns a non-finite value anywhere on the sample.
///
/// # Algorithm
///
/// D = maxᵢ max(i/n − F(x₍ᵢ₎), F(x₍ᵢ₎) − (i−1)/n). The p-value uses
/// Stephens' (1970) small-sample modification
/// λ = (√n + 0.12 + 0.11/√n)·D evaluated in the Kolmogorov limiting
/// distribution.
///
/// ```
/// use u_compare::goodness::ks_test;
///
/// // Uniform(0,1) order statistics against the Uniform(0,1) CDF
/// let data: Vec<f64> = (0..20).map(|i| (i as f64 + 0.5) / 20.0).collect();
/// let r = ks_test(&data, |x| x.clamp(0.0, 1.0)).unwrap();
/// assert!((r.statistic - 0.025).abs() < 1e-12);
/// assert!(r.p_value > 0.99);
/// ```
pub fn ks_test<F>(data: &[f64], cdf: F) -> Option<KsResult>
where
    F: Fn(f64) -> f64,
{
    let n = data.len();
    if n == 0 {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let mut d = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let f = cdf(x);
        if !f.is_finite() {
            return None;
        }
        let above = (i + 1) as f64 / nf - f;
        let below = f - i as f64 / nf;
        d = d.max(above).max(below);
    }

    let sqrt_n = nf.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;

    Some(KsResult {
        statistic: d,
        p_value: kolmogorov_survival(lambda),
    })
}

/// Survival function Q(z) = P(K > z) of the Kolmogorov distribution.
///
/// Uses the theta-function series below z = 1.18 and the alternating
/// series above it, each truncated where further terms are below 1e-16.
pub fn kolmogorov_survival(z: f64) -> f64 {
    if !z.is_finite() {
        return if z > 0.0 { 0.0 } else { f64::NAN };
    }
    if z < 0.042 {
        return 1.0;
    }
    let q = if z < 1.18 {
        // P(K ≤ z) = √(2π)/z · Σ exp(−(2j−1)²π²/(8z²))
        let y = (-std::f64::consts::PI.powi(2) / (8.0 * z * z)).exp();
        let cdf = (2.0 * std::f64::consts::PI).sqrt() / z
            * (y + y.powi(9) + y.powi(25) + y.powi(49));
        1.0 - cdf
    } else {
        // Q(z) = 2 Σ (−1)^{k−1} exp(−2k²z²)
        let x = (-2.0 * z * z).exp();
        2.0 * (x - x.powi(4) + x.powi(9))
    };
    q.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kolmogorov_reference_points() {
        // Tabulated Q(z): Q(1.36) ≈ 0.0494, Q(1.63) ≈ 0.0098, Q(0.5) ≈ 0.9639
        assert!((kolmogorov_survival(1.36) - 0.0494).abs() < 5e-4);
        assert!((kolmogorov_survival(1.63) - 0.0098).abs() < 5e-4);
        assert!((kolmogorov_survival(0.5) - 0.9639).abs() < 5e-4);
    }

    #[test]
    fn kolmogorov_branches_agree_at_switch() {
        let below = {
            let z: f64 = 1.18 - 1e-9;
            let y = (-std::f64::consts::PI.powi(2) / (8.0 * z * z)).exp();
            1.0 - (2.0 * std::f64::consts::PI).sqrt() / z
                * (y + y.powi(9) + y.powi(25) + y.powi(49))
        };
        assert!((below - kolmogorov_survival(1.18)).abs() < 1e-8);
    }

    #[test]
    fn kolmogorov_limits() {
        assert_eq!(kolmogorov_survival(0.0), 1.0);
        assert_eq!(kolmogorov_survival(f64::INFINITY), 0.0);
        assert!(kolmogorov_survival(5.0) < 1e-20);
    }

    #[test]
    fn ks_detects_wrong_distribution() {
        // All mass near 1 tested against Uniform(0,1)
        let data: Vec<f64> = (0..50).map(|i| 0.9 + i as f64 * 0.001).collect();
        let r = ks_test(&data, |x| x.clamp(0.0, 1.0)).unwrap();
        assert!(r.statistic > 0.85);
        assert!(r.p_value < 1e-6);
    }

    #[test]
    fn ks_order_independent() {
        let a = [0.3, 0.1, 0.7, 0.5, 0.9];
        let b = [0.9, 0.7, 0.5, 0.3, 0.1];
        let ra = ks_test(&a, |x| x).unwrap();
        let rb = ks_test(&b, |x| x).unwrap();
        assert_eq!(ra, rb);
    }

    #[test]
    fn ks_empty_and_bad_cdf() {
        assert!(ks_test(&[], |x| x).is_none());
        assert!(ks_test(&[1.0], |_| f64::NAN).is_none());
    }
}
