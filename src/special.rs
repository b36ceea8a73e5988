//! Polygamma functions for the chi-squared degrees-of-freedom solver.
//!
//! Everything else (log-gamma, incomplete gamma and beta) comes from
//! `u_numflow::special`, which does not export ψ or ψ'.

/// Digamma function ψ(x) = d/dx ln Γ(x).
///
/// Recurrence up to x ≥ 8, then the asymptotic expansion
/// (Abramowitz & Stegun 6.3.18). NaN for x ≤ 0.
pub fn digamma(x: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return f64::NAN;
    }

    let mut val = 0.0;
    let mut x = x;
    while x < 8.0 {
        val -= 1.0 / x;
        x += 1.0;
    }

    let inv_x = 1.0 / x;
    let inv_x2 = inv_x * inv_x;
    val + x.ln()
        - 0.5 * inv_x
        - inv_x2 * (1.0 / 12.0 - inv_x2 * (1.0 / 120.0 - inv_x2 * (1.0 / 252.0)))
}

/// Trigamma function ψ'(x). NaN for x ≤ 0.
pub fn trigamma(x: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return f64::NAN;
    }

    let mut val = 0.0;
    let mut x = x;
    while x < 8.0 {
        val += 1.0 / (x * x);
        x += 1.0;
    }

    let inv_x = 1.0 / x;
    let inv_x2 = inv_x * inv_x;
    val + inv_x
        + 0.5 * inv_x2
        + inv_x2 * inv_x * (1.0 / 6.0 - inv_x2 * (1.0 / 30.0 - inv_x2 * (1.0 / 42.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digamma_known_values() {
        // ψ(1) = -γ
        assert!((digamma(1.0) + 0.577_215_664_901_532_9).abs() < 1e-8);
        // ψ(x+1) = ψ(x) + 1/x
        assert!((digamma(3.5) - digamma(2.5) - 1.0 / 2.5).abs() < 1e-12);
        assert!(digamma(0.0).is_nan());
    }

    #[test]
    fn trigamma_known_values() {
        // ψ'(1) = π²/6
        let pi2_6 = std::f64::consts::PI.powi(2) / 6.0;
        assert!((trigamma(1.0) - pi2_6).abs() < 1e-8);
        assert!(trigamma(-1.0).is_nan());
    }
}
