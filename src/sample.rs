//! Sample validation and descriptive summaries.
//!
//! Every engine operation consumes a plain `&[f64]`. The caller strips
//! missing entries upstream; this module rejects anything that slipped
//! through instead of silently dropping it.
//!
//! # Example
//!
//! ```
//! use u_compare::sample::summarize;
//!
//! let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//! let s = summarize(&data).unwrap();
//! assert_eq!(s.n, 8);
//! assert!((s.mean - 5.0).abs() < 1e-12);
//! assert!((s.std_dev - 2.0).abs() < 1e-12); // population (ddof = 0)
//! ```

use serde::Serialize;
use u_numflow::stats;

use crate::error::{CompareError, Result};

/// Label used in errors when the caller passes an unnamed slice.
pub(crate) const DEFAULT_LABEL: &str = "sample";

/// Checks that `data` has at least `min_required` entries and that every
/// entry is finite.
///
/// NaN is reported as [`CompareError::MissingValues`], ±∞ as
/// [`CompareError::NonFinite`]; size is checked after both.
///
/// ```
/// use u_compare::sample::validate;
/// use u_compare::error::CompareError;
///
/// assert!(validate(&[1.0, 2.0, 3.0], "x", 3).is_ok());
/// let err = validate(&[1.0, f64::NAN], "x", 1).unwrap_err();
/// assert!(matches!(err, CompareError::MissingValues { count: 1, .. }));
/// ```
pub fn validate(data: &[f64], label: &str, min_required: usize) -> Result<()> {
    let nan_count = data.iter().filter(|v| v.is_nan()).count();
    if nan_count > 0 {
        return Err(CompareError::MissingValues {
            label: label.to_string(),
            count: nan_count,
        });
    }

    let inf_count = data.iter().filter(|v| v.is_infinite()).count();
    if inf_count > 0 {
        return Err(CompareError::NonFinite {
            label: label.to_string(),
            count: inf_count,
        });
    }

    if data.len() < min_required {
        return Err(CompareError::InsufficientData {
            label: label.to_string(),
            min_required,
            actual: data.len(),
        });
    }
    Ok(())
}

/// True when every value equals the first (zero variance).
pub(crate) fn is_constant(data: &[f64]) -> bool {
    match data.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// Descriptive statistics for a single sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Population standard deviation (denominator n).
    pub std_dev: f64,
    /// Sample standard deviation (denominator n − 1). NaN when n = 1.
    pub sample_std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// 25th percentile (Q1).
    pub q25: f64,
    /// 75th percentile (Q3).
    pub q75: f64,
    /// Interquartile range (Q3 − Q1).
    pub iqr: f64,
    /// Skewness. NaN when undefined (n < 3 or zero variance).
    pub skewness: f64,
    /// Excess kurtosis. NaN when undefined (n < 4 or zero variance).
    pub kurtosis: f64,
}

/// Computes a [`Summary`] of a clean sample.
///
/// # Errors
///
/// - [`CompareError::InsufficientData`] if `data` is empty
/// - [`CompareError::MissingValues`] / [`CompareError::NonFinite`] on invalid entries
pub fn summarize(data: &[f64]) -> Result<Summary> {
    validate(data, DEFAULT_LABEL, 1)?;

    let insufficient = || CompareError::InsufficientData {
        label: DEFAULT_LABEL.to_string(),
        min_required: 1,
        actual: data.len(),
    };

    let mean = stats::mean(data).ok_or_else(insufficient)?;
    let median = stats::median(data).ok_or_else(insufficient)?;
    let min = stats::min(data).ok_or_else(insufficient)?;
    let max = stats::max(data).ok_or_else(insufficient)?;
    let q25 = stats::quantile(data, 0.25).ok_or_else(insufficient)?;
    let q75 = stats::quantile(data, 0.75).ok_or_else(insufficient)?;
    let std_dev = stats::population_variance(data)
        .map(f64::sqrt)
        .ok_or_else(insufficient)?;

    Ok(Summary {
        n: data.len(),
        mean,
        median,
        std_dev,
        sample_std_dev: stats::std_dev(data).unwrap_or(f64::NAN),
        min,
        max,
        q25,
        q75,
        iqr: q75 - q25,
        skewness: stats::skewness(data).unwrap_or(f64::NAN),
        kurtosis: stats::kurtosis(data).unwrap_or(f64::NAN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_infinity() {
        let err = validate(&[1.0, f64::INFINITY, f64::NEG_INFINITY], "x", 1).unwrap_err();
        assert!(matches!(err, CompareError::NonFinite { count: 2, .. }));
    }

    #[test]
    fn validate_reports_size() {
        let err = validate(&[1.0, 2.0], "RJ", 3).unwrap_err();
        assert_eq!(
            err,
            CompareError::InsufficientData {
                label: "RJ".into(),
                min_required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn nan_checked_before_size() {
        let err = validate(&[f64::NAN], "x", 3).unwrap_err();
        assert!(matches!(err, CompareError::MissingValues { .. }));
    }

    #[test]
    fn constant_detection() {
        assert!(is_constant(&[3.0, 3.0, 3.0]));
        assert!(!is_constant(&[3.0, 3.0, 3.1]));
        assert!(is_constant(&[]));
    }

    #[test]
    fn summary_quartiles() {
        let data: Vec<f64> = (1..=9).map(f64::from).collect();
        let s = summarize(&data).unwrap();
        assert_eq!(s.n, 9);
        assert!((s.median - 5.0).abs() < 1e-12);
        assert!((s.q25 - 3.0).abs() < 1e-12);
        assert!((s.q75 - 7.0).abs() < 1e-12);
        assert!((s.iqr - 4.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn summary_single_value() {
        let s = summarize(&[4.2]).unwrap();
        assert_eq!(s.n, 1);
        assert_eq!(s.std_dev, 0.0);
        assert!(s.sample_std_dev.is_nan());
    }

    #[test]
    fn summary_empty() {
        assert!(matches!(
            summarize(&[]).unwrap_err(),
            CompareError::InsufficientData { .. }
        ));
    }
}
