//! Error types for u-compare.

use thiserror::Error;

/// All errors produced by u-compare operations.
///
/// Every variant that concerns a single sample carries a `label` so a caller
/// iterating over many units (states, categories, payment types) can report
/// or skip the failing unit. Operations that receive a bare slice use the
/// label `"sample"`; use [`CompareError::with_label`] to attach context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// Sample or group is below the minimum size the operation needs.
    #[error("'{label}': need at least {min_required} observations, got {actual}")]
    InsufficientData {
        /// Sample or group label.
        label: String,
        /// Minimum size required.
        min_required: usize,
        /// Size received.
        actual: usize,
    },
    /// Sample has zero variance (all values identical).
    #[error("'{label}': degenerate sample of {n} identical values")]
    DegenerateSample {
        /// Sample label.
        label: String,
        /// Sample size.
        n: usize,
    },
    /// Every candidate distribution family was skipped or failed to fit.
    #[error("'{label}': no distribution could be fitted to {n} observations ({attempted} families attempted)")]
    NoFitAvailable {
        /// Sample label.
        label: String,
        /// Sample size.
        n: usize,
        /// Number of families tried.
        attempted: usize,
    },
    /// Fewer than two groups survive the minimum-size filter.
    #[error("need at least {min_required} usable groups, got {actual}")]
    InsufficientGroups {
        /// Minimum number of groups.
        min_required: usize,
        /// Groups left after filtering.
        actual: usize,
    },
    /// Sample contains NaN entries; callers must strip missing values.
    #[error("'{label}' has {count} missing values")]
    MissingValues {
        /// Sample or group label.
        label: String,
        /// Number of NaN entries.
        count: usize,
    },
    /// Sample contains infinite entries.
    #[error("'{label}' has {count} non-finite values")]
    NonFinite {
        /// Sample or group label.
        label: String,
        /// Number of infinite entries.
        count: usize,
    },
}

impl CompareError {
    /// Replaces the sample label carried by the error.
    ///
    /// Group-level errors without a label are returned unchanged.
    ///
    /// ```
    /// use u_compare::error::CompareError;
    ///
    /// let err = CompareError::DegenerateSample { label: "sample".into(), n: 4 };
    /// let err = err.with_label("SP");
    /// assert_eq!(err.to_string(), "'SP': degenerate sample of 4 identical values");
    /// ```
    pub fn with_label(self, new_label: impl Into<String>) -> Self {
        let new_label = new_label.into();
        match self {
            Self::InsufficientData {
                min_required,
                actual,
                ..
            } => Self::InsufficientData {
                label: new_label,
                min_required,
                actual,
            },
            Self::DegenerateSample { n, .. } => Self::DegenerateSample {
                label: new_label,
                n,
            },
            Self::NoFitAvailable { n, attempted, .. } => Self::NoFitAvailable {
                label: new_label,
                n,
                attempted,
            },
            Self::MissingValues { count, .. } => Self::MissingValues {
                label: new_label,
                count,
            },
            Self::NonFinite { count, .. } => Self::NonFinite {
                label: new_label,
                count,
            },
            other @ Self::InsufficientGroups { .. } => other,
        }
    }

    /// The sample label, if the error concerns a single sample.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::InsufficientData { label, .. }
            | Self::DegenerateSample { label, .. }
            | Self::NoFitAvailable { label, .. }
            | Self::MissingValues { label, .. }
            | Self::NonFinite { label, .. } => Some(label),
            Self::InsufficientGroups { .. } => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CompareError::InsufficientData {
            label: "RJ".into(),
            min_required: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "'RJ': need at least 3 observations, got 1");
    }

    #[test]
    fn with_label_keeps_group_errors() {
        let err = CompareError::InsufficientGroups {
            min_required: 2,
            actual: 1,
        };
        assert_eq!(err.clone().with_label("x"), err);
        assert!(err.label().is_none());
    }

    #[test]
    fn with_label_relabels() {
        let err = CompareError::NoFitAvailable {
            label: "sample".into(),
            n: 5,
            attempted: 9,
        }
        .with_label("freight");
        assert_eq!(err.label(), Some("freight"));
    }
}
