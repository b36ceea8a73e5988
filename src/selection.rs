//! Normality-driven test selection.
//!
//! Picks a parametric test when the data look normal and a rank-based test
//! otherwise:
//!
//! | Comparison | Normal | Non-normal |
//! |---|---|---|
//! | two samples | Welch t-test | Mann–Whitney U |
//! | k groups | one-way ANOVA | Kruskal–Wallis H |
//!
//! For two samples both must be classified normal. For k groups the pooled
//! sample is classified.

use serde::Serialize;
use tracing::debug;

use crate::error::{CompareError, Result};
use crate::normality::{classify, ClassifierConfig, NormalityVerdict};
use crate::ranking::GroupSet;
use crate::sample::validate;

/// Label used for the pooled sample in errors.
const POOLED_LABEL: &str = "pooled";

/// Hypothesis test chosen by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectedTest {
    /// Welch two-sample t-test (unequal variances).
    WelchT,
    /// Two-sided Mann–Whitney U.
    MannWhitneyU,
    /// One-way ANOVA F-test.
    OneWayAnova,
    /// Kruskal–Wallis H.
    KruskalWallis,
}

impl SelectedTest {
    /// Whether the test assumes normality.
    pub fn is_parametric(self) -> bool {
        matches!(self, Self::WelchT | Self::OneWayAnova)
    }
}

/// Configuration for [`compare_two`] and [`compare_groups`].
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Normality classifier settings.
    pub classifier: ClassifierConfig,
    /// Significance level of the selected test. Default: 0.05.
    pub significance_level: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            significance_level: 0.05,
        }
    }
}

impl SelectionConfig {
    /// Sets the classifier configuration.
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Sets the significance level.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }
}

/// Result of [`compare_two`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoSampleComparison {
    /// Test that was run.
    pub test: SelectedTest,
    /// t for Welch, U (of sample a) for Mann–Whitney.
    pub statistic: f64,
    /// Welch–Satterthwaite degrees of freedom; `None` for Mann–Whitney.
    pub df: Option<f64>,
    /// Two-sided p-value.
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub significant: bool,
    /// Label of the first sample.
    pub label_a: String,
    /// Label of the second sample.
    pub label_b: String,
    /// Mean of the first sample.
    pub mean_a: f64,
    /// Mean of the second sample.
    pub mean_b: f64,
    /// Normality verdict on the first sample.
    pub verdict_a: NormalityVerdict,
    /// Normality verdict on the second sample.
    pub verdict_b: NormalityVerdict,
}

/// Result of [`compare_groups`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    /// Test that was run.
    pub test: SelectedTest,
    /// F for ANOVA, H for Kruskal–Wallis.
    pub statistic: f64,
    /// p-value of the omnibus test.
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub significant: bool,
    /// Verdict on the pooled sample that chose the test.
    pub pooled_verdict: NormalityVerdict,
    /// (label, mean) in label order.
    pub group_means: Vec<(String, f64)>,
}

/// Compares two samples with a test chosen by their normality.
///
/// # Errors
///
/// - errors from [`classify`] on either sample, relabelled with that
///   sample's label; a constant sample yields [`CompareError::DegenerateSample`]
/// - [`CompareError::DegenerateSample`] labelled `"a vs b"` when the selected
///   test cannot be computed, e.g. when both variances underflow
///
/// ```
/// use u_compare::selection::{compare_two, SelectedTest, SelectionConfig};
///
/// let a: Vec<f64> = (0..30).map(|i| (i as f64 * 0.37).sin() * 3.0 + 10.0).collect();
/// let b: Vec<f64> = (0..30).map(|i| (i as f64 * 0.37).sin() * 3.0 + 20.0).collect();
/// let r = compare_two("a", &a, "b", &b, &SelectionConfig::default()).unwrap();
/// assert!(r.significant);
/// assert!(matches!(r.test, SelectedTest::WelchT | SelectedTest::MannWhitneyU));
/// ```
pub fn compare_two(
    label_a: &str,
    a: &[f64],
    label_b: &str,
    b: &[f64],
    config: &SelectionConfig,
) -> Result<TwoSampleComparison> {
    let verdict_a = classify(a, &config.classifier).map_err(|e| e.with_label(label_a))?;
    let verdict_b = classify(b, &config.classifier).map_err(|e| e.with_label(label_b))?;

    let uncomputable = || {
        debug!(a = label_a, b = label_b, "two-sample statistic not computable");
        CompareError::DegenerateSample {
            label: format!("{label_a} vs {label_b}"),
            n: a.len() + b.len(),
        }
    };
    let (test, statistic, df, p_value) = if verdict_a.is_normal && verdict_b.is_normal {
        let r = u_analytics::testing::two_sample_t_test(a, b).ok_or_else(uncomputable)?;
        (SelectedTest::WelchT, r.statistic, Some(r.df), r.p_value)
    } else {
        let r = u_analytics::testing::mann_whitney_u_test(a, b).ok_or_else(uncomputable)?;
        (SelectedTest::MannWhitneyU, r.statistic, None, r.p_value)
    };
    let p_value = p_value.clamp(0.0, 1.0);

    debug!(a = label_a, b = label_b, test = ?test, p = p_value, "two-sample comparison");

    Ok(TwoSampleComparison {
        test,
        statistic,
        df,
        p_value,
        significant: p_value < config.significance_level,
        label_a: label_a.to_string(),
        label_b: label_b.to_string(),
        mean_a: mean(a),
        mean_b: mean(b),
        verdict_a,
        verdict_b,
    })
}

/// Compares k ≥ 2 groups with a test chosen by the pooled sample's normality.
///
/// # Errors
///
/// - [`CompareError::InsufficientGroups`] with fewer than 2 groups
/// - [`CompareError::InsufficientData`] naming a group with fewer than 2 observations
/// - errors from [`classify`] on the pooled sample, labelled `"pooled"`
/// - [`CompareError::DegenerateSample`] labelled `"pooled"` when the selected
///   test cannot be computed
pub fn compare_groups(groups: &GroupSet, config: &SelectionConfig) -> Result<GroupComparison> {
    if groups.len() < 2 {
        return Err(CompareError::InsufficientGroups {
            min_required: 2,
            actual: groups.len(),
        });
    }
    for (label, values) in groups.iter() {
        validate(values, label, 2)?;
    }

    let pooled = groups.pooled();
    let pooled_verdict =
        classify(&pooled, &config.classifier).map_err(|e| e.with_label(POOLED_LABEL))?;

    let refs: Vec<&[f64]> = groups.iter().map(|(_, v)| v).collect();
    let uncomputable = || CompareError::DegenerateSample {
        label: POOLED_LABEL.to_string(),
        n: pooled.len(),
    };
    let (test, statistic, p_value) = if pooled_verdict.is_normal {
        let r = u_analytics::testing::one_way_anova(&refs).ok_or_else(uncomputable)?;
        (SelectedTest::OneWayAnova, r.f_statistic, r.p_value)
    } else {
        let r = u_analytics::testing::kruskal_wallis_test(&refs).ok_or_else(uncomputable)?;
        (SelectedTest::KruskalWallis, r.statistic, r.p_value)
    };
    let p_value = p_value.clamp(0.0, 1.0);

    debug!(groups = groups.len(), test = ?test, p = p_value, "group comparison");

    Ok(GroupComparison {
        test,
        statistic,
        p_value,
        significant: p_value < config.significance_level,
        pooled_verdict,
        group_means: groups
            .iter()
            .map(|(label, values)| (label.to_string(), mean(values)))
            .collect(),
    })
}

fn mean(values: &[f64]) -> f64 {
    u_numflow::stats::mean(values).unwrap_or(f64::NAN)
}
