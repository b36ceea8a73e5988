//! Group comparison and ranking.
//!
//! Orders three or more groups by running a round-robin tournament of
//! two-sided Mann–Whitney U tests. Every significant pairwise difference
//! awards one point to the group with the higher mean; a non-significant
//! pair awards half a point to each side. The final order is score
//! descending, then mean descending, then label ascending.
//!
//! # Example
//!
//! ```
//! use u_compare::ranking::{rank_groups, GroupSet, RankConfig};
//!
//! let mut groups = GroupSet::new();
//! groups.insert("low", (0..30).map(|i| i as f64).collect());
//! groups.insert("high", (0..30).map(|i| 100.0 + i as f64).collect());
//! groups.insert("mid", (0..30).map(|i| 50.0 + i as f64).collect());
//!
//! let result = rank_groups(&groups, &RankConfig::default()).unwrap();
//! let order: Vec<&str> = result.ranking.iter().map(|g| g.label.as_str()).collect();
//! assert_eq!(order, ["high", "mid", "low"]);
//! assert_eq!(result.ranking[0].score, 2.0);
//! assert_eq!(result.n_comparisons, 3);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{CompareError, Result};
use crate::pairs::{pair_count, unordered_pairs};
use crate::sample::validate;

/// Smallest `min_group_size` accepted; the rank test needs two observations.
pub const MIN_GROUP_SIZE_FLOOR: usize = 2;

// ── Input ───────────────────────────────────────────────────────────

/// Labelled samples to compare.
///
/// Backed by a `BTreeMap`, so every iteration is in label order regardless
/// of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupSet {
    groups: BTreeMap<String, Vec<f64>>,
}

impl GroupSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a group, returning the previous values under that label.
    pub fn insert(&mut self, label: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        self.groups.insert(label.into(), values)
    }

    /// Appends one observation to a group, creating it if needed.
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.groups.entry(label.into()).or_default().push(value);
    }

    /// Values of a group.
    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// (label, values) in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every value of every group, in label order.
    pub fn pooled(&self) -> Vec<f64> {
        self.groups.values().flatten().copied().collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<f64>)> for GroupSet {
    fn from_iter<I: IntoIterator<Item = (K, Vec<f64>)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<BTreeMap<String, Vec<f64>>> for GroupSet {
    fn from(groups: BTreeMap<String, Vec<f64>>) -> Self {
        Self { groups }
    }
}

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for [`rank_groups`].
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// A pair is significant when p < this. Default: 0.05.
    pub significance_level: f64,
    /// Groups with fewer observations are excluded. Default: 20, floor 2.
    pub min_group_size: usize,
    /// Keep only the N largest groups (ties by label). Default: `None`.
    pub max_groups: Option<usize>,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_group_size: 20,
            max_groups: None,
        }
    }
}

impl RankConfig {
    /// Sets the significance level.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }

    /// Sets the minimum group size (never below 2).
    pub fn min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size.max(MIN_GROUP_SIZE_FLOOR);
        self
    }

    /// Keeps only the `n` largest groups.
    pub fn max_groups(mut self, n: usize) -> Self {
        self.max_groups = Some(n);
        self
    }
}

// ── Result Types ────────────────────────────────────────────────────

/// Result of one pairwise Mann–Whitney comparison.
///
/// `group_a < group_b` lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseOutcome {
    /// Label that sorts first.
    pub group_a: String,
    /// Label that sorts second.
    pub group_b: String,
    /// Mean of `group_a`.
    pub mean_a: f64,
    /// Mean of `group_b`.
    pub mean_b: f64,
    /// Size of `group_a`.
    pub n_a: usize,
    /// Size of `group_b`.
    pub n_b: usize,
    /// U statistic of `group_a`.
    pub u_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub significant: bool,
    /// Label of the group with the higher mean, when significant.
    /// `None` for a non-significant pair or a significant pair with equal means.
    pub winner: Option<String>,
}

impl PairwiseOutcome {
    /// Whether the pair involves `label`.
    pub fn involves(&self, label: &str) -> bool {
        self.group_a == label || self.group_b == label
    }
}

/// One group's final standing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    /// 1-based rank.
    pub position: usize,
    /// Group label.
    pub label: String,
    /// Tournament points: 1 per win, 0.5 per draw.
    pub score: f64,
    /// Sample mean; breaks score ties.
    pub mean: f64,
    /// Number of observations.
    pub n: usize,
}

/// Why a group was left out of the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExclusionReason {
    /// Fewer observations than `min_group_size`.
    BelowMinimumSize,
    /// Not among the `max_groups` largest groups.
    BeyondMaxGroups,
}

/// A group left out of the tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedGroup {
    /// Group label.
    pub label: String,
    /// Number of observations.
    pub n: usize,
    /// Why it was left out.
    pub reason: ExclusionReason,
}

/// Outcome of [`rank_groups`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    /// Groups best first.
    pub ranking: Vec<RankedGroup>,
    /// Every pair, in label order.
    pub pairwise: Vec<PairwiseOutcome>,
    /// Groups that did not take part, in label order.
    pub excluded: Vec<ExcludedGroup>,
    /// Significance level used.
    pub significance_level: f64,
    /// C(g, 2) for the g ranked groups.
    pub n_comparisons: usize,
}

impl RankingResult {
    /// The top-ranked group.
    pub fn leader(&self) -> &RankedGroup {
        &self.ranking[0]
    }

    /// Standing of a group, if it was ranked.
    pub fn group(&self, label: &str) -> Option<&RankedGroup> {
        self.ranking.iter().find(|g| g.label == label)
    }

    /// Outcome of the pair {a, b}, in either order.
    pub fn pair(&self, a: &str, b: &str) -> Option<&PairwiseOutcome> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.pairwise
            .iter()
            .find(|p| p.group_a == lo && p.group_b == hi)
    }

    /// Sum of all scores; always equals `n_comparisons`.
    pub fn total_score(&self) -> f64 {
        self.ranking.iter().map(|g| g.score).sum()
    }
}

// ── Ranking ─────────────────────────────────────────────────────────

struct Contender<'a> {
    label: &'a str,
    values: &'a [f64],
    mean: f64,
}

/// Ranks groups by a pairwise Mann–Whitney tournament.
///
/// # Errors
///
/// - [`CompareError::MissingValues`] / [`CompareError::NonFinite`] naming
///   the first offending group
/// - [`CompareError::InsufficientGroups`] if fewer than 2 groups survive the
///   size filter
pub fn rank_groups(groups: &GroupSet, config: &RankConfig) -> Result<RankingResult> {
    for (label, values) in groups.iter() {
        validate(values, label, 0)?;
    }

    let min_size = config.min_group_size.max(MIN_GROUP_SIZE_FLOOR);
    let alpha = config.significance_level;

    let mut excluded = Vec::new();
    let mut eligible: Vec<(&str, &[f64])> = Vec::with_capacity(groups.len());
    for (label, values) in groups.iter() {
        if values.len() < min_size {
            excluded.push(ExcludedGroup {
                label: label.to_string(),
                n: values.len(),
                reason: ExclusionReason::BelowMinimumSize,
            });
        } else {
            eligible.push((label, values));
        }
    }

    if let Some(max) = config.max_groups {
        if eligible.len() > max {
            let mut by_size = eligible.clone();
            by_size.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
            for (label, values) in &by_size[max..] {
                excluded.push(ExcludedGroup {
                    label: label.to_string(),
                    n: values.len(),
                    reason: ExclusionReason::BeyondMaxGroups,
                });
            }
            by_size.truncate(max);
            by_size.sort_by(|a, b| a.0.cmp(b.0));
            eligible = by_size;
        }
    }
    excluded.sort_by(|a, b| a.label.cmp(&b.label));

    if eligible.len() < 2 {
        return Err(CompareError::InsufficientGroups {
            min_required: 2,
            actual: eligible.len(),
        });
    }

    let contenders: Vec<Contender<'_>> = eligible
        .into_iter()
        .map(|(label, values)| Contender {
            label,
            values,
            mean: values.iter().sum::<f64>() / values.len() as f64,
        })
        .collect();

    let mut scores: BTreeMap<&str, f64> = contenders.iter().map(|c| (c.label, 0.0)).collect();
    let mut pairwise = Vec::with_capacity(pair_count(contenders.len()));

    for (a, b) in unordered_pairs(&contenders) {
        let outcome = compare_pair(a, b, alpha);
        trace!(
            a = a.label,
            b = b.label,
            p = outcome.p_value,
            winner = outcome.winner.as_deref().unwrap_or("-"),
            "pairwise comparison"
        );

        let winner = outcome
            .winner
            .as_deref()
            .map(|w| if w == a.label { a.label } else { b.label });
        match winner {
            Some(w) => *scores.entry(w).or_default() += 1.0,
            None => {
                *scores.entry(a.label).or_default() += 0.5;
                *scores.entry(b.label).or_default() += 0.5;
            }
        }
        pairwise.push(outcome);
    }

    let mut ranking: Vec<RankedGroup> = contenders
        .iter()
        .map(|c| RankedGroup {
            position: 0,
            label: c.label.to_string(),
            score: scores.get(c.label).copied().unwrap_or(0.0),
            mean: c.mean,
            n: c.values.len(),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.mean.total_cmp(&a.mean))
            .then_with(|| a.label.cmp(&b.label))
    });
    for (i, g) in ranking.iter_mut().enumerate() {
        g.position = i + 1;
    }

    debug!(
        groups = ranking.len(),
        excluded = excluded.len(),
        leader = ranking[0].label.as_str(),
        "groups ranked"
    );

    Ok(RankingResult {
        n_comparisons: pairwise.len(),
        ranking,
        pairwise,
        excluded,
        significance_level: alpha,
    })
}

fn compare_pair(a: &Contender<'_>, b: &Contender<'_>, alpha: f64) -> PairwiseOutcome {
    let (n_a, n_b) = (a.values.len(), b.values.len());

    // The test only fails on zero rank variance (every value tied), which
    // carries no evidence of a difference.
    let (u_statistic, p_value) = match u_analytics::testing::mann_whitney_u_test(a.values, b.values) {
        Some(r) => (r.statistic, r.p_value.clamp(0.0, 1.0)),
        None => (n_a as f64 * n_b as f64 / 2.0, 1.0),
    };

    let significant = p_value < alpha;
    let winner = if !significant || a.mean == b.mean {
        None
    } else if a.mean > b.mean {
        Some(a.label.to_string())
    } else {
        Some(b.label.to_string())
    };

    PairwiseOutcome {
        group_a: a.label.to_string(),
        group_b: b.label.to_string(),
        mean_a: a.mean,
        mean_b: b.mean,
        n_a,
        n_b,
        u_statistic,
        p_value,
        significant,
        winner,
    }
}
