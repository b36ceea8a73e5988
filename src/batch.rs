//! Parallel execution over independent units of analysis.
//!
//! A unit is one labelled input (a state, a product category, a payment
//! type). Units run on the rayon pool and their results are merged by key,
//! so output order never depends on which unit finished first. A failing
//! unit does not abort the batch; its error is returned under its key. An
//! error about the unit's whole sample is relabelled with the key, while an
//! error that already names a group keeps that group's label.
//!
//! ```
//! use std::collections::BTreeMap;
//! use u_compare::batch::classify_batch;
//! use u_compare::normality::ClassifierConfig;
//!
//! let mut units = BTreeMap::new();
//! units.insert("ok".to_string(), vec![1.0, 2.5, 2.0, 3.5, 3.0, 4.1]);
//! units.insert("flat".to_string(), vec![2.0; 6]);
//!
//! let results = classify_batch(&units, &ClassifierConfig::default());
//! assert!(results["ok"].is_ok());
//! assert_eq!(results["flat"].as_ref().unwrap_err().label(), Some("flat"));
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{CompareError, Result};
use crate::fitting::{fit_all, FitConfig, RankedFitList};
use crate::normality::{classify, ClassifierConfig, NormalityVerdict};
use crate::ranking::{rank_groups, GroupSet, RankConfig, RankingResult};
use crate::sample::DEFAULT_LABEL;

/// Replaces the generic sample label with the unit key.
fn label_with_key(err: CompareError, key: &str) -> CompareError {
    if err.label() == Some(DEFAULT_LABEL) {
        err.with_label(key)
    } else {
        err
    }
}

fn run_batch<I, O, F>(units: &BTreeMap<String, I>, op: F) -> BTreeMap<String, Result<O>>
where
    I: Sync,
    O: Send,
    F: Fn(&I) -> Result<O> + Sync,
{
    let results: BTreeMap<String, Result<O>> = units
        .par_iter()
        .map(|(key, input)| (key.clone(), op(input).map_err(|e| label_with_key(e, key))))
        .collect();
    let failed = results.values().filter(|r| r.is_err()).count();
    debug!(units = results.len(), failed, "batch complete");
    results
}

/// Classifies every sample in parallel.
pub fn classify_batch(
    units: &BTreeMap<String, Vec<f64>>,
    config: &ClassifierConfig,
) -> BTreeMap<String, Result<NormalityVerdict>> {
    run_batch(units, |data| classify(data, config))
}

/// Fits every sample in parallel.
pub fn fit_batch(
    units: &BTreeMap<String, Vec<f64>>,
    config: &FitConfig,
) -> BTreeMap<String, Result<RankedFitList>> {
    run_batch(units, |data| fit_all(data, config))
}

/// Ranks the groups of every unit in parallel.
///
/// Errors keep the label of the group they concern; group-level errors
/// (`InsufficientGroups`) carry no label. Both are returned under the unit key.
pub fn rank_batch(
    units: &BTreeMap<String, GroupSet>,
    config: &RankConfig,
) -> BTreeMap<String, Result<RankingResult>> {
    run_batch(units, |groups| rank_groups(groups, config))
}
