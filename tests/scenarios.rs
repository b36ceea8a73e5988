//! End-to-end scenarios over the public API.

use u_compare::error::CompareError;
use u_compare::family::Family;
use u_compare::fitting::{fit_all, FitConfig};
use u_compare::normality::{classify, ClassifierConfig, NormalityTest};
use u_compare::ranking::{rank_groups, GroupSet, RankConfig};
use u_compare::selection::{compare_groups, SelectedTest, SelectionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_numflow::special::inverse_normal_cdf;

fn normal_quantiles(n: usize, mu: f64, sigma: f64) -> Vec<f64> {
    (0..n)
        .map(|i| mu + sigma * inverse_normal_cdf((i as f64 + 0.5) / n as f64))
        .collect()
}

fn exponential_quantiles(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| -(1.0 - (i as f64 + 0.5) / n as f64).ln())
        .collect()
}

// ============================================================================
// Ranking
// ============================================================================

#[test]
fn separated_groups_higher_mean_wins() {
    let groups: GroupSet = [
        ("A", (0..20).map(f64::from).collect::<Vec<_>>()),
        ("B", (0..20).map(|i| 40.0 + f64::from(i)).collect()),
    ]
    .into_iter()
    .collect();

    let result = rank_groups(&groups, &RankConfig::default()).unwrap();

    assert_eq!(result.n_comparisons, 1);
    assert_eq!(result.ranking[0].label, "B");
    assert_eq!(result.ranking[0].score, 1.0);
    assert_eq!(result.ranking[0].position, 1);
    assert_eq!(result.ranking[1].label, "A");
    assert_eq!(result.ranking[1].score, 0.0);

    let pair = result.pair("B", "A").unwrap();
    assert!(pair.significant);
    assert!(pair.p_value < 0.001);
    assert_eq!(pair.winner.as_deref(), Some("B"));
}

#[test]
fn identical_groups_draw_and_break_ties_by_label() {
    let values = normal_quantiles(30, 5.0, 1.0);
    let groups: GroupSet = [("second", values.clone()), ("first", values)]
        .into_iter()
        .collect();

    let result = rank_groups(&groups, &RankConfig::default()).unwrap();

    assert_eq!(result.ranking.len(), 2);
    for g in &result.ranking {
        assert_eq!(g.score, 0.5);
    }
    let labels: Vec<&str> = result.ranking.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, ["first", "second"]);
    assert!(!result.pairwise[0].significant);
    assert!(result.pairwise[0].winner.is_none());
}

#[test]
fn same_distribution_groups_rank_by_mean() {
    let mut rng = StdRng::seed_from_u64(7);
    let draws: Vec<f64> = (0..200)
        .map(|_| 50.0 + 4.0 * inverse_normal_cdf(rng.gen_range(0.001..0.999)))
        .collect();
    let groups: GroupSet = [
        ("alpha", draws.iter().map(|x| x + 0.2).collect::<Vec<_>>()),
        ("beta", draws.clone()),
        ("gamma", draws.iter().map(|x| x - 0.2).collect()),
    ]
    .into_iter()
    .collect();

    let result = rank_groups(&groups, &RankConfig::default()).unwrap();

    assert!(result.pairwise.iter().all(|p| !p.significant));
    for g in &result.ranking {
        assert_eq!(g.score, 1.0);
    }
    let order: Vec<&str> = result.ranking.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(order, ["alpha", "beta", "gamma"]);
}

#[test]
fn equal_scores_prefer_higher_mean_over_label() {
    let base = normal_quantiles(200, 5.0, 1.0);
    let groups: GroupSet = [
        ("A", base.clone()),
        ("B", base.iter().map(|x| x + 0.05).collect()),
    ]
    .into_iter()
    .collect();

    let result = rank_groups(&groups, &RankConfig::default()).unwrap();

    assert!(!result.pairwise[0].significant);
    assert_eq!(result.ranking[0].score, 0.5);
    assert_eq!(result.ranking[1].score, 0.5);
    assert_eq!(result.ranking[0].label, "B");
    assert!(result.ranking[0].mean > result.ranking[1].mean);
}

#[test]
fn small_groups_are_excluded_not_fatal() {
    let mut groups = GroupSet::new();
    groups.insert("voucher", vec![1.0, 2.0, 3.0]);
    groups.insert("boleto", normal_quantiles(25, 10.0, 2.0));
    groups.insert("credit_card", normal_quantiles(25, 14.0, 2.0));
    groups.insert("debit_card", normal_quantiles(25, 12.0, 2.0));

    let result = rank_groups(&groups, &RankConfig::default()).unwrap();

    assert_eq!(result.ranking.len(), 3);
    assert_eq!(result.n_comparisons, 3);
    assert_eq!(result.total_score(), 3.0);
    assert_eq!(result.excluded.len(), 1);
    assert_eq!(result.excluded[0].label, "voucher");
    let order: Vec<&str> = result.ranking.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(order, ["credit_card", "debit_card", "boleto"]);
}

#[test]
fn all_groups_too_small() {
    let mut groups = GroupSet::new();
    groups.insert("a", vec![1.0, 2.0]);
    groups.insert("b", vec![3.0, 4.0]);
    let err = rank_groups(&groups, &RankConfig::default()).unwrap_err();
    assert_eq!(
        err,
        CompareError::InsufficientGroups {
            min_required: 2,
            actual: 0
        }
    );
}

// ============================================================================
// Fitting
// ============================================================================

#[test]
fn exponential_sample_prefers_exponential() {
    let data = exponential_quantiles(200);
    let fits = fit_all(&data, &FitConfig::default()).unwrap();

    let best = fits.best();
    assert_eq!(best.family, Family::Exponential);
    assert!(best.good_fit);
    assert!(best.ks_p_value > 0.05);
    assert!(best.pre_transform.is_none());

    // Gamma and Weibull nest the exponential and land right behind it.
    let gamma = fits.get(Family::Gamma).unwrap();
    let weibull = fits.get(Family::Weibull).unwrap();
    assert!(gamma.aic > best.aic && gamma.aic < best.aic + 2.5);
    assert!(weibull.aic > best.aic && weibull.aic < best.aic + 2.5);

    let normal = fits.get(Family::Normal).unwrap();
    assert!(normal.aic > best.aic + 100.0);
    assert!(!normal.good_fit);
}

#[test]
fn negative_values_skip_positive_families() {
    let data = normal_quantiles(100, 0.0, 1.0);
    let fits = fit_all(&data, &FitConfig::default()).unwrap();

    assert_eq!(fits.best().family, Family::Normal);
    for family in [
        Family::LogNormal,
        Family::Exponential,
        Family::Gamma,
        Family::Weibull,
        Family::Pareto,
        Family::ChiSquared,
    ] {
        assert!(fits.get(family).is_none(), "{family} should be skipped");
        assert!(fits.skipped().iter().any(|(f, _)| *f == family));
    }
    // Beta is rescaled onto (0, 1) rather than skipped.
    let beta = fits.get(Family::Beta).unwrap();
    assert!(beta.pre_transform.is_some());
    assert_eq!(beta.n_params, 4);
}

#[test]
fn constant_sample_is_degenerate() {
    let data = [3.25; 40];
    assert!(matches!(
        classify(&data, &ClassifierConfig::default()),
        Err(CompareError::DegenerateSample { n: 40, .. })
    ));
    assert!(matches!(
        fit_all(&data, &FitConfig::default()),
        Err(CompareError::DegenerateSample { n: 40, .. })
    ));
}

// ============================================================================
// Normality and selection
// ============================================================================

#[test]
fn every_gate_rejects_skewed_sample() {
    let data = exponential_quantiles(200);
    for gate in NormalityTest::ALL {
        let verdict = classify(&data, &ClassifierConfig::default().gate(gate)).unwrap();
        assert_eq!(verdict.gate, gate);
        assert!(!verdict.is_normal, "{} accepted an exponential sample", gate.name());
    }
}

#[test]
fn normal_sample_is_accepted_by_default_gate() {
    let verdict = classify(&normal_quantiles(150, 100.0, 15.0), &ClassifierConfig::default()).unwrap();
    assert!(verdict.is_normal);
    assert_eq!(verdict.gate, NormalityTest::KolmogorovSmirnov);
    assert_eq!(verdict.outcomes.len(), NormalityTest::ALL.len());
}

#[test]
fn group_comparison_on_skewed_groups() {
    let base = exponential_quantiles(120);
    let groups: GroupSet = [
        ("low", base.clone()),
        ("high", base.iter().map(|x| x + 1.0).collect()),
    ]
    .into_iter()
    .collect();
    let r = compare_groups(&groups, &SelectionConfig::default()).unwrap();
    assert_eq!(r.test, SelectedTest::KruskalWallis);
    assert!(r.significant);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn results_serialize_to_json() {
    let fits = fit_all(&exponential_quantiles(60), &FitConfig::default()).unwrap();
    let json = serde_json::to_value(&fits).unwrap();
    let first = &json["fits"][0];
    assert!(first["aic"].is_number());
    assert!(first["distribution"]["family"].is_string());

    let groups: GroupSet = [
        ("A", (0..20).map(f64::from).collect::<Vec<_>>()),
        ("B", (0..20).map(|i| 40.0 + f64::from(i)).collect()),
    ]
    .into_iter()
    .collect();
    let ranking = rank_groups(&groups, &RankConfig::default()).unwrap();
    let json = serde_json::to_value(&ranking).unwrap();
    assert_eq!(json["ranking"][0]["label"], "B");
    assert_eq!(json["pairwise"][0]["winner"], "B");
}
