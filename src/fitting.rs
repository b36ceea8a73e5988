//! Distribution fitting and model selection.
//!
//! [`fit_all`] walks a declarative table of [`FamilyDescriptor`]s, fits every
//! family whose support admits the sample, scores each fit by AIC, BIC and a
//! Kolmogorov–Smirnov goodness-of-fit test, and returns the fits ranked
//! best-first.
//!
//! # Example
//!
//! ```
//! use u_compare::family::Family;
//! use u_compare::fitting::{fit_all, FitConfig};
//!
//! // Exponential quantiles
//! let data: Vec<f64> = (0..200).map(|i| -(1.0 - (i as f64 + 0.5) / 200.0).ln()).collect();
//! let fits = fit_all(&data, &FitConfig::default()).unwrap();
//!
//! let best = fits.best();
//! assert!(matches!(best.family, Family::Exponential | Family::Gamma | Family::Weibull));
//! assert!(best.good_fit);
//! assert!(fits.get(Family::Normal).is_some_and(|f| !f.good_fit));
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{CompareError, Result};
use crate::family::{Family, FittedDistribution};
use crate::goodness::ks_test;
use crate::sample::{is_constant, validate, DEFAULT_LABEL};

/// Minimum sample size accepted by [`fit_all`].
pub const MIN_FIT_SIZE: usize = 2;

// ── Family table ────────────────────────────────────────────────────

/// Values a family's density is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Support {
    /// (−∞, ∞)
    Real,
    /// (0, ∞)
    Positive,
    /// (0, 1)
    UnitInterval,
}

impl Support {
    /// Whether `x` lies in the support.
    pub fn contains(self, x: f64) -> bool {
        match self {
            Self::Real => x.is_finite(),
            Self::Positive => x > 0.0,
            Self::UnitInterval => x > 0.0 && x < 1.0,
        }
    }

    /// Whether every value of `data` lies in the support.
    pub fn admits(self, data: &[f64]) -> bool {
        data.iter().all(|&x| self.contains(x))
    }
}

/// Transform applied to a sample before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PreTransform {
    /// `(x − min) / (max − min)`, clamped to `[epsilon, 1 − epsilon]`.
    MinMaxRescale {
        /// Sample minimum.
        min: f64,
        /// Sample maximum.
        max: f64,
        /// Distance kept from the open interval's endpoints.
        epsilon: f64,
    },
}

impl PreTransform {
    /// Applies the transform to one value.
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            Self::MinMaxRescale { min, max, epsilon } => {
                ((x - min) / (max - min)).clamp(epsilon, 1.0 - epsilon)
            }
        }
    }

    /// ln |dy/dx| of the transform, added once per observation to express a
    /// transformed-scale likelihood on the original scale.
    pub fn ln_jacobian(&self) -> f64 {
        match *self {
            Self::MinMaxRescale { min, max, .. } => -(max - min).ln(),
        }
    }

    /// Parameters estimated from the data by the transform itself.
    pub fn n_params(&self) -> usize {
        match self {
            Self::MinMaxRescale { .. } => 2,
        }
    }
}

/// Declarative description of one candidate family.
#[derive(Debug, Clone, Copy)]
pub struct FamilyDescriptor {
    /// The family.
    pub family: Family,
    /// Values the sample must lie in.
    pub support: Support,
    /// Free parameter count (k).
    pub n_params: usize,
    /// When true, a sample outside the support is min–max rescaled into it
    /// instead of skipping the family.
    pub rescale_outside_support: bool,
    /// Maximum-likelihood estimator.
    pub estimator: fn(&[f64]) -> Option<FittedDistribution>,
}

macro_rules! descriptor {
    ($family:ident, $support:ident, $rescale:expr) => {
        FamilyDescriptor {
            family: Family::$family,
            support: Support::$support,
            n_params: Family::$family.n_params(),
            rescale_outside_support: $rescale,
            estimator: |data| Family::$family.estimate(data),
        }
    };
}

const DESCRIPTORS: [FamilyDescriptor; 9] = [
    descriptor!(Normal, Real, false),
    descriptor!(LogNormal, Positive, false),
    descriptor!(Exponential, Positive, false),
    descriptor!(Gamma, Positive, false),
    descriptor!(Weibull, Positive, false),
    descriptor!(Beta, UnitInterval, true),
    descriptor!(Pareto, Positive, false),
    descriptor!(ChiSquared, Positive, false),
    descriptor!(Uniform, Real, false),
];

/// Returns the descriptor of `family`.
pub fn descriptor(family: Family) -> FamilyDescriptor {
    DESCRIPTORS[family as usize]
}

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for [`fit_all`].
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Families to try, in tie-breaking order. Default: [`Family::ALL`].
    pub families: Vec<Family>,
    /// `good_fit` is set when the KS p-value exceeds this. Default: 0.05.
    pub good_fit_alpha: f64,
    /// Clamp margin for rescaled samples. Default: 1e-6.
    pub rescale_epsilon: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            families: Family::ALL.to_vec(),
            good_fit_alpha: 0.05,
            rescale_epsilon: 1e-6,
        }
    }
}

impl FitConfig {
    /// Replaces the family menu.
    pub fn families(mut self, families: impl Into<Vec<Family>>) -> Self {
        self.families = families.into();
        self
    }

    /// Sets the goodness-of-fit threshold.
    pub fn good_fit_alpha(mut self, alpha: f64) -> Self {
        self.good_fit_alpha = alpha;
        self
    }

    /// Sets the rescale clamp margin.
    pub fn rescale_epsilon(mut self, epsilon: f64) -> Self {
        self.rescale_epsilon = epsilon;
        self
    }
}

// ── Result Types ────────────────────────────────────────────────────

/// One scored fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionFit {
    /// Fitted family.
    pub family: Family,
    /// Fitted parameters.
    pub distribution: FittedDistribution,
    /// Σ ln f(xᵢ), on the original scale of the sample.
    pub log_likelihood: f64,
    /// Free parameter count, including any estimated by the pre-transform.
    pub n_params: usize,
    /// Sample size.
    pub n: usize,
    /// 2k − 2 ln L.
    pub aic: f64,
    /// k ln n − 2 ln L.
    pub bic: f64,
    /// KS statistic of the fitted CDF against the fitted sample.
    pub ks_statistic: f64,
    /// KS p-value.
    pub ks_p_value: f64,
    /// `ks_p_value > good_fit_alpha`.
    pub good_fit: bool,
    /// Transform applied to the sample before fitting, if any.
    pub pre_transform: Option<PreTransform>,
}

/// Why a family is absent from a [`RankedFitList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The sample violates the family's support.
    OutsideSupport,
    /// The estimator did not converge to valid parameters.
    EstimationFailed,
    /// Log-likelihood, AIC or the KS test was not finite.
    NonFiniteScore,
}

/// Fits sorted by ascending AIC, ties by BIC, then menu order.
///
/// Never empty: [`fit_all`] returns `NoFitAvailable` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFitList {
    fits: Vec<DistributionFit>,
    skipped: Vec<(Family, SkipReason)>,
}

impl RankedFitList {
    /// The best fit (lowest AIC).
    pub fn best(&self) -> &DistributionFit {
        &self.fits[0]
    }

    /// The best fit that was made on the untransformed sample.
    pub fn best_on_original_scale(&self) -> Option<&DistributionFit> {
        self.fits.iter().find(|f| f.pre_transform.is_none())
    }

    /// Fit for a specific family, if it was fitted.
    pub fn get(&self, family: Family) -> Option<&DistributionFit> {
        self.fits.iter().find(|f| f.family == family)
    }

    /// All fits, best first.
    pub fn fits(&self) -> &[DistributionFit] {
        &self.fits
    }

    /// Families that were attempted but produced no fit.
    pub fn skipped(&self) -> &[(Family, SkipReason)] {
        &self.skipped
    }

    /// Number of fits.
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Iterates over fits, best first.
    pub fn iter(&self) -> std::slice::Iter<'_, DistributionFit> {
        self.fits.iter()
    }

    /// Consumes the list, returning fits best first.
    pub fn into_fits(self) -> Vec<DistributionFit> {
        self.fits
    }
}

impl<'a> IntoIterator for &'a RankedFitList {
    type Item = &'a DistributionFit;
    type IntoIter = std::slice::Iter<'a, DistributionFit>;

    fn into_iter(self) -> Self::IntoIter {
        self.fits.iter()
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Fits every configured family and ranks the results.
///
/// # Errors
///
/// - [`CompareError::InsufficientData`] if n < 2
/// - [`CompareError::DegenerateSample`] if every value is identical
/// - [`CompareError::NoFitAvailable`] if every family was skipped or failed
/// - [`CompareError::MissingValues`] / [`CompareError::NonFinite`] on invalid entries
pub fn fit_all(data: &[f64], config: &FitConfig) -> Result<RankedFitList> {
    validate(data, DEFAULT_LABEL, MIN_FIT_SIZE)?;
    let n = data.len();
    if is_constant(data) {
        return Err(CompareError::DegenerateSample {
            label: DEFAULT_LABEL.to_string(),
            n,
        });
    }

    let mut scored: Vec<(usize, DistributionFit)> = Vec::with_capacity(config.families.len());
    let mut skipped = Vec::new();

    for (order, &family) in config.families.iter().enumerate() {
        match fit_family(data, &descriptor(family), config) {
            Ok(fit) => {
                debug!(family = family.name(), aic = fit.aic, ks_p = fit.ks_p_value, "fitted");
                scored.push((order, fit));
            }
            Err(reason) => {
                debug!(family = family.name(), ?reason, "family skipped");
                skipped.push((family, reason));
            }
        }
    }

    if scored.is_empty() {
        return Err(CompareError::NoFitAvailable {
            label: DEFAULT_LABEL.to_string(),
            n,
            attempted: config.families.len(),
        });
    }

    scored.sort_by(|(oa, a), (ob, b)| {
        a.aic
            .total_cmp(&b.aic)
            .then_with(|| a.bic.total_cmp(&b.bic))
            .then_with(|| oa.cmp(ob))
    });

    Ok(RankedFitList {
        fits: scored.into_iter().map(|(_, fit)| fit).collect(),
        skipped,
    })
}

/// Fits and scores a single family described by `desc`.
fn fit_family(
    data: &[f64],
    desc: &FamilyDescriptor,
    config: &FitConfig,
) -> std::result::Result<DistributionFit, SkipReason> {
    let (sample, pre_transform) = if desc.support.admits(data) {
        (None, None)
    } else if desc.rescale_outside_support {
        let transform = min_max_rescale(data, config.rescale_epsilon)
            .ok_or(SkipReason::OutsideSupport)?;
        let rescaled: Vec<f64> = data.iter().map(|&x| transform.apply(x)).collect();
        (Some(rescaled), Some(transform))
    } else {
        return Err(SkipReason::OutsideSupport);
    };
    let sample: &[f64] = sample.as_deref().unwrap_or(data);

    let distribution = (desc.estimator)(sample).ok_or(SkipReason::EstimationFailed)?;

    let n = sample.len();
    let n_params = desc.n_params + pre_transform.map_or(0, |t| t.n_params());
    let k = n_params as f64;
    let log_likelihood = distribution.log_likelihood(sample)
        + pre_transform.map_or(0.0, |t| n as f64 * t.ln_jacobian());
    let aic = 2.0 * k - 2.0 * log_likelihood;
    let bic = k * (n as f64).ln() - 2.0 * log_likelihood;
    if !(log_likelihood.is_finite() && aic.is_finite() && bic.is_finite()) {
        return Err(SkipReason::NonFiniteScore);
    }

    // The transform is monotone, so D is the same on either scale.
    let ks = ks_test(sample, |x| distribution.cdf(x)).ok_or(SkipReason::NonFiniteScore)?;

    Ok(DistributionFit {
        family: desc.family,
        distribution,
        log_likelihood,
        n_params,
        n,
        aic,
        bic,
        ks_statistic: ks.statistic,
        ks_p_value: ks.p_value,
        good_fit: ks.p_value > config.good_fit_alpha,
        pre_transform,
    })
}

fn min_max_rescale(data: &[f64], epsilon: f64) -> Option<PreTransform> {
    let min = u_numflow::stats::min(data)?;
    let max = u_numflow::stats::max(data)?;
    (max > min).then_some(PreTransform::MinMaxRescale { min, max, epsilon })
}
