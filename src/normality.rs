//! Normality classification.
//!
//! Runs a fixed battery of normality tests over one sample and reduces it to
//! a single normal / non-normal verdict that downstream test selection acts
//! on.
//!
//! # Battery
//!
//! | Test | Min n | Role |
//! |---|---|---|
//! | Shapiro–Wilk | 3 | small-sample power; subsampled above 5000 |
//! | Anderson–Darling | 8 | tail-sensitive; critical-value decision |
//! | Kolmogorov–Smirnov | 3 | general goodness of fit on the standardized sample |
//! | Jarque–Bera | 8 | skewness/kurtosis |
//! | D'Agostino–Pearson K² | 8 | skewness + kurtosis omnibus |
//!
//! Only the **gate** test chosen in [`ClassifierConfig`] decides
//! `is_normal`; the rest are reported alongside it. The verdict is therefore
//! one test's p-value against α, never a vote.
//!
//! # Example
//!
//! ```
//! use u_compare::normality::{classify, ClassifierConfig, NormalityTest};
//!
//! let data = [
//!     -2.5, -2.0, -1.8, -1.5, -1.2, -1.0, -0.8, -0.5, -0.3, -0.1,
//!     0.1, 0.3, 0.5, 0.8, 1.0, 1.2, 1.5, 1.8, 2.0, 2.5,
//! ];
//! let verdict = classify(&data, &ClassifierConfig::default()).unwrap();
//! assert!(verdict.is_normal);
//! assert_eq!(verdict.gate, NormalityTest::KolmogorovSmirnov);
//! assert_eq!(verdict.outcomes.len(), 5);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;
use u_numflow::special::standard_normal_cdf;

use crate::error::{CompareError, Result};
use crate::goodness::ks_test;
use crate::sample::{is_constant, validate, DEFAULT_LABEL};

/// Minimum sample size accepted by [`classify`].
pub const MIN_CLASSIFY_SIZE: usize = 3;

/// Largest sample the Shapiro–Wilk approximation is valid for.
pub const SHAPIRO_MAX_SIZE: usize = 5000;

// ── Configuration ───────────────────────────────────────────────────

/// Identifies one test of the normality battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NormalityTest {
    /// Shapiro–Wilk W (Royston 1995).
    ShapiroWilk,
    /// Anderson–Darling A².
    AndersonDarling,
    /// Kolmogorov–Smirnov D against N(0,1) after standardizing.
    KolmogorovSmirnov,
    /// Jarque–Bera.
    JarqueBera,
    /// D'Agostino–Pearson K² omnibus.
    DAgostinoPearson,
}

impl NormalityTest {
    /// Battery order. Outcomes are reported in this order.
    pub const ALL: [NormalityTest; 5] = [
        NormalityTest::ShapiroWilk,
        NormalityTest::AndersonDarling,
        NormalityTest::KolmogorovSmirnov,
        NormalityTest::JarqueBera,
        NormalityTest::DAgostinoPearson,
    ];

    /// Smallest sample the test accepts.
    pub fn min_sample_size(self) -> usize {
        match self {
            Self::ShapiroWilk | Self::KolmogorovSmirnov => 3,
            Self::AndersonDarling | Self::JarqueBera | Self::DAgostinoPearson => 8,
        }
    }

    /// Human-readable test name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ShapiroWilk => "Shapiro-Wilk",
            Self::AndersonDarling => "Anderson-Darling",
            Self::KolmogorovSmirnov => "Kolmogorov-Smirnov",
            Self::JarqueBera => "Jarque-Bera",
            Self::DAgostinoPearson => "D'Agostino-Pearson",
        }
    }
}

/// Configuration for [`classify`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Test whose p-value decides `is_normal`. Default: `KolmogorovSmirnov`.
    pub gate: NormalityTest,
    /// Significance level. Default: 0.05.
    pub significance_level: f64,
    /// Shapiro–Wilk runs on a random subsample of this size when the sample
    /// is larger. Capped at [`SHAPIRO_MAX_SIZE`]. Default: 5000.
    pub subsample_limit: usize,
    /// Seed for the subsample draw. Default: 42.
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            gate: NormalityTest::KolmogorovSmirnov,
            significance_level: 0.05,
            subsample_limit: SHAPIRO_MAX_SIZE,
            seed: 42,
        }
    }
}

impl ClassifierConfig {
    /// Sets the gating test.
    pub fn gate(mut self, gate: NormalityTest) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the significance level.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }

    /// Sets the Shapiro–Wilk subsample size.
    pub fn subsample_limit(mut self, limit: usize) -> Self {
        self.subsample_limit = limit;
        self
    }

    /// Sets the subsample seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

// ── Result Types ────────────────────────────────────────────────────

/// Result of one test of the battery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityOutcome {
    /// Which test produced this outcome.
    pub test: NormalityTest,
    /// Test statistic (W, A², D, JB or K²).
    pub statistic: f64,
    /// P-value in [0, 1].
    pub p_value: f64,
    /// Critical value the statistic was compared against, when the test
    /// decides by critical value (Anderson–Darling).
    pub critical_value: Option<f64>,
    /// Whether normality is rejected by this test at the configured α.
    pub rejected: bool,
    /// Number of observations the test actually used (smaller than the
    /// sample when Shapiro–Wilk subsampled).
    pub n_tested: usize,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityVerdict {
    /// Sample size.
    pub n: usize,
    /// `gate_p_value > significance_level`.
    pub is_normal: bool,
    /// The test that decided the verdict.
    pub gate: NormalityTest,
    /// P-value of the gating test.
    pub gate_p_value: f64,
    /// Significance level used.
    pub significance_level: f64,
    /// Every test that could run on this sample, in [`NormalityTest::ALL`] order.
    pub outcomes: Vec<NormalityOutcome>,
}

impl NormalityVerdict {
    /// Looks up the outcome of a single test.
    pub fn outcome(&self, test: NormalityTest) -> Option<&NormalityOutcome> {
        self.outcomes.iter().find(|o| o.test == test)
    }
}

// ── Classifier ──────────────────────────────────────────────────────

/// Classifies a sample as normal or non-normal.
///
/// # Errors
///
/// - [`CompareError::InsufficientData`] if n < 3, or if n is below the gate
///   test's own minimum
/// - [`CompareError::DegenerateSample`] if every value is identical, or if
///   the gate test cannot be computed on the sample (for example when the
///   moments underflow); the verdict never substitutes another test
/// - [`CompareError::MissingValues`] / [`CompareError::NonFinite`] on invalid entries
///
/// ```
/// use u_compare::error::CompareError;
/// use u_compare::normality::{classify, ClassifierConfig};
///
/// let err = classify(&[7.0; 10], &ClassifierConfig::default()).unwrap_err();
/// assert!(matches!(err, CompareError::DegenerateSample { n: 10, .. }));
/// ```
pub fn classify(data: &[f64], config: &ClassifierConfig) -> Result<NormalityVerdict> {
    validate(data, DEFAULT_LABEL, MIN_CLASSIFY_SIZE)?;
    let n = data.len();

    if is_constant(data) {
        return Err(CompareError::DegenerateSample {
            label: DEFAULT_LABEL.to_string(),
            n,
        });
    }

    if n < config.gate.min_sample_size() {
        return Err(CompareError::InsufficientData {
            label: DEFAULT_LABEL.to_string(),
            min_required: config.gate.min_sample_size(),
            actual: n,
        });
    }

    let alpha = config.significance_level;
    let outcomes: Vec<NormalityOutcome> = NormalityTest::ALL
        .iter()
        .filter_map(|&test| run_test(test, data, config))
        .collect();

    // The gate had enough data, so a missing outcome means its statistic
    // was not computable on this sample.
    let gate_outcome = outcomes.iter().find(|o| o.test == config.gate).ok_or_else(|| {
        debug!(gate = config.gate.name(), n, "gating test not computable");
        CompareError::DegenerateSample {
            label: DEFAULT_LABEL.to_string(),
            n,
        }
    })?;

    let gate = gate_outcome.test;
    let gate_p_value = gate_outcome.p_value;
    let is_normal = gate_p_value > alpha;

    debug!(n, gate = gate.name(), p = gate_p_value, is_normal, "normality classified");

    Ok(NormalityVerdict {
        n,
        is_normal,
        gate,
        gate_p_value,
        significance_level: alpha,
        outcomes,
    })
}

fn run_test(test: NormalityTest, data: &[f64], config: &ClassifierConfig) -> Option<NormalityOutcome> {
    let alpha = config.significance_level;
    match test {
        NormalityTest::ShapiroWilk => shapiro_wilk(data, alpha, config.subsample_limit, config.seed),
        NormalityTest::AndersonDarling => anderson_darling(data, alpha),
        NormalityTest::KolmogorovSmirnov => ks_normal(data, alpha),
        NormalityTest::JarqueBera => jarque_bera(data, alpha),
        NormalityTest::DAgostinoPearson => dagostino_pearson(data, alpha),
    }
}

fn p_outcome(test: NormalityTest, statistic: f64, p_value: f64, alpha: f64, n_tested: usize) -> NormalityOutcome {
    let p_value = p_value.clamp(0.0, 1.0);
    NormalityOutcome {
        test,
        statistic,
        p_value,
        critical_value: None,
        rejected: p_value <= alpha,
        n_tested,
    }
}

// ── Individual tests ────────────────────────────────────────────────

/// Runs the Shapiro–Wilk test, subsampling to `limit` observations
/// (without replacement, seeded) when the sample is larger.
///
/// Returns `None` if n < 3, zero range, or non-finite values.
///
/// ```
/// use u_compare::normality::shapiro_wilk;
///
/// let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
/// let r = shapiro_wilk(&data, 0.05, 5000, 42).unwrap();
/// assert!(r.statistic > 0.9);
/// assert!(!r.rejected);
/// ```
pub fn shapiro_wilk(data: &[f64], alpha: f64, limit: usize, seed: u64) -> Option<NormalityOutcome> {
    let limit = limit.clamp(MIN_CLASSIFY_SIZE, SHAPIRO_MAX_SIZE);
    let subsample;
    let tested: &[f64] = if data.len() > limit {
        let mut rng = StdRng::seed_from_u64(seed);
        subsample = rand::seq::index::sample(&mut rng, data.len(), limit)
            .iter()
            .map(|i| data[i])
            .collect::<Vec<f64>>();
        debug!(n = data.len(), limit, "Shapiro-Wilk on subsample");
        &subsample
    } else {
        data
    };

    u_analytics::testing::shapiro_wilk_test(tested)
        .map(|r| p_outcome(NormalityTest::ShapiroWilk, r.w, r.p_value, alpha, tested.len()))
}

/// Significance levels (percent) of the Anderson–Darling critical value table.
pub const ANDERSON_SIGNIFICANCE_LEVELS: [f64; 5] = [15.0, 10.0, 5.0, 2.5, 1.0];

/// Asymptotic Anderson–Darling critical values for a normal with estimated
/// mean and variance (Stephens 1974), matching [`ANDERSON_SIGNIFICANCE_LEVELS`].
const ANDERSON_ASYMPTOTIC: [f64; 5] = [0.576, 0.656, 0.787, 0.918, 1.092];

/// Sample-size adjusted Anderson–Darling critical values,
/// `cᵢ / (1 + 4/n − 25/n²)`, in [`ANDERSON_SIGNIFICANCE_LEVELS`] order.
///
/// ```
/// use u_compare::normality::anderson_critical_values;
///
/// let cv = anderson_critical_values(100);
/// assert!((cv[2] - 0.787 / (1.0 + 0.04 - 0.0025)).abs() < 1e-12);
/// ```
pub fn anderson_critical_values(n: usize) -> [f64; 5] {
    let nf = n as f64;
    let factor = 1.0 + 4.0 / nf - 25.0 / (nf * nf);
    ANDERSON_ASYMPTOTIC.map(|c| c / factor)
}

/// Runs the Anderson–Darling test.
///
/// The reported statistic is the raw A², but the reported p-value is not a
/// function of A² alone: it comes from `u_analytics`, which applies the
/// four-regime piecewise approximation of D'Agostino & Stephens (1986) to
/// the size-corrected A*² = A²(1 + 0.75/n + 2.25/n²). When α matches a level
/// of the critical value table, rejection is `A² ≥ critical value`;
/// otherwise it falls back to `p ≤ α`.
///
/// Returns `None` if n < 8, zero variance, or non-finite values.
pub fn anderson_darling(data: &[f64], alpha: f64) -> Option<NormalityOutcome> {
    let r = u_analytics::testing::anderson_darling_test(data)?;
    let n = data.len();

    let critical_value = ANDERSON_SIGNIFICANCE_LEVELS
        .iter()
        .position(|&level| (level / 100.0 - alpha).abs() < 1e-12)
        .map(|idx| anderson_critical_values(n)[idx]);

    let p_value = r.p_value.clamp(0.0, 1.0);
    let rejected = match critical_value {
        Some(cv) => r.statistic >= cv,
        None => p_value <= alpha,
    };

    Some(NormalityOutcome {
        test: NormalityTest::AndersonDarling,
        statistic: r.statistic,
        p_value,
        critical_value,
        rejected,
        n_tested: n,
    })
}

/// Kolmogorov–Smirnov test of the standardized sample against N(0,1).
///
/// Standardizes with the population (n denominator) standard deviation.
/// Returns `None` if n < 3 or zero variance.
pub fn ks_normal(data: &[f64], alpha: f64) -> Option<NormalityOutcome> {
    let n = data.len();
    if n < NormalityTest::KolmogorovSmirnov.min_sample_size() {
        return None;
    }
    let moments = CentralMoments::of(data)?;
    let sd = moments.m2.sqrt();
    let z: Vec<f64> = data.iter().map(|&x| (x - moments.mean) / sd).collect();
    let r = ks_test(&z, standard_normal_cdf)?;
    Some(p_outcome(NormalityTest::KolmogorovSmirnov, r.statistic, r.p_value, alpha, n))
}

/// Jarque–Bera test. Returns `None` if n < 8 or non-finite values.
pub fn jarque_bera(data: &[f64], alpha: f64) -> Option<NormalityOutcome> {
    let r = u_analytics::testing::jarque_bera_test(data)?;
    if !r.statistic.is_finite() {
        return None;
    }
    Some(p_outcome(NormalityTest::JarqueBera, r.statistic, r.p_value, alpha, data.len()))
}

/// Z-score and two-sided p-value of a moment test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZTest {
    /// Standard normal z-score.
    pub z: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

impl ZTest {
    fn new(z: f64) -> Self {
        Self {
            z,
            p_value: (2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0),
        }
    }
}

/// Biased central moments (n denominator).
struct CentralMoments {
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl CentralMoments {
    fn of(data: &[f64]) -> Option<Self> {
        let nf = data.len() as f64;
        let mean = u_numflow::stats::mean(data)?;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in data {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let (m2, m3, m4) = (m2 / nf, m3 / nf, m4 / nf);
        if m2 <= 0.0 {
            return None;
        }
        Some(Self { mean, m2, m3, m4 })
    }
}

/// D'Agostino skewness test: H₀ the population skewness is zero.
///
/// Transforms the sample skewness √b₁ to an approximately standard normal
/// z through a Johnson S_U fit (D'Agostino 1970). Requires n ≥ 8.
pub fn skew_test(data: &[f64]) -> Option<ZTest> {
    let n = data.len();
    if n < 8 {
        return None;
    }
    let m = CentralMoments::of(data)?;
    let nf = n as f64;
    let b1 = m.m3 / m.m2.powf(1.5);

    let y = b1 * ((nf + 1.0) * (nf + 3.0) / (6.0 * (nf - 2.0))).sqrt();
    let beta2 = 3.0 * (nf * nf + 27.0 * nf - 70.0) * (nf + 1.0) * (nf + 3.0)
        / ((nf - 2.0) * (nf + 5.0) * (nf + 7.0) * (nf + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    let ya = y / alpha;
    let z = delta * (ya + (ya * ya + 1.0).sqrt()).ln();

    z.is_finite().then(|| ZTest::new(z))
}

/// Anscombe–Glynn kurtosis test: H₀ the population kurtosis equals that of
/// a normal distribution. Requires n ≥ 5.
pub fn kurtosis_test(data: &[f64]) -> Option<ZTest> {
    let n = data.len();
    if n < 5 {
        return None;
    }
    let m = CentralMoments::of(data)?;
    let nf = n as f64;
    let b2 = m.m4 / (m.m2 * m.m2);

    let expected = 3.0 * (nf - 1.0) / (nf + 1.0);
    let var_b2 = 24.0 * nf * (nf - 2.0) * (nf - 3.0)
        / ((nf + 1.0) * (nf + 1.0) * (nf + 3.0) * (nf + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (nf * nf - 5.0 * nf + 2.0) / ((nf + 7.0) * (nf + 9.0))
        * (6.0 * (nf + 3.0) * (nf + 5.0) / (nf * (nf - 2.0) * (nf - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return None;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    let z = (term1 - term2) / (2.0 / (9.0 * a)).sqrt();

    z.is_finite().then(|| ZTest::new(z))
}

/// D'Agostino–Pearson K² omnibus test: K² = z²_skew + z²_kurt ~ χ²(2).
///
/// Returns `None` if n < 8 or zero variance.
///
/// ```
/// use u_compare::normality::dagostino_pearson;
///
/// // Strongly right-skewed data
/// let data: Vec<f64> = (1..=40).map(|i| (i as f64 / 8.0).exp()).collect();
/// let r = dagostino_pearson(&data, 0.05).unwrap();
/// assert!(r.rejected);
/// ```
pub fn dagostino_pearson(data: &[f64], alpha: f64) -> Option<NormalityOutcome> {
    let s = skew_test(data)?;
    let k = kurtosis_test(data)?;
    let k2 = s.z * s.z + k.z * k.z;
    // χ²₂ survival function
    let p_value = (-k2 / 2.0).exp();
    Some(p_outcome(NormalityTest::DAgostinoPearson, k2, p_value, alpha, data.len()))
}

// ── Tests ───────────────────────────────────────────────────────────
