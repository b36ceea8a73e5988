//! C FFI bindings for u-compare.
//!
//! Exposes normality classification, distribution fitting and group ranking
//! via a C-compatible interface.
//!
//! # Design
//!
//! - **`#[repr(C)]`**: All data transfer structs
//! - **Integer error codes**: 0 = success, negative = error
//! - **Thread-local error message**: `compare_last_error()`
//! - **`catch_unwind`**: All FFI entry points wrapped to prevent panic propagation
//! - **Owned arrays**: Arrays inside result structs are allocated by Rust and
//!   released with the matching `compare_free_*` function
//!
//! # Safety
//!
//! All functions use `catch_unwind` to prevent panics from crossing the FFI boundary.
//! Null pointer arguments return error code -1.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;
use std::slice;

use crate::error::CompareError;
use crate::family::Family;
use crate::fitting::{fit_all, FitConfig};
use crate::normality::{classify, ClassifierConfig, NormalityTest, NormalityVerdict};
use crate::ranking::{rank_groups, GroupSet, RankConfig};

// ── Error handling ────────────────────────────────────────────────────

/// Error codes returned by FFI functions.
pub const COMPARE_OK: i32 = 0;
pub const COMPARE_ERR_NULL_PTR: i32 = -1;
pub const COMPARE_ERR_INVALID_INPUT: i32 = -2;
pub const COMPARE_ERR_INSUFFICIENT_DATA: i32 = -3;
pub const COMPARE_ERR_DEGENERATE: i32 = -4;
pub const COMPARE_ERR_NO_FIT: i32 = -5;
pub const COMPARE_ERR_PANIC: i32 = -99;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Records `err` as the last error and returns its code.
fn fail(err: &CompareError) -> i32 {
    set_last_error(&err.to_string());
    match err {
        CompareError::MissingValues { .. } | CompareError::NonFinite { .. } => {
            COMPARE_ERR_INVALID_INPUT
        }
        CompareError::InsufficientData { .. } | CompareError::InsufficientGroups { .. } => {
            COMPARE_ERR_INSUFFICIENT_DATA
        }
        CompareError::DegenerateSample { .. } => COMPARE_ERR_DEGENERATE,
        CompareError::NoFitAvailable { .. } => COMPARE_ERR_NO_FIT,
    }
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn compare_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn compare_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Returns the library version as a null-terminated string.
#[no_mangle]
pub extern "C" fn compare_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

/// Moves a vector to the heap as an exactly-sized array for C.
fn into_raw_array<T>(items: Vec<T>) -> (*mut T, u32) {
    let boxed = items.into_boxed_slice();
    let len = boxed.len() as u32;
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaims an array produced by [`into_raw_array`].
///
/// # Safety
/// `ptr` and `len` must come from `into_raw_array`, or `ptr` must be null.
unsafe fn free_raw_array<T>(ptr: *mut T, len: u32) {
    if !ptr.is_null() {
        let slice = ptr::slice_from_raw_parts_mut(ptr, len as usize);
        drop(unsafe { Box::from_raw(slice) });
    }
}

// ── Normality FFI ───────────────────────────────────────────────────

/// C-compatible normality verdict.
///
/// Statistics of tests that could not run at this sample size are NaN.
#[repr(C)]
pub struct CNormalityResult {
    /// Number of observations.
    pub n: u32,
    /// 1 = normal, 0 = not normal.
    pub is_normal: i32,
    /// Gating test: 0 = Shapiro-Wilk, 1 = Anderson-Darling,
    /// 2 = Kolmogorov-Smirnov, 3 = Jarque-Bera, 4 = D'Agostino-Pearson.
    pub gate: i32,
    /// P-value of the gating test.
    pub gate_p_value: f64,
    pub sw_statistic: f64,
    pub sw_p_value: f64,
    pub ad_statistic: f64,
    pub ad_p_value: f64,
    /// Anderson-Darling critical value at the requested level (NaN if the
    /// level is not tabulated).
    pub ad_critical_value: f64,
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub jb_statistic: f64,
    pub jb_p_value: f64,
    pub k2_statistic: f64,
    pub k2_p_value: f64,
}

fn test_from_code(code: i32) -> Option<NormalityTest> {
    usize::try_from(code)
        .ok()
        .and_then(|i| NormalityTest::ALL.get(i).copied())
}

fn test_code(test: NormalityTest) -> i32 {
    NormalityTest::ALL
        .iter()
        .position(|&t| t == test)
        .map_or(-1, |i| i as i32)
}

impl CNormalityResult {
    fn from_verdict(v: &NormalityVerdict) -> Self {
        let stat = |t| v.outcome(t).map_or((f64::NAN, f64::NAN), |o| (o.statistic, o.p_value));
        let (sw_statistic, sw_p_value) = stat(NormalityTest::ShapiroWilk);
        let (ad_statistic, ad_p_value) = stat(NormalityTest::AndersonDarling);
        let (ks_statistic, ks_p_value) = stat(NormalityTest::KolmogorovSmirnov);
        let (jb_statistic, jb_p_value) = stat(NormalityTest::JarqueBera);
        let (k2_statistic, k2_p_value) = stat(NormalityTest::DAgostinoPearson);
        Self {
            n: v.n as u32,
            is_normal: i32::from(v.is_normal),
            gate: test_code(v.gate),
            gate_p_value: v.gate_p_value,
            sw_statistic,
            sw_p_value,
            ad_statistic,
            ad_p_value,
            ad_critical_value: v
                .outcome(NormalityTest::AndersonDarling)
                .and_then(|o| o.critical_value)
                .unwrap_or(f64::NAN),
            ks_statistic,
            ks_p_value,
            jb_statistic,
            jb_p_value,
            k2_statistic,
            k2_p_value,
        }
    }
}

/// Classifies a sample as normal or non-normal.
///
/// `gate` selects the deciding test (see [`CNormalityResult::gate`]).
///
/// # Safety
/// - `data` must point to `n` contiguous f64 values.
/// - `out` must point to a valid `CNormalityResult`.
#[no_mangle]
pub unsafe extern "C" fn compare_classify(
    data: *const f64,
    n: u32,
    gate: i32,
    significance_level: f64,
    out: *mut CNormalityResult,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if data.is_null() || out.is_null() {
            set_last_error("null pointer");
            return COMPARE_ERR_NULL_PTR;
        }
        let Some(gate) = test_from_code(gate) else {
            set_last_error(&format!("unknown normality test code {gate}"));
            return COMPARE_ERR_INVALID_INPUT;
        };

        let values = unsafe { slice::from_raw_parts(data, n as usize) };
        let config = ClassifierConfig::default()
            .gate(gate)
            .significance_level(significance_level);

        match classify(values, &config) {
            Ok(verdict) => {
                unsafe {
                    (*out) = CNormalityResult::from_verdict(&verdict);
                }
                COMPARE_OK
            }
            Err(e) => fail(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in compare_classify");
            COMPARE_ERR_PANIC
        }
    }
}

// ── Fitting FFI ─────────────────────────────────────────────────────

/// C-compatible distribution fit.
#[repr(C)]
pub struct CDistributionFit {
    /// Family: 0 = Normal, 1 = LogNormal, 2 = Exponential, 3 = Gamma,
    /// 4 = Weibull, 5 = Beta, 6 = Pareto, 7 = ChiSquared, 8 = Uniform.
    pub family: i32,
    /// First parameter (see `FittedDistribution::params`).
    pub param1: f64,
    /// Second parameter, NaN for one-parameter families.
    pub param2: f64,
    pub log_likelihood: f64,
    pub n_params: u32,
    pub aic: f64,
    pub bic: f64,
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    /// 1 = KS p-value above the good-fit threshold.
    pub good_fit: i32,
    /// 1 = fitted on a min-max rescaled sample.
    pub rescaled: i32,
}

/// C-compatible ranked fit list.
#[repr(C)]
pub struct CFitList {
    /// Fits best first. Caller must free with `compare_free_fits`.
    pub fits: *mut CDistributionFit,
    /// Number of fits.
    pub n_fits: u32,
}

fn family_code(family: Family) -> i32 {
    Family::ALL
        .iter()
        .position(|&f| f == family)
        .map_or(-1, |i| i as i32)
}

/// Fits every candidate family and ranks the fits by AIC.
///
/// # Safety
/// - `data` must point to `n` contiguous f64 values.
/// - `out` must point to a valid `CFitList`.
/// - The caller must release `out` with `compare_free_fits`.
#[no_mangle]
pub unsafe extern "C" fn compare_fit_all(data: *const f64, n: u32, out: *mut CFitList) -> i32 {
    let result = panic::catch_unwind(|| {
        if data.is_null() || out.is_null() {
            set_last_error("null pointer");
            return COMPARE_ERR_NULL_PTR;
        }

        let values = unsafe { slice::from_raw_parts(data, n as usize) };
        let fits = match fit_all(values, &FitConfig::default()) {
            Ok(f) => f,
            Err(e) => return fail(&e),
        };

        let c_fits: Vec<CDistributionFit> = fits
            .iter()
            .map(|f| {
                let params = f.distribution.params();
                CDistributionFit {
                    family: family_code(f.family),
                    param1: params.first().map_or(f64::NAN, |p| p.1),
                    param2: params.get(1).map_or(f64::NAN, |p| p.1),
                    log_likelihood: f.log_likelihood,
                    n_params: f.n_params as u32,
                    aic: f.aic,
                    bic: f.bic,
                    ks_statistic: f.ks_statistic,
                    ks_p_value: f.ks_p_value,
                    good_fit: i32::from(f.good_fit),
                    rescaled: i32::from(f.pre_transform.is_some()),
                }
            })
            .collect();
        let (fits_ptr, n_fits) = into_raw_array(c_fits);

        unsafe {
            (*out) = CFitList {
                fits: fits_ptr,
                n_fits,
            };
        }
        COMPARE_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in compare_fit_all");
            COMPARE_ERR_PANIC
        }
    }
}

/// Frees the array inside a `CFitList` and resets it.
///
/// # Safety
/// `list` must have been filled by `compare_fit_all`, or be null.
#[no_mangle]
pub unsafe extern "C" fn compare_free_fits(list: *mut CFitList) {
    if list.is_null() {
        return;
    }
    unsafe {
        free_raw_array((*list).fits, (*list).n_fits);
        (*list).fits = ptr::null_mut();
        (*list).n_fits = 0;
    }
}

// ── Ranking FFI ─────────────────────────────────────────────────────

/// C-compatible ranked group.
#[repr(C)]
pub struct CRankedGroup {
    /// Index of the group in the caller's `labels` array.
    pub group_index: u32,
    /// 1-based rank.
    pub position: u32,
    pub score: f64,
    pub mean: f64,
    pub n: u32,
}

/// C-compatible ranking result.
#[repr(C)]
pub struct CRanking {
    /// Ranked groups best first. Caller must free with `compare_free_ranking`.
    pub groups: *mut CRankedGroup,
    /// Number of ranked groups.
    pub n_groups: u32,
    /// Number of groups excluded by the minimum-size filter.
    pub n_excluded: u32,
    /// Number of pairwise comparisons run.
    pub n_comparisons: u32,
}

/// Ranks groups by a pairwise Mann-Whitney tournament.
///
/// Group `i` has label `labels[i]` and `sizes[i]` observations; the
/// observations of all groups are concatenated in `values` in group order.
///
/// # Safety
/// - `labels` must point to `n_groups` valid null-terminated strings.
/// - `sizes` must point to `n_groups` u32 values.
/// - `values` must point to `sum(sizes)` contiguous f64 values.
/// - `out` must point to a valid `CRanking`.
/// - The caller must release `out` with `compare_free_ranking`.
#[no_mangle]
pub unsafe extern "C" fn compare_rank_groups(
    labels: *const *const c_char,
    sizes: *const u32,
    n_groups: u32,
    values: *const f64,
    min_group_size: u32,
    significance_level: f64,
    out: *mut CRanking,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if labels.is_null() || sizes.is_null() || values.is_null() || out.is_null() {
            set_last_error("null pointer");
            return COMPARE_ERR_NULL_PTR;
        }

        let k = n_groups as usize;
        let label_ptrs = unsafe { slice::from_raw_parts(labels, k) };
        let sizes = unsafe { slice::from_raw_parts(sizes, k) };
        let total: usize = sizes.iter().map(|&s| s as usize).sum();
        let values = unsafe { slice::from_raw_parts(values, total) };

        let mut groups = GroupSet::new();
        let mut index_of: HashMap<String, u32> = HashMap::with_capacity(k);
        let mut offset = 0;
        for (i, (&label_ptr, &size)) in label_ptrs.iter().zip(sizes).enumerate() {
            if label_ptr.is_null() {
                set_last_error("null group label");
                return COMPARE_ERR_NULL_PTR;
            }
            let label = match unsafe { CStr::from_ptr(label_ptr) }.to_str() {
                Ok(s) => s.to_string(),
                Err(_) => {
                    set_last_error("group label is not valid UTF-8");
                    return COMPARE_ERR_INVALID_INPUT;
                }
            };
            if index_of.insert(label.clone(), i as u32).is_some() {
                set_last_error(&format!("duplicate group label '{label}'"));
                return COMPARE_ERR_INVALID_INPUT;
            }
            let end = offset + size as usize;
            groups.insert(label, values[offset..end].to_vec());
            offset = end;
        }

        let config = RankConfig::default()
            .min_group_size(min_group_size as usize)
            .significance_level(significance_level);
        let ranking = match rank_groups(&groups, &config) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };

        let c_groups: Vec<CRankedGroup> = ranking
            .ranking
            .iter()
            .map(|g| CRankedGroup {
                group_index: index_of.get(&g.label).copied().unwrap_or(u32::MAX),
                position: g.position as u32,
                score: g.score,
                mean: g.mean,
                n: g.n as u32,
            })
            .collect();
        let (groups_ptr, n_ranked) = into_raw_array(c_groups);

        unsafe {
            (*out) = CRanking {
                groups: groups_ptr,
                n_groups: n_ranked,
                n_excluded: ranking.excluded.len() as u32,
                n_comparisons: ranking.n_comparisons as u32,
            };
        }
        COMPARE_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in compare_rank_groups");
            COMPARE_ERR_PANIC
        }
    }
}

/// Frees the array inside a `CRanking` and resets it.
///
/// # Safety
/// `ranking` must have been filled by `compare_rank_groups`, or be null.
#[no_mangle]
pub unsafe extern "C" fn compare_free_ranking(ranking: *mut CRanking) {
    if ranking.is_null() {
        return;
    }
    unsafe {
        free_raw_array((*ranking).groups, (*ranking).n_groups);
        (*ranking).groups = ptr::null_mut();
        (*ranking).n_groups = 0;
    }
}
