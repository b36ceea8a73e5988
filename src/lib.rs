//! # u-compare
//!
//! Statistical comparison engine with C FFI bindings.
//!
//! u-compare answers three questions about numeric samples:
//!
//! - **Is it normal?** A battery of normality tests reduced to one gated verdict,
//!   which then selects a parametric or rank-based hypothesis test.
//! - **What distribution is it?** Maximum-likelihood fits of nine parametric
//!   families ranked by AIC/BIC and checked with a Kolmogorov–Smirnov test.
//! - **Which group is larger?** A round-robin Mann–Whitney tournament that
//!   turns pairwise significance into a deterministic ranking.
//!
//! Inputs are clean `&[f64]` slices or a [`ranking::GroupSet`] of labelled
//! samples. NaN and infinities are rejected, never dropped.
//!
//! ## Modules
//!
//! - [`normality`] — Shapiro–Wilk, Anderson–Darling, Kolmogorov–Smirnov, Jarque–Bera, D'Agostino–Pearson; gated verdict
//! - [`selection`] — Welch t / Mann–Whitney U and ANOVA / Kruskal–Wallis chosen by normality
//! - [`family`] — Parametric families, MLE estimators, log-density and CDF
//! - [`fitting`] — Declarative family table, AIC/BIC/KS scoring, ranked fit list
//! - [`ranking`] — Pairwise Mann–Whitney tournament and total ranking
//! - [`pairs`] — Unordered pair generation
//! - [`batch`] — Parallel runs over independent units (rayon), merged by key
//! - [`sample`] — Input validation and descriptive summary
//! - [`goodness`] — One-sample KS test and Kolmogorov distribution
//! - [`special`] — Digamma and trigamma for the chi-squared solver
//! - [`ffi`] — C FFI bindings (auto-generated C header via cbindgen)
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_compare::normality::{classify, ClassifierConfig};
//! use u_compare::ranking::{rank_groups, GroupSet, RankConfig};
//!
//! let data = [
//!     -2.5, -2.0, -1.8, -1.5, -1.2, -1.0, -0.8, -0.5, -0.3, -0.1,
//!     0.1, 0.3, 0.5, 0.8, 1.0, 1.2, 1.5, 1.8, 2.0, 2.5,
//! ];
//! assert!(classify(&data, &ClassifierConfig::default()).unwrap().is_normal);
//!
//! let mut groups = GroupSet::new();
//! groups.insert("A", (0..20).map(f64::from).collect());
//! groups.insert("B", (0..20).map(|i| 40.0 + f64::from(i)).collect());
//! let ranking = rank_groups(&groups, &RankConfig::default()).unwrap();
//! assert_eq!(ranking.leader().label, "B");
//! ```

pub mod batch;
pub mod error;
pub mod family;
pub mod ffi;
pub mod fitting;
pub mod goodness;
pub mod normality;
pub mod pairs;
pub mod ranking;
pub mod sample;
pub mod selection;
pub mod special;
