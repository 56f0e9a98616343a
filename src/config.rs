//! Control parameters for [`crate::path::fit_path`].
//!
//! Shape mirrors the options table in the design: one plain struct with a
//! `Default` impl carrying the numeric tolerances, rather than a layered
//! TOML/env config — there is no host process here to read files for.

use serde::{Deserialize, Serialize};

/// Which generalized-linear-model family the path is fit under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Gaussian,
    Binomial,
}

impl FamilyKind {
    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::Gaussian => "gaussian",
            FamilyKind::Binomial => "binomial",
        }
    }
}

/// All tunables a caller can set on a fit. Defaults follow common SLOPE-path
/// practice; every field here corresponds to one row of the control-options
/// table in the design.
#[derive(Debug, Clone)]
pub struct FitControl {
    pub family: FamilyKind,
    pub fit_intercept: bool,

    /// Length p*m, already sorted non-increasing, non-negative.
    pub lambda: Vec<f64>,

    /// Length K, non-increasing, positive. Must be supplied by the caller;
    /// this engine does not build a default grid (out of scope, §1).
    pub sigma: Vec<f64>,

    pub max_passes: usize,
    pub tol_rel_gap: f64,
    pub tol_infeas: f64,

    /// Reserved for the ADMM path; unused by the FISTA solver.
    pub tol_abs: f64,
    pub tol_rel: f64,

    pub tol_dev_ratio: f64,
    pub tol_dev_change: f64,
    pub max_variables: usize,

    pub screening: bool,
    pub diagnostics: bool,
    pub verbosity: u8,
}

impl FitControl {
    pub fn new(family: FamilyKind, lambda: Vec<f64>, sigma: Vec<f64>) -> Self {
        Self {
            family,
            fit_intercept: true,
            lambda,
            sigma,
            max_passes: 100_000,
            tol_rel_gap: 1e-6,
            tol_infeas: 1e-2,
            tol_abs: 1e-7,
            tol_rel: 1e-5,
            tol_dev_ratio: 0.999,
            tol_dev_change: 1e-5,
            max_variables: usize::MAX,
            screening: true,
            diagnostics: false,
            verbosity: 0,
        }
    }
}
