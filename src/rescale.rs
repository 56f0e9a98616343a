//! Rescaler (C7): maps a fit computed in centered/scaled internal
//! coordinates back to the caller's original scale.
//!
//! The solver always runs on (possibly implicitly, via [`crate::matrix`]'s
//! logical-standardization side channel) centered-and-scaled `X` and
//! centered-and-scaled `y`. Centering and scaling themselves are out of
//! scope for this crate (§1, data loading/standardization) — this module
//! only undoes the bookkeeping once a fit comes back, given the
//! center/scale vectors the caller supplies.

/// Centering/scaling the solver's internal coordinates were fit under.
#[derive(Debug, Clone)]
pub struct RescaleParams {
    pub x_center: Option<Vec<f64>>,
    pub x_scale: Option<Vec<f64>>,
    pub y_center: f64,
    pub y_scale: f64,
}

impl RescaleParams {
    /// No centering or scaling in effect: `rescale` becomes the identity.
    pub fn identity(p: usize) -> Self {
        Self {
            x_center: None,
            x_scale: Some(vec![1.0; p]),
            y_center: 0.0,
            y_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RescaledFit {
    pub beta: Vec<f64>,
    pub alpha: f64,
}

/// `beta_orig_j = beta_internal_j * y_scale / x_scale_j`,
/// `alpha_orig = alpha_internal * y_scale + y_center - sum_j(beta_orig_j * x_center_j)`.
pub fn rescale(beta_internal: &[f64], alpha_internal: f64, params: &RescaleParams) -> RescaledFit {
    let beta: Vec<f64> = match &params.x_scale {
        Some(scale) => beta_internal.iter().zip(scale.iter()).map(|(b, s)| b * params.y_scale / s).collect(),
        None => beta_internal.iter().map(|b| b * params.y_scale).collect(),
    };

    let center_term: f64 = match &params.x_center {
        Some(center) => beta.iter().zip(center.iter()).map(|(b, c)| b * c).sum(),
        None => 0.0,
    };

    let alpha = alpha_internal * params.y_scale + params.y_center - center_term;
    RescaledFit { beta, alpha }
}
