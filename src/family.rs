//! Data-fit loss family (C3): primal loss, Fenchel dual, pseudo-gradient,
//! and null-model link, dispatched through a tagged enum rather than
//! virtual dispatch so nothing allocates inside the per-pass hot path.

use nalgebra::DMatrix;

use crate::config::FamilyKind;

/// Data-fit loss, dispatched per-sigma and per-pass via a tag switch.
#[derive(Debug, Clone, Copy)]
pub enum Family {
    Gaussian,
    Binomial,
}

impl From<FamilyKind> for Family {
    fn from(kind: FamilyKind) -> Self {
        match kind {
            FamilyKind::Gaussian => Family::Gaussian,
            FamilyKind::Binomial => Family::Binomial,
        }
    }
}

const CLIP_LO: f64 = 1e-9;
const CLIP_HI: f64 = 1.0 - 1e-9;

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Gaussian => "gaussian",
            Family::Binomial => "binomial",
        }
    }

    /// The data-fit loss at linear predictor `eta`.
    pub fn primal(self, y: &DMatrix<f64>, eta: &DMatrix<f64>) -> f64 {
        match self {
            Family::Gaussian => {
                let d = eta - y;
                0.5 * d.iter().map(|v| v * v).sum::<f64>()
            }
            Family::Binomial => y
                .iter()
                .zip(eta.iter())
                .map(|(&yi, &ei)| {
                    let a = (yi * ei).exp();
                    (1.0 + 1.0 / a).ln()
                })
                .sum(),
        }
    }

    /// The Fenchel dual objective used for the duality gap.
    pub fn dual(self, y: &DMatrix<f64>, eta: &DMatrix<f64>) -> f64 {
        match self {
            Family::Gaussian => {
                let d = eta - y;
                let primal = 0.5 * d.iter().map(|v| v * v).sum::<f64>();
                let cross: f64 = d.iter().zip(y.iter()).map(|(&di, &yi)| di * yi).sum();
                -primal - cross
            }
            Family::Binomial => {
                let mut acc = 0.0;
                for (&yi, &ei) in y.iter().zip(eta.iter()) {
                    let a = (yi * ei).exp();
                    let r = 1.0 / (1.0 + a);
                    acc += (r - 1.0) * (1.0 - r).ln() - r * r.ln();
                }
                acc
            }
        }
    }

    /// `d(loss)/d(eta)`; the gradient wrt beta is `X^T * pseudo_gradient`.
    pub fn pseudo_gradient(self, y: &DMatrix<f64>, eta: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Family::Gaussian => eta - y,
            Family::Binomial => y.zip_map(eta, |yi, ei| {
                let a = (yi * ei).exp();
                -yi / (1.0 + a)
            }),
        }
    }

    /// Inverse-link used for null-model initialization: maps a clipped
    /// proportion `p` back to an initial `eta`. Intentionally mixes clipped
    /// and unclipped `y` for the binomial case, per the documented source
    /// behavior this engine preserves.
    pub fn link(self, y: &DMatrix<f64>, p: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Family::Gaussian => p.clone(),
            Family::Binomial => y.zip_map(p, |yi, pi| {
                let clipped = pi.clamp(CLIP_LO, CLIP_HI);
                ((yi + 1.0) / 2.0 / (1.0 - clipped)).ln()
            }),
        }
    }
}
