//! Strong-set screening and active-set driver (C5): one call solves a single
//! `sigma_k` to a full KKT certificate, using the sequential strong rule to
//! avoid ever materializing a FISTA problem over all `p` columns.
//!
//! Restricting FISTA to an active set `A` is exact, not approximate: since
//! every coordinate outside `A` is held at exactly zero, the sorted-L1
//! penalty restricted to `beta_A` is `sum_{i=1}^{|A|} lambda_i |beta_A|_(i)`
//! — the zero coordinates occupy the smallest `p - |A|` ranks by
//! construction, so they never compete for the early, large-lambda slots.

use nalgebra::DMatrix;

use crate::cancel::Cancellation;
use crate::config::FitControl;
use crate::diagnostics::DiagnosticsRecorder;
use crate::family::Family;
use crate::fista::fista_solve;
use crate::kkt::{infeasibility, violating_coordinates};
use crate::matrix::DesignMatrix;

pub struct ActiveSetResult {
    pub beta: DMatrix<f64>,
    pub alpha: f64,
    pub eta: DMatrix<f64>,
    pub passes: usize,
    pub kkt_rounds: usize,
    pub active_set_size: usize,
    pub converged: bool,
    pub final_infeasibility: f64,
    pub final_rel_gap: f64,
}

fn strong_candidates(g_full: &[f64], sigma_k: f64, sigma_prev: Option<f64>, lambda1: f64, p: usize) -> Vec<usize> {
    let Some(sigma_prev) = sigma_prev else {
        return (0..p).collect();
    };
    let threshold = ((2.0 * sigma_k - sigma_prev) * lambda1).max(0.0);
    g_full
        .iter()
        .enumerate()
        .filter(|&(_, &gi)| gi.abs() >= threshold)
        .map(|(i, _)| i)
        .collect()
}

fn sorted_unique(mut idx: Vec<usize>) -> Vec<usize> {
    idx.sort_unstable();
    idx.dedup();
    idx
}

/// Solve one `sigma_k` from a warm-started full-length `beta`/`alpha`,
/// mutating `ever_active` and `screening_enabled` as the design's ever-active
/// union and full-set fallback require.
#[allow(clippy::too_many_arguments)]
pub fn fit_sigma<M: DesignMatrix>(
    x: &M,
    y: &DMatrix<f64>,
    lambda: &[f64],
    sigma_k: f64,
    sigma_prev: Option<f64>,
    family: Family,
    beta_warm: &DMatrix<f64>,
    alpha_warm: f64,
    ever_active: &mut [bool],
    screening_enabled: &mut bool,
    control: &FitControl,
    diagnostics: &mut DiagnosticsRecorder,
    cancel: &dyn Cancellation,
) -> ActiveSetResult {
    let p = lambda.len();
    let lambda1 = lambda.first().copied().unwrap_or(0.0);

    let eta0 = x.mul(beta_warm).map(|v| v + alpha_warm);
    let pg0 = family.pseudo_gradient(y, &eta0);
    let g_full0 = x.tmul(&pg0);

    let strong = if *screening_enabled && control.screening {
        strong_candidates(g_full0.as_slice(), sigma_k, sigma_prev, lambda1, p)
    } else {
        (0..p).collect()
    };

    let ever: Vec<usize> = (0..p).filter(|&j| ever_active[j]).collect();
    let mut active = sorted_unique([strong, ever].concat());

    let mut total_passes = 0usize;
    let mut kkt_rounds = 0usize;
    let mut beta_full = beta_warm.clone();
    let mut alpha = alpha_warm;
    let mut eta_full = eta0;
    let mut converged = false;
    let mut final_infeas = 0.0;
    let mut final_rel_gap = 0.0;

    loop {
        kkt_rounds += 1;

        let sub_x = x.column_subset(&active);
        let w_active: Vec<f64> = lambda[..active.len()].iter().map(|l| l * sigma_k).collect();
        let beta_active = DMatrix::from_iterator(active.len(), 1, active.iter().map(|&j| beta_full[j]));

        let result = fista_solve(
            &sub_x,
            y,
            &w_active,
            family,
            beta_active,
            alpha,
            control.fit_intercept,
            control,
            diagnostics,
            cancel,
        );
        total_passes += result.passes;
        alpha = result.alpha;
        eta_full = result.eta.clone();

        beta_full.fill(0.0);
        for (k, &j) in active.iter().enumerate() {
            beta_full[j] = result.beta[k];
            if result.beta[k] != 0.0 {
                ever_active[j] = true;
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        let pg = family.pseudo_gradient(y, &eta_full);
        let g_full = x.tmul(&pg);
        let w_full: Vec<f64> = lambda.iter().map(|l| l * sigma_k).collect();
        final_infeas = infeasibility(g_full.as_slice(), &w_full);
        final_rel_gap = result.final_rel_gap;

        if final_infeas <= control.tol_infeas {
            converged = true;
            break;
        }

        let all_violators = sorted_unique(violating_coordinates(g_full.as_slice(), &w_full));
        let active_mask: Vec<bool> = {
            let mut m = vec![false; p];
            for &j in &active {
                m[j] = true;
            }
            m
        };
        let mut new_violators: Vec<usize> = all_violators.into_iter().filter(|&j| !active_mask[j]).collect();

        if new_violators.is_empty() {
            converged = true;
            break;
        }

        if active.len() + new_violators.len() >= control.max_variables {
            let room = control.max_variables.saturating_sub(active.len());
            new_violators.truncate(room);
            if new_violators.is_empty() {
                break;
            }
        }

        active = sorted_unique([active, new_violators].concat());
        if active.len() == p {
            *screening_enabled = false;
        }
    }

    ActiveSetResult {
        beta: beta_full,
        alpha,
        eta: eta_full,
        passes: total_passes,
        kkt_rounds,
        active_set_size: active.len(),
        converged,
        final_infeasibility: final_infeas,
        final_rel_gap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyKind;
    use crate::diagnostics::DiagnosticsRecorder;
    use crate::matrix::DenseMatrix;

    #[test]
    fn strong_rule_includes_only_large_gradient_coordinates() {
        let g = [10.0, 1.0, 0.1];
        let candidates = strong_candidates(&g, 1.0, Some(2.0), 5.0, 3);
        // threshold = (2*1 - 2) * 5 = 0 -> everything passes
        assert_eq!(candidates, vec![0, 1, 2]);

        let candidates = strong_candidates(&g, 1.0, Some(0.0), 5.0, 3);
        // threshold = (2*1 - 0) * 5 = 10 -> only |g|>=10
        assert_eq!(candidates, vec![0]);
    }

    #[test]
    fn screening_and_no_screening_reach_the_same_fixed_point() {
        let x = DenseMatrix::new(DMatrix::from_row_slice(4, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.1, 0.1, 0.1]));
        let y = DMatrix::from_row_slice(4, 1, &[3.0, -2.0, 1.0, 0.0]);
        let lambda = vec![1.0, 0.8, 0.6];
        let mut control = FitControl::new(FamilyKind::Gaussian, lambda.clone(), vec![1.0]);
        control.fit_intercept = false;
        control.max_passes = 5_000;
        control.tol_rel_gap = 1e-10;
        control.tol_infeas = 1e-7;

        let run = |screening: bool| {
            let mut ctrl = control.clone();
            ctrl.screening = screening;
            let mut ever_active = vec![false; 3];
            let mut screening_enabled = screening;
            let mut diag = DiagnosticsRecorder::disabled();
            fit_sigma(
                &x,
                &y,
                &lambda,
                1.0,
                None,
                Family::Gaussian,
                &DMatrix::zeros(3, 1),
                0.0,
                &mut ever_active,
                &mut screening_enabled,
                &ctrl,
                &mut diag,
                &crate::cancel::NeverCancel,
            )
        };

        let with_screening = run(true);
        let without_screening = run(false);
        for (a, b) in with_screening.beta.iter().zip(without_screening.beta.iter()) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }
}
