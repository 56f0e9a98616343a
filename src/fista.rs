//! FISTA solver (C4): backtracking line search, Nesterov momentum, and the
//! sparse-standardization gradient correction, run over a fixed active
//! column subset for one `sigma_k`.
//!
//! The intercept (if fit) is carried alongside `beta` as an unpenalized
//! extra coordinate: it gets the same momentum sequence and the same
//! backtracking step, just no thresholding in the prox step.

use nalgebra::DMatrix;

use crate::cancel::Cancellation;
use crate::config::FitControl;
use crate::diagnostics::{DiagnosticsRecorder, PassDiagnostics};
use crate::family::Family;
use crate::kkt::infeasibility;
use crate::matrix::DesignMatrix;
use crate::prox::sorted_l1_prox;

/// Loosened acceptance factor for the backtracking quadratic-majorant test:
/// accept a trial step whenever `q >= f * (1 - LOOSENING)` rather than
/// `q >= f` exactly, so floating-point noise at convergence never forces an
/// extra halving round.
const LOOSENING: f64 = 1e-12;

/// Passes between mandatory cancellation polls inside the outer loop (the
/// line search itself is polled every inner iteration).
const CANCEL_CHECK_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
pub struct FistaResult {
    pub beta: DMatrix<f64>,
    pub alpha: f64,
    pub eta: DMatrix<f64>,
    pub passes: usize,
    pub converged: bool,
    pub final_primal: f64,
    pub final_dual: f64,
    pub final_infeasibility: f64,
    pub final_rel_gap: f64,
}

/// `eta = X_raw * beta`, or the sparse-standardization-corrected version
/// `eta = X_raw * (beta / scale) - sum_j(center_j * beta_j / scale_j)` when
/// `x` carries logical centering/scaling.
fn standardized_eta<M: DesignMatrix>(x: &M, beta: &DMatrix<f64>) -> DMatrix<f64> {
    match x.column_center_scale() {
        None => x.mul(beta),
        Some((center, scale)) => {
            let beta_scaled = DMatrix::from_iterator(beta.nrows(), 1, beta.iter().zip(scale.iter()).map(|(b, s)| b / s));
            let raw = x.mul(&beta_scaled);
            let offset: f64 = center
                .iter()
                .zip(beta.iter())
                .zip(scale.iter())
                .map(|((c, b), s)| c * b / s)
                .sum();
            raw.map(|v| v - offset)
        }
    }
}

/// `grad_beta = X_raw^T * pseudo_gradient`, corrected by the chain rule
/// through the same logical centering/scaling as [`standardized_eta`].
fn standardized_tmul<M: DesignMatrix>(x: &M, pseudo_grad: &DMatrix<f64>) -> DMatrix<f64> {
    let raw = x.tmul(pseudo_grad);
    match x.column_center_scale() {
        None => raw,
        Some((center, scale)) => {
            let sum_pg: f64 = pseudo_grad.iter().sum();
            DMatrix::from_iterator(
                raw.nrows(),
                1,
                raw.iter().zip(center.iter()).zip(scale.iter()).map(|((g, c), s)| g / s - c / s * sum_pg),
            )
        }
    }
}

fn eta_with_intercept(eta_no_alpha: &DMatrix<f64>, alpha: f64) -> DMatrix<f64> {
    eta_no_alpha.map(|v| v + alpha)
}

/// Run FISTA to (approximate) convergence for one `sigma_k` over a fixed
/// active column subset. `w` is the sorted-L1 weight vector for those
/// columns (already `sigma_k * lambda[active]`, sorted non-increasing).
pub fn fista_solve<M: DesignMatrix>(
    x: &M,
    y: &DMatrix<f64>,
    w: &[f64],
    family: Family,
    beta_init: DMatrix<f64>,
    alpha_init: f64,
    fit_intercept: bool,
    control: &FitControl,
    diagnostics: &mut DiagnosticsRecorder,
    cancel: &dyn Cancellation,
) -> FistaResult {
    let p = beta_init.nrows();
    let mut beta = beta_init;
    let mut alpha = alpha_init;
    let mut beta_tilde = beta.clone();
    let mut alpha_tilde = alpha;
    let mut t = 1.0_f64;
    let mut tau = 1.0_f64;
    let tau_floor = f64::EPSILON.sqrt();

    let mut converged = false;
    let mut pass = 0usize;
    let (mut final_primal, mut final_dual, mut final_infeas, mut final_rel_gap) = (0.0, 0.0, 0.0, 0.0);
    let mut eta = eta_with_intercept(&standardized_eta(x, &beta), alpha);

    while pass < control.max_passes {
        if pass % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            break;
        }

        let eta_tilde = eta_with_intercept(&standardized_eta(x, &beta_tilde), alpha_tilde);
        let primal_tilde = family.primal(y, &eta_tilde);
        let pseudo_grad = family.pseudo_gradient(y, &eta_tilde);
        let grad_beta = standardized_tmul(x, &pseudo_grad);
        let grad_alpha: f64 = pseudo_grad.iter().sum();

        let mut line_search_iters = 0usize;
        let (beta_cand, alpha_cand, eta_cand, f_cand);
        loop {
            if cancel.is_cancelled() {
                return FistaResult {
                    beta,
                    alpha,
                    eta,
                    passes: pass,
                    converged: false,
                    final_primal,
                    final_dual,
                    final_infeasibility: final_infeas,
                    final_rel_gap,
                };
            }

            let step_beta: DMatrix<f64> = &beta_tilde - tau * &grad_beta;
            let w_scaled: Vec<f64> = w.iter().map(|wi| wi * tau).collect();
            let cand_beta = if p == 0 {
                step_beta
            } else {
                DMatrix::from_vec(p, 1, sorted_l1_prox(step_beta.as_slice(), &w_scaled))
            };
            let cand_alpha = if fit_intercept { alpha_tilde - tau * grad_alpha } else { alpha_tilde };
            let cand_eta = eta_with_intercept(&standardized_eta(x, &cand_beta), cand_alpha);
            let f_val = family.primal(y, &cand_eta);

            let db = &cand_beta - &beta_tilde;
            let da = cand_alpha - alpha_tilde;
            let quad_term: f64 = db.iter().map(|v| v * v).sum::<f64>() + da * da;
            let linear_term: f64 = grad_beta.iter().zip(db.iter()).map(|(g, d)| g * d).sum::<f64>() + grad_alpha * da;
            let q = primal_tilde + linear_term + quad_term / (2.0 * tau);

            line_search_iters += 1;
            if q >= f_val * (1.0 - LOOSENING) || tau <= tau_floor {
                beta_cand = cand_beta;
                alpha_cand = cand_alpha;
                eta_cand = cand_eta;
                f_cand = f_val;
                break;
            }
            tau *= 0.5;
        }

        let t_new = (1.0 + (1.0 + 4.0 * t * t).sqrt()) / 2.0;
        let momentum = (t - 1.0) / t_new;
        beta_tilde = &beta_cand + momentum * (&beta_cand - &beta);
        alpha_tilde = alpha_cand + momentum * (alpha_cand - alpha);
        t = t_new;
        beta = beta_cand;
        alpha = alpha_cand;
        eta = eta_cand;

        let grad_at_iterate = standardized_tmul(x, &family.pseudo_gradient(y, &eta));
        let infeas = infeasibility(grad_at_iterate.as_slice(), w);
        let primal = family.primal(y, &eta);
        let dual = family.dual(y, &eta);
        let rel_gap = (primal - dual).abs() / primal.abs().max(1.0);

        if control.diagnostics {
            diagnostics.record_pass(PassDiagnostics {
                pass,
                primal,
                dual,
                infeasibility: infeas,
                line_search_iters,
                step_size: tau,
            });
        }

        final_primal = primal;
        final_dual = dual;
        final_infeas = infeas;
        final_rel_gap = rel_gap;
        pass += 1;

        if rel_gap <= control.tol_rel_gap && infeas <= control.tol_infeas {
            converged = true;
            break;
        }
        if tau <= tau_floor {
            break;
        }
    }

    FistaResult {
        beta,
        alpha,
        eta,
        passes: pass,
        converged,
        final_primal,
        final_dual,
        final_infeasibility: final_infeas,
        final_rel_gap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyKind;
    use crate::matrix::DenseMatrix;

    fn control(lambda: Vec<f64>) -> FitControl {
        let mut c = FitControl::new(FamilyKind::Gaussian, lambda, vec![1.0]);
        c.max_passes = 2_000;
        c.tol_rel_gap = 1e-10;
        c.tol_infeas = 1e-6;
        c
    }

    #[test]
    fn recovers_plain_ols_solution_on_identity_design_without_penalty() {
        // S1-style scenario: identity X, zero penalty -> beta == y.
        let x = DenseMatrix::new(DMatrix::identity(3, 3));
        let y = DMatrix::from_row_slice(3, 1, &[1.0, -2.0, 0.5]);
        let w = [0.0, 0.0, 0.0];
        let mut diag = DiagnosticsRecorder::disabled();
        let result = fista_solve(
            &x,
            &y,
            &w,
            Family::Gaussian,
            DMatrix::zeros(3, 1),
            0.0,
            false,
            &control(vec![0.0, 0.0, 0.0]),
            &mut diag,
            &crate::cancel::NeverCancel,
        );
        for (got, want) in result.beta.iter().zip(y.iter()) {
            assert!((got - want).abs() < 1e-4, "{got} vs {want}");
        }
        assert!(result.converged);
    }

    #[test]
    fn shrinks_toward_zero_under_penalty() {
        let x = DenseMatrix::new(DMatrix::identity(2, 2));
        let y = DMatrix::from_row_slice(2, 1, &[4.0, -3.0]);
        let w = [1.0, 1.0];
        let mut diag = DiagnosticsRecorder::disabled();
        let result = fista_solve(
            &x,
            &y,
            &w,
            Family::Gaussian,
            DMatrix::zeros(2, 1),
            0.0,
            false,
            &control(vec![1.0, 1.0]),
            &mut diag,
            &crate::cancel::NeverCancel,
        );
        // Soft-threshold closed form: |y_i| - lambda.
        assert!((result.beta[0] - 3.0).abs() < 1e-3);
        assert!((result.beta[1] - (-2.0)).abs() < 1e-3);
    }

    #[test]
    fn fits_intercept_to_the_mean_when_predictors_are_uninformative() {
        let x = DenseMatrix::new(DMatrix::zeros(4, 1));
        let y = DMatrix::from_row_slice(4, 1, &[2.0, 4.0, 6.0, 8.0]);
        let w = [10.0];
        let mut diag = DiagnosticsRecorder::disabled();
        let result = fista_solve(
            &x,
            &y,
            &w,
            Family::Gaussian,
            DMatrix::zeros(1, 1),
            0.0,
            true,
            &control(vec![10.0]),
            &mut diag,
            &crate::cancel::NeverCancel,
        );
        assert!((result.alpha - 5.0).abs() < 1e-2);
        assert!(result.beta[0].abs() < 1e-9);
    }
}
