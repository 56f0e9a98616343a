//! Path driver (C6): validates a [`FitControl`], then walks the `sigma`
//! grid with warm starts, tracking deviance and applying the early-stop
//! rules so a caller never has to pay for the tail of a path that has
//! already converged to the saturated fit.

use nalgebra::DMatrix;

use crate::active_set::fit_sigma;
use crate::cancel::Cancellation;
use crate::config::FitControl;
use crate::diagnostics::{DiagnosticsRecorder, SigmaOutcome};
use crate::error::FitError;
use crate::family::Family;
use crate::matrix::DesignMatrix;

/// The full solved path, truncated at cancellation or an early-stop rule.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// `sigma` values actually solved, in the order given.
    pub sigma: Vec<f64>,
    /// One full-length (`p`) coefficient vector per solved `sigma`.
    pub beta: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub deviance: Vec<f64>,
    pub deviance_ratio: Vec<f64>,
    pub active_set_size: Vec<usize>,
    pub diagnostics: Vec<SigmaOutcome>,
    /// `true` if the path stopped before exhausting `control.sigma`, either
    /// from cancellation or a deviance early-stop rule.
    pub terminated_early: bool,
}

fn validate<M: DesignMatrix>(x: &M, y: &DMatrix<f64>, control: &FitControl) -> Result<(), FitError> {
    let p = x.n_cols();
    if control.lambda.len() != p {
        return Err(FitError::LambdaLengthMismatch {
            expected: p,
            actual: control.lambda.len(),
        });
    }
    if control.lambda.windows(2).any(|w| w[0] < w[1]) || control.lambda.iter().any(|&l| l < 0.0) {
        return Err(FitError::LambdaNotSorted);
    }
    if control.sigma.is_empty() {
        return Err(FitError::EmptySigmaGrid);
    }
    if control.sigma.iter().any(|&s| s <= 0.0) || control.sigma.windows(2).any(|w| w[0] < w[1]) {
        return Err(FitError::SigmaNotSorted);
    }
    if y.nrows() != x.n_rows() {
        return Err(FitError::ShapeMismatch {
            x_rows: x.n_rows(),
            y_rows: y.nrows(),
        });
    }
    Ok(())
}

fn null_eta(family: Family, y: &DMatrix<f64>) -> DMatrix<f64> {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let p = DMatrix::from_element(y.nrows(), 1, mean);
    family.link(y, &p)
}

/// Solve the regularization path over `control.sigma`, warm-starting each
/// `sigma_k` from the previous solution.
pub fn fit_path<M: DesignMatrix>(x: &M, y: &DMatrix<f64>, control: &FitControl, cancel: &dyn Cancellation) -> Result<PathResult, FitError> {
    validate(x, y, control)?;

    let family: Family = control.family.into();
    let p = x.n_cols();
    let null_deviance = 2.0 * family.primal(y, &null_eta(family, y));

    let mut beta = DMatrix::<f64>::zeros(p, 1);
    let mut alpha = if control.fit_intercept {
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        family.link(y, &DMatrix::from_element(y.nrows(), 1, mean))[(0, 0)]
    } else {
        0.0
    };
    let mut ever_active = vec![false; p];
    let mut screening_enabled = control.screening;

    let mut result = PathResult {
        sigma: Vec::new(),
        beta: Vec::new(),
        alpha: Vec::new(),
        deviance: Vec::new(),
        deviance_ratio: Vec::new(),
        active_set_size: Vec::new(),
        diagnostics: Vec::new(),
        terminated_early: false,
    };

    let mut diag = DiagnosticsRecorder::new(control.diagnostics);
    let mut sigma_prev: Option<f64> = None;
    let mut prev_deviance = null_deviance;
    let mut stall_rounds = 0usize;

    for (idx, &sigma_k) in control.sigma.iter().enumerate() {
        if cancel.is_cancelled() {
            result.terminated_early = true;
            break;
        }

        let outcome = fit_sigma(
            x,
            y,
            &control.lambda,
            sigma_k,
            sigma_prev,
            family,
            &beta,
            alpha,
            &mut ever_active,
            &mut screening_enabled,
            control,
            &mut diag,
            cancel,
        );
        diag.finish_sigma();

        beta = outcome.beta;
        alpha = outcome.alpha;
        sigma_prev = Some(sigma_k);

        let deviance = 2.0 * family.primal(y, &outcome.eta);
        let deviance_ratio = if null_deviance.abs() > 0.0 { 1.0 - deviance / null_deviance } else { 0.0 };
        let deviance_change = if prev_deviance.abs() > 1e-12 { (prev_deviance - deviance).abs() / prev_deviance.abs() } else { 0.0 };

        result.sigma.push(sigma_k);
        result.beta.push(beta.as_slice().to_vec());
        result.alpha.push(alpha);
        result.deviance.push(deviance);
        result.deviance_ratio.push(deviance_ratio);
        result.active_set_size.push(outcome.active_set_size);
        result.diagnostics.push(SigmaOutcome {
            sigma_index: idx,
            converged: outcome.converged,
            passes: outcome.passes,
            kkt_rounds: outcome.kkt_rounds,
            active_set_size: outcome.active_set_size,
            final_infeasibility: outcome.final_infeasibility,
            final_rel_gap: outcome.final_rel_gap,
        });

        if outcome.active_set_size >= control.max_variables {
            result.terminated_early = true;
            break;
        }
        if deviance_ratio >= control.tol_dev_ratio {
            result.terminated_early = idx + 1 < control.sigma.len();
            break;
        }
        if idx > 0 && deviance_change < control.tol_dev_change {
            stall_rounds += 1;
            if stall_rounds >= 2 {
                result.terminated_early = idx + 1 < control.sigma.len();
                break;
            }
        } else {
            stall_rounds = 0;
        }

        prev_deviance = deviance;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyKind;
    use crate::matrix::DenseMatrix;

    #[test]
    fn rejects_mismatched_lambda_length() {
        let x = DenseMatrix::new(DMatrix::identity(2, 2));
        let y = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let control = FitControl::new(FamilyKind::Gaussian, vec![1.0], vec![1.0]);
        let err = fit_path(&x, &y, &control, &crate::cancel::NeverCancel).unwrap_err();
        assert!(matches!(err, FitError::LambdaLengthMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn rejects_unsorted_sigma_grid() {
        let x = DenseMatrix::new(DMatrix::identity(2, 2));
        let y = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let control = FitControl::new(FamilyKind::Gaussian, vec![1.0, 1.0], vec![1.0, 2.0]);
        let err = fit_path(&x, &y, &control, &crate::cancel::NeverCancel).unwrap_err();
        assert!(matches!(err, FitError::SigmaNotSorted));
    }

    #[test]
    fn walks_full_sigma_grid_on_well_behaved_data() {
        let x = DenseMatrix::new(DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, -1.0]));
        let y = DMatrix::from_row_slice(4, 1, &[2.0, -1.0, 1.0, 3.0]);
        let mut control = FitControl::new(FamilyKind::Gaussian, vec![1.0, 0.5], vec![2.0, 1.0, 0.1]);
        control.fit_intercept = false;
        control.tol_dev_ratio = 1.0;
        control.tol_dev_change = 0.0;
        let result = fit_path(&x, &y, &control, &crate::cancel::NeverCancel).unwrap();
        assert_eq!(result.sigma.len(), 3);
        assert_eq!(result.beta.len(), 3);
        assert!(result.deviance.windows(2).all(|w| w[1] <= w[0] + 1e-6));
    }
}
