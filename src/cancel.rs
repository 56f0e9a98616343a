//! External-cancellation collaborator.
//!
//! The solver polls a [`Cancellation`] at the checkpoints named in the
//! concurrency model: inside each backtracking-line-search inner iteration,
//! once every 100 outer FISTA passes, and after each KKT round in the
//! active-set loop. A cancelled fit is not an error: [`crate::path::fit_path`]
//! returns the prefix of the path completed so far.

/// Polled at cancellation checkpoints. `true` aborts the current fit.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// Default collaborator: never cancels.
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> Cancellation for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}
