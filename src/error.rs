//! Error types for the regularization-path engine.
//!
//! Per the design, the only *fatal* error kind is invalid configuration,
//! caught before any iteration begins. Numerical degeneracy and
//! iteration-budget exhaustion are reported per-`sigma` through
//! [`crate::diagnostics::SigmaOutcome`] instead of aborting the fit, and
//! cancellation truncates the path rather than failing it.

/// Configuration and shape errors, surfaced before any solver iteration runs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FitError {
    #[error("lambda must be sorted non-increasing and non-negative")]
    LambdaNotSorted,

    #[error("lambda has length {actual}, expected {expected} (p * m)")]
    LambdaLengthMismatch { expected: usize, actual: usize },

    #[error("sigma grid must be non-empty")]
    EmptySigmaGrid,

    #[error("sigma grid must be positive and sorted non-increasing")]
    SigmaNotSorted,

    #[error("y has {y_rows} rows but x has {x_rows} rows")]
    ShapeMismatch { x_rows: usize, y_rows: usize },

    #[error("unknown family {0:?}")]
    UnknownFamily(String),

    #[error("{0}")]
    InvalidConfig(String),
}
