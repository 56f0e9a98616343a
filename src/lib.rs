//! `slope-path` library crate: a sorted-L1 (SLOPE/OWL) regularization-path
//! engine.
//!
//! The binary (`slope-fit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (bindings, notebooks, other drivers)
//! - code stays easy to navigate as the project grows
//!
//! [`path::fit_path`] is the entry point: given a design matrix, a response,
//! and a [`config::FitControl`], it solves the path across `sigma` with
//! warm starts and strong-rule screening and returns a [`path::PathResult`].

pub mod active_set;
pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod family;
pub mod fista;
pub mod kkt;
pub mod matrix;
pub mod path;
pub mod prox;
pub mod rescale;

pub use config::{FamilyKind, FitControl};
pub use error::FitError;
pub use path::{fit_path, PathResult};
