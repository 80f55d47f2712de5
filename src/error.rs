//! Error types for swesim.
//!
//! Recoverable failures (bad configuration, inconsistent initial conditions,
//! unstable parameters) are reported through [`Error`]. Lifecycle misuse such
//! as stepping an uninitialized simulator is a caller bug and panics instead.

use thiserror::Error;

/// Errors reported by fallible swesim operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid initial conditions: {0}")]
    InitialConditions(String),

    #[error("Field '{field}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Timestep violates the CFL condition (Courant number {courant:.3} > 1)")]
    Unstable { courant: f32 },

    #[error("Numerical check failed: {0}")]
    Numerical(String),
}

/// Result type alias for swesim operations.
pub type Result<T> = std::result::Result<T, Error>;
