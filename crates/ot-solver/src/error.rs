//! Error types for solver operations.

use ot_conductance::ConductanceError;
use ot_core::OtError;
use ot_network::NetworkError;
use thiserror::Error;

/// Errors that can occur while solving a thermal network.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error(
        "Steady state not reached after {iterations} iterations (max |dT| = {max_delta:.3e} K, tolerance {tolerance:.3e} K)"
    )]
    Convergence {
        iterations: usize,
        max_delta: f64,
        tolerance: f64,
    },

    #[error("Numerical instability: {what}")]
    NumericalInstability { what: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Conductance error: {0}")]
    Conductance(#[from] ConductanceError),

    #[error(transparent)]
    Core(#[from] OtError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub(crate) fn instability(what: impl Into<String>) -> Self {
        SolverError::NumericalInstability { what: what.into() }
    }
}
