//! Error types for transient simulation.

use ot_core::OtError;
use ot_solver::SolverError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numerical instability at t = {time} s: {what}")]
    NumericalInstability { what: String, time: f64 },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Core(#[from] OtError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn instability(what: impl Into<String>, time: f64) -> Self {
        SimError::NumericalInstability {
            what: what.into(),
            time,
        }
    }
}
