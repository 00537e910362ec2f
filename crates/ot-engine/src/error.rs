//! Error taxonomy surfaced to callers of the engine.

use ot_conductance::ConductanceError;
use ot_core::OtError;
use ot_network::NetworkError;
use ot_orbit::OrbitError;
use ot_sim::SimError;
use ot_solver::SolverError;
use ot_viewfactor::WorkerError;

/// Why a run did not complete.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Malformed input, detected before integration.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(
        "Steady state not reached after {iterations} iterations (max |dT| = {max_delta:.3e} K, tolerance {tolerance:.3e} K)"
    )]
    Convergence {
        iterations: usize,
        max_delta: f64,
        tolerance: f64,
    },

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Orbit error: {0}")]
    Orbit(String),

    #[error("Wall-clock limit of {limit_s:.1} s exceeded after {elapsed_s:.1} s")]
    WallClockExceeded { limit_s: f64, elapsed_s: f64 },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::Convergence { .. } => "convergence",
            EngineError::NumericalInstability(_) => "numerical_instability",
            EngineError::Worker(_) => "worker",
            EngineError::Orbit(_) => "orbit",
            EngineError::WallClockExceeded { .. } => "wall_clock_exceeded",
        }
    }
}

impl From<OtError> for EngineError {
    fn from(err: OtError) -> Self {
        match err {
            OtError::WallClock { limit_s, elapsed_s } => {
                EngineError::WallClockExceeded { limit_s, elapsed_s }
            }
            OtError::NonFinite { .. } => EngineError::NumericalInstability(err.to_string()),
            other => EngineError::Validation(other.to_string()),
        }
    }
}

impl From<NetworkError> for EngineError {
    fn from(err: NetworkError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl From<OrbitError> for EngineError {
    fn from(err: OrbitError) -> Self {
        EngineError::Orbit(err.to_string())
    }
}

impl From<ConductanceError> for EngineError {
    fn from(err: ConductanceError) -> Self {
        match err {
            ConductanceError::Orbit(e) => e.into(),
            other => EngineError::Validation(other.to_string()),
        }
    }
}

impl From<SolverError> for EngineError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::ProblemSetup { what } => EngineError::Validation(what),
            SolverError::Convergence {
                iterations,
                max_delta,
                tolerance,
            } => EngineError::Convergence {
                iterations,
                max_delta,
                tolerance,
            },
            SolverError::NumericalInstability { what } => EngineError::NumericalInstability(what),
            SolverError::Network(e) => e.into(),
            SolverError::Conductance(e) => e.into(),
            SolverError::Core(e) => e.into(),
        }
    }
}

impl From<SimError> for EngineError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidArg { what } => EngineError::Validation(what.to_string()),
            SimError::NumericalInstability { what, time } => {
                EngineError::NumericalInstability(format!("{what} (t = {time} s)"))
            }
            SimError::Solver(e) => e.into(),
            SimError::Core(e) => e.into(),
        }
    }
}

impl From<WorkerError> for EngineError {
    fn from(err: WorkerError) -> Self {
        EngineError::Worker(err.to_string())
    }
}

impl From<ot_network::ValidationError> for EngineError {
    fn from(err: ot_network::ValidationError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
