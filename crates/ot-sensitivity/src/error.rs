use ot_engine::EngineError;
use ot_network::{NetworkError, ParamRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensitivityError {
    #[error("No baseline result: compute the baseline first")]
    NoBaseline,

    #[error("Baseline run failed: {0}")]
    BaselineFailed(#[from] EngineError),

    #[error("Sensitivity model belongs to baseline {found}, current baseline is {expected}")]
    StaleBaseline { expected: String, found: String },

    #[error("Parameter {param} is not part of the sensitivity model")]
    UnknownParameter { param: ParamRef },

    #[error("Parameter {param} has no sensitivities: {error}")]
    FailedParameter { param: ParamRef, error: String },

    #[error("Invalid options: {what}")]
    InvalidOptions { what: &'static str },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Thread pool error: {0}")]
    Pool(String),
}

pub type SensitivityResult<T> = Result<T, SensitivityError>;
