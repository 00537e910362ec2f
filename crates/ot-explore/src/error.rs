use ot_network::{NetworkError, ParamRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Invalid range for {param}: [{min}, {max}]")]
    InvalidRange { param: ParamRef, min: f64, max: f64 },

    #[error("Parameter {param} appears more than once")]
    DuplicateParameter { param: ParamRef },

    #[error("Constraint refers to unknown node '{id}'")]
    UnknownNode { id: String },

    #[error("Invalid options: {what}")]
    InvalidOptions { what: &'static str },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Thread pool error: {0}")]
    Pool(String),
}

pub type ExploreResult<T> = Result<T, ExploreError>;
