//! Error types for view-factor estimation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewFactorError {
    #[error("Unknown surface: {id}")]
    UnknownSurface { id: String },

    #[error("Surface {id} has no triangles")]
    EmptySurface { id: String },

    #[error("Triangle {index} of surface {surface} has zero area")]
    DegenerateTriangle { surface: String, index: usize },

    #[error("Duplicate surface id: {id}")]
    DuplicateSurface { id: String },

    #[error("Invalid request: {what}")]
    InvalidRequest { what: String },

    #[error("No radiation conductor between nodes {from} and {to}")]
    NoRadiationConductor { from: String, to: String },
}

pub type ViewFactorResult<T> = Result<T, ViewFactorError>;

/// Failures of a background view-factor job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerError {
    #[error("View-factor worker crashed: {message}")]
    Crashed { message: String },

    #[error("View-factor job was cancelled")]
    Cancelled,

    #[error("View-factor job failed: {0}")]
    Failed(#[from] ViewFactorError),
}
