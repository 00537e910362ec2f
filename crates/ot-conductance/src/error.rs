//! Error types for conductor and heat-load evaluation.

use ot_orbit::OrbitError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConductanceError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("{context} '{id}' is missing '{field}'")]
    MissingField {
        context: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("Unknown node '{id}'")]
    UnknownNode { id: String },

    #[error("Orbital load '{id}' needs an orbit definition")]
    MissingOrbit { id: String },

    #[error("Orbit error: {0}")]
    Orbit(#[from] OrbitError),
}

pub type ConductanceResult<T> = Result<T, ConductanceError>;

