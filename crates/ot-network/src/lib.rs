//! ot-network: immutable thermal-network snapshot, validation and indexing.
//!
//! Provides:
//! - Snapshot value types (nodes, conductors, heat loads, materials, configs)
//! - Structural validation run before any integration
//! - Dense solver indexing
//! - Parameter references used by perturb-and-rerun workflows
//!
//! # Example
//!
//! ```
//! use ot_network::NetworkBuilder;
//!
//! let snapshot = NetworkBuilder::new()
//!     .diffusion("panel", 290.0, 500.0)
//!     .boundary("sink", 200.0)
//!     .linear("g1", "panel", "sink", 10.0)
//!     .constant_load("q1", "panel", 100.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(snapshot.nodes.len(), 2);
//! assert_eq!(snapshot.conductors.len(), 1);
//! ```

pub mod builder;
pub mod indexing;
pub mod params;
pub mod schema;
pub mod validate;

pub use builder::NetworkBuilder;
pub use indexing::NetworkIndex;
pub use params::{EntityKind, ParamDomain, ParamRef, apply_values};
pub use schema::*;
pub use validate::{ValidationError, validate_config, validate_snapshot};

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown {what} id: {id}")]
    UnknownId { what: &'static str, id: String },

    #[error("Property '{property}' is not defined for {entity:?} '{id}'")]
    UnknownProperty {
        entity: EntityKind,
        id: String,
        property: String,
    },

    #[error("Property '{property}' of {entity:?} '{id}' is not set")]
    PropertyUnset {
        entity: EntityKind,
        id: String,
        property: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a case file, choosing YAML or JSON by extension, and validate it.
pub fn load_case(path: &std::path::Path) -> NetworkResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    let case: CaseFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    validate_snapshot(&case.network)?;
    validate_config(&case.simulation)?;
    Ok(case)
}

pub fn save_case(path: &std::path::Path, case: &CaseFile) -> NetworkResult<()> {
    validate_snapshot(&case.network)?;
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::to_string_pretty(case)?,
        _ => serde_yaml::to_string(case)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}
