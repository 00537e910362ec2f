//! Parameter sensitivities and what-if reconstruction.
//!
//! Each parameter is perturbed by `±Δp` around a completed baseline and rerun through
//! the engine. First-order derivatives come from the forward difference, second-order
//! ones from the central difference, and what-if queries extrapolate linearly with a
//! confidence rating based on the curvature.

pub mod baseline;
pub mod error;
pub mod model;
pub mod options;
pub mod whatif;

pub use baseline::CurrentBaseline;
pub use error::{SensitivityError, SensitivityResult};
pub use model::{SensitivityEntry, SensitivityModel, Stencil, compute_sensitivities};
pub use options::SensitivityOptions;
pub use whatif::{Confidence, ParamConfidence, WhatIf};
