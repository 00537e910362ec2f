//! ot-conductance: conductor and heat-load evaluation.
//!
//! Provides models for the four conductor kinds:
//! - Linear and contact conductors with constant conductance
//! - Heat pipes with a temperature-dependent conductance table
//! - Radiation with the full fourth-power exchange
//!
//! All conductors implement [`ThermalLink`] and report flow signed from → to. Heat
//! loads compile into a [`LoadSet`] that evaluates constant, scheduled and orbital
//! loads at any time.
//!
//! # Example
//!
//! ```
//! use ot_conductance::{PortTemps, RadiationLink, ThermalLink};
//!
//! let r = RadiationLink::new("panel_to_space".into(), 1.0, 1.0, 0.9);
//! let q = r.flow(PortTemps::new(300.0, 3.0));
//! assert!((q - 413.3).abs() < 0.1);
//! ```

pub mod error;
pub mod links;
pub mod loads;
pub mod traits;

pub use error::{ConductanceError, ConductanceResult};
pub use links::{HeatPipeLink, LinearLink, RadiationLink, compile_conductor};
pub use loads::{CompiledLoad, LoadModel, LoadSet};
pub use traits::{FlowDerivatives, PortTemps, ThermalLink};

use ot_network::NetworkSnapshot;

/// Compile every conductor of a snapshot, in snapshot order.
pub fn compile_conductors(snapshot: &NetworkSnapshot) -> ConductanceResult<Vec<Box<dyn ThermalLink>>> {
    snapshot.conductors.iter().map(compile_conductor).collect()
}
