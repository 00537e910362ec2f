//! Core trait for conductor models.

use ot_core::{Power, watts};

use crate::error::ConductanceResult;

/// Temperatures (K) at the two ends of a conductor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortTemps {
    pub from: f64,
    pub to: f64,
}

impl PortTemps {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn hotter(&self) -> f64 {
        self.from.max(self.to)
    }
}

/// Partial derivatives of the from→to heat flow.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FlowDerivatives {
    pub d_from: f64,
    pub d_to: f64,
}

/// A thermal coupling between two nodes.
///
/// Links are deterministic functions of the endpoint temperatures, safe to share
/// across threads.
pub trait ThermalLink: Send + Sync {
    /// Conductor id for diagnostics.
    fn name(&self) -> &str;

    /// Heat flow (W) from `from` to `to`. Positive when heat leaves `from`.
    fn flow(&self, temps: PortTemps) -> f64;

    /// `∂Q/∂T_from` and `∂Q/∂T_to` of [`ThermalLink::flow`].
    fn derivatives(&self, temps: PortTemps) -> FlowDerivatives;

    /// Equivalent conductance `Q / (T_from − T_to)` (W/K) at the given temperatures.
    ///
    /// For nonlinear links this is a reporting figure and a relaxation weight; the
    /// exact flow always comes from [`ThermalLink::flow`].
    fn linearized_conductance(&self, temps: PortTemps) -> f64;

    /// Heat flow as a typed power.
    fn power(&self, temps: PortTemps) -> ConductanceResult<Power> {
        let q = self.flow(temps);
        if !q.is_finite() {
            return Err(crate::ConductanceError::NonPhysical {
                what: "non-finite conductor flow",
            });
        }
        Ok(watts(q))
    }
}
