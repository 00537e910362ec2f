//! Whole-network energy balance check.

use ot_network::NodeKind;
use ot_solver::{SteadySolution, ThermalProblem};

/// Powers (W) or energies (J) below this count as zero.
const NEGLIGIBLE: f64 = 1e-12;

/// Energy bookkeeping of a run.
///
/// `energy_in` covers positive loads and heat drawn from boundary nodes;
/// `energy_out` covers negative loads and heat rejected to boundary nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyBalance {
    /// J
    pub energy_in: f64,
    /// J
    pub energy_out: f64,
    /// Change of `Σ C_i·T_i` over the run (J).
    pub stored_change: f64,
    /// s. Zero for a steady balance, where the fields hold powers instead.
    pub duration: f64,
}

impl EnergyBalance {
    /// Steady balance: the fields hold powers and nothing is stored.
    pub fn steady(power_in: f64, power_out: f64) -> Self {
        Self {
            energy_in: power_in,
            energy_out: power_out,
            stored_change: 0.0,
            duration: 0.0,
        }
    }

    /// `|ΣQ_in − ΣQ_out − ΔU/Δt| / ΣQ_in` as a fraction.
    ///
    /// When nothing flows in the denominator becomes `max(ΣQ_in, ΣQ_out)`; a network
    /// with no flow at all has zero error.
    pub fn error(&self) -> f64 {
        let imbalance = self.energy_in - self.energy_out - self.stored_change;
        let denom = if self.energy_in.abs() > NEGLIGIBLE {
            self.energy_in
        } else {
            self.energy_in.max(self.energy_out)
        };
        if denom.abs() <= NEGLIGIBLE {
            return 0.0;
        }
        // Dividing both terms by the duration leaves the ratio unchanged.
        (imbalance / denom).abs()
    }

    /// Error in percent.
    pub fn error_percent(&self) -> f64 {
        100.0 * self.error()
    }

    /// Average power in (W) over the run.
    pub fn mean_power_in(&self) -> f64 {
        if self.duration > 0.0 {
            self.energy_in / self.duration
        } else {
            self.energy_in
        }
    }
}

/// Energy balance of a steady solution, in watts.
pub fn steady_energy_balance(problem: &ThermalProblem, solution: &SteadySolution) -> EnergyBalance {
    let (mut q_in, mut q_out) = problem.boundary_exchange(&solution.temperatures);
    for (i, &q) in solution.node_loads.iter().enumerate() {
        if problem.kind(i) == NodeKind::Boundary {
            continue;
        }
        if q >= 0.0 {
            q_in += q;
        } else {
            q_out -= q;
        }
    }
    EnergyBalance::steady(q_in, q_out)
}
