//! Gauss–Seidel relaxation of arithmetic (zero-capacitance) nodes.

use ot_conductance::PortTemps;
use tracing::trace;

use crate::error::{SolverError, SolverResult};
use crate::problem::ThermalProblem;

#[derive(Debug, Clone, Copy)]
pub struct RelaxOptions {
    /// Stop once no arithmetic node moves by more than this (K).
    pub tolerance: f64,
    pub max_sweeps: usize,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_sweeps: 5_000,
        }
    }
}

impl ThermalProblem {
    /// Solve every arithmetic node for instantaneous energy balance, in place.
    ///
    /// `node_load` holds the heat-load power of each node. Each node update is a
    /// Newton step on that node's balance with its neighbours held fixed, so nonlinear
    /// radiation and heat-pipe terms are re-linearised at every sweep. The current
    /// values of `temps` are the starting guess. Returns the number of sweeps.
    pub fn relax_arithmetic(
        &self,
        temps: &mut [f64],
        node_load: &[f64],
        options: RelaxOptions,
    ) -> SolverResult<usize> {
        if self.arithmetic_nodes().is_empty() {
            return Ok(0);
        }

        for sweep in 1..=options.max_sweeps {
            let mut max_change: f64 = 0.0;
            for &i in self.arithmetic_nodes() {
                // Net heat into `i` and its derivative with respect to T_i.
                let (mut net, mut slope) = (0.0, 0.0);
                for &(c, j) in self.neighbours(i) {
                    let link = &self.links()[c];
                    if self.endpoints()[c].0 == i {
                        let temps_ij = PortTemps::new(temps[i], temps[j]);
                        net -= link.flow(temps_ij);
                        slope -= link.derivatives(temps_ij).d_from;
                    } else {
                        let temps_ji = PortTemps::new(temps[j], temps[i]);
                        net += link.flow(temps_ji);
                        slope += link.derivatives(temps_ji).d_to;
                    }
                }
                if !(slope < 0.0) || !slope.is_finite() {
                    return Err(SolverError::instability(format!(
                        "arithmetic node '{}' has no effective conductance",
                        self.node_ids()[i]
                    )));
                }

                let updated = temps[i] - (net + node_load[i]) / slope;
                if !updated.is_finite() {
                    return Err(SolverError::instability(format!(
                        "arithmetic node '{}' diverged",
                        self.node_ids()[i]
                    )));
                }
                max_change = max_change.max((updated - temps[i]).abs());
                temps[i] = updated;
            }

            if max_change < options.tolerance {
                trace!(sweep, "arithmetic relaxation converged");
                return Ok(sweep);
            }
        }

        Err(SolverError::instability(format!(
            "arithmetic relaxation did not converge in {} sweeps",
            options.max_sweeps
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ot_core::SIGMA;
    use ot_network::NetworkBuilder;

    #[test]
    fn linear_chain_balances() {
        let snap = NetworkBuilder::new()
            .boundary("hot", 400.0)
            .arithmetic("mid", 300.0)
            .boundary("cold", 200.0)
            .linear("a", "hot", "mid", 1.0)
            .linear("b", "mid", "cold", 3.0)
            .build()
            .unwrap();
        let p = ThermalProblem::compile(&snap).unwrap();
        let mut temps = p.initial_temperatures(0.0);
        p.relax_arithmetic(&mut temps, &[0.0; 3], RelaxOptions::default())
            .unwrap();
        // (1·400 + 3·200) / 4
        assert_relative_eq!(temps[1], 250.0, epsilon = 1e-9);
    }

    #[test]
    fn radiating_plate_reaches_equilibrium() {
        // Q = σ·ε·A·(T⁴ − T_space⁴) with T_space ≈ 0.
        let snap = NetworkBuilder::new()
            .arithmetic("plate", 250.0)
            .boundary("space", 0.0)
            .radiation("r", "plate", "space", 1.0, 1.0, 1.0)
            .constant_load("q", "plate", 500.0)
            .build()
            .unwrap();
        let p = ThermalProblem::compile(&snap).unwrap();
        let mut temps = p.initial_temperatures(0.0);
        p.relax_arithmetic(&mut temps, &[500.0, 0.0], RelaxOptions::default())
            .unwrap();
        let expected = (500.0 / SIGMA).powf(0.25);
        assert_relative_eq!(temps[0], expected, max_relative = 1e-9);
    }
}
