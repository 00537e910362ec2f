//! The thermal network as a [`TransientModel`].

use ot_network::NodeKind;
use ot_solver::{RelaxOptions, ThermalProblem};

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

/// Integrated state of a network: diffusion-node temperatures plus the energy that
/// crossed the network boundary so far.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalState {
    /// K, in `ThermalProblem::diffusion_nodes` order.
    pub temperatures: Vec<f64>,
    /// J received from positive loads and boundary nodes.
    pub energy_in: f64,
    /// J lost to negative loads and boundary nodes.
    pub energy_out: f64,
}

/// Right-hand side `C_i dT_i/dt = Σ Q_into_i + Q_load_i(t)` of a compiled network.
///
/// Every evaluation sets boundary nodes to their value at `t` and relaxes the
/// arithmetic nodes, starting from the arithmetic temperatures of the previous
/// evaluation.
pub struct ThermalModel<'a> {
    problem: &'a ThermalProblem,
    time_start: f64,
    relax: RelaxOptions,
    /// Full node temperatures of the latest evaluation.
    temps: Vec<f64>,
    load_q: Vec<f64>,
    node_q: Vec<f64>,
    scratch: Vec<f64>,
    evaluations: usize,
}

impl<'a> ThermalModel<'a> {
    pub fn new(problem: &'a ThermalProblem, time_start: f64) -> Self {
        let n = problem.node_count();
        Self {
            problem,
            time_start,
            relax: RelaxOptions::default(),
            temps: problem.initial_temperatures(time_start),
            load_q: vec![0.0; n],
            node_q: vec![0.0; n],
            scratch: Vec::new(),
            evaluations: 0,
        }
    }

    pub fn with_relax(mut self, relax: RelaxOptions) -> Self {
        self.relax = relax;
        self
    }

    pub fn problem(&self) -> &ThermalProblem {
        self.problem
    }

    /// Number of right-hand side evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Bring the full temperature field and the load vector to `(t, x)`.
    fn evaluate(&mut self, t: f64, x: &ThermalState) -> SimResult<()> {
        self.problem.apply_boundaries(t, &mut self.temps);
        for (k, &i) in self.problem.diffusion_nodes().iter().enumerate() {
            self.temps[i] = x.temperatures[k];
        }
        self.load_q.fill(0.0);
        self.problem
            .loads()
            .accumulate_at(t, &mut self.scratch, &mut self.load_q);
        self.problem
            .relax_arithmetic(&mut self.temps, &self.load_q, self.relax)
            .map_err(|e| match e {
                ot_solver::SolverError::NumericalInstability { what } => {
                    SimError::instability(what, t)
                }
                other => SimError::Solver(other),
            })?;
        Ok(())
    }

    /// Temperatures of every node for state `x` at `t`, arithmetic nodes relaxed.
    pub fn node_temperatures(&mut self, t: f64, x: &ThermalState) -> SimResult<Vec<f64>> {
        self.evaluate(t, x)?;
        Ok(self.temps.clone())
    }

    /// Net load power on non-boundary nodes split into `(positive, negative)` parts,
    /// both non-negative. Valid after `evaluate`.
    fn load_split(&self) -> (f64, f64) {
        let (mut q_in, mut q_out) = (0.0, 0.0);
        for (i, &q) in self.load_q.iter().enumerate() {
            if self.problem.kind(i) == NodeKind::Boundary {
                continue;
            }
            if q >= 0.0 {
                q_in += q;
            } else {
                q_out -= q;
            }
        }
        (q_in, q_out)
    }
}

impl TransientModel for ThermalModel<'_> {
    type State = ThermalState;

    fn initial_state(&self) -> ThermalState {
        let temps = self.problem.initial_temperatures(self.time_start);
        ThermalState {
            temperatures: self
                .problem
                .diffusion_nodes()
                .iter()
                .map(|&i| temps[i])
                .collect(),
            energy_in: 0.0,
            energy_out: 0.0,
        }
    }

    fn rhs(&mut self, t: f64, x: &ThermalState) -> SimResult<ThermalState> {
        self.evaluations += 1;
        self.evaluate(t, x)?;

        self.node_q.copy_from_slice(&self.load_q);
        self.problem
            .accumulate_conduction(&self.temps, &mut self.node_q);
        let capacitance = self.problem.capacitance();
        let temperatures = self
            .problem
            .diffusion_nodes()
            .iter()
            .map(|&i| self.node_q[i] / capacitance[i])
            .collect();

        let (load_in, load_out) = self.load_split();
        let (boundary_in, boundary_out) = self.problem.boundary_exchange(&self.temps);
        Ok(ThermalState {
            temperatures,
            energy_in: load_in + boundary_in,
            energy_out: load_out + boundary_out,
        })
    }

    fn add(&self, a: &ThermalState, b: &ThermalState) -> ThermalState {
        ThermalState {
            temperatures: a
                .temperatures
                .iter()
                .zip(&b.temperatures)
                .map(|(x, y)| x + y)
                .collect(),
            energy_in: a.energy_in + b.energy_in,
            energy_out: a.energy_out + b.energy_out,
        }
    }

    fn scale(&self, a: &ThermalState, scale: f64) -> ThermalState {
        ThermalState {
            temperatures: a.temperatures.iter().map(|x| x * scale).collect(),
            energy_in: a.energy_in * scale,
            energy_out: a.energy_out * scale,
        }
    }

    // Energy accumulators ride along uncontrolled.
    fn error_norm(&self, a: &ThermalState, b: &ThermalState) -> f64 {
        a.temperatures
            .iter()
            .zip(&b.temperatures)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    fn is_finite(&self, x: &ThermalState) -> bool {
        x.energy_in.is_finite()
            && x.energy_out.is_finite()
            && x.temperatures.iter().all(|t| t.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ot_network::NetworkBuilder;

    #[test]
    fn derivative_and_boundary_power() {
        let snap = NetworkBuilder::new()
            .diffusion("a", 300.0, 100.0)
            .arithmetic("m", 250.0)
            .boundary("sink", 200.0)
            .linear("am", "a", "m", 1.0)
            .linear("ms", "m", "sink", 1.0)
            .constant_load("q", "a", 20.0)
            .build()
            .unwrap();
        let problem = ThermalProblem::compile(&snap).unwrap();
        let mut model = ThermalModel::new(&problem, 0.0);
        let x = model.initial_state();
        assert_eq!(x.temperatures, vec![300.0]);

        let dx = model.rhs(0.0, &x).unwrap();
        // Series G = 0.5 W/K over 100 K: 50 W leaves, 20 W arrives.
        assert_relative_eq!(dx.temperatures[0], (20.0 - 50.0) / 100.0, epsilon = 1e-9);
        assert_relative_eq!(dx.energy_in, 20.0, epsilon = 1e-12);
        assert_relative_eq!(dx.energy_out, 50.0, epsilon = 1e-8);

        let temps = model.node_temperatures(0.0, &x).unwrap();
        assert_relative_eq!(temps[1], 250.0, epsilon = 1e-8);
        assert_eq!(model.evaluations(), 1);
    }

    #[test]
    fn error_norm_ignores_energy() {
        let snap = NetworkBuilder::new()
            .diffusion("a", 300.0, 100.0)
            .build()
            .unwrap();
        let problem = ThermalProblem::compile(&snap).unwrap();
        let model = ThermalModel::new(&problem, 0.0);
        let a = ThermalState {
            temperatures: vec![1.0],
            energy_in: 1e6,
            energy_out: 0.0,
        };
        let b = ThermalState {
            temperatures: vec![1.5],
            energy_in: 0.0,
            energy_out: 0.0,
        };
        assert_eq!(model.error_norm(&a, &b), 0.5);
    }
}
