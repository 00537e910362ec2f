//! Steady-state solve of the full network.

use nalgebra::{DMatrix, DVector};
use ot_conductance::PortTemps;
use ot_core::Deadline;
use ot_network::{NodeKind, SimulationConfig};
use tracing::info;

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, newton_solve};
use crate::problem::ThermalProblem;

/// Equilibrium state of a network.
#[derive(Clone, Debug)]
pub struct SteadySolution {
    /// K, per node in snapshot order.
    pub temperatures: Vec<f64>,
    /// W, from→to, per conductor.
    pub conductor_flows: Vec<f64>,
    /// Heat-load power per node used for the balance (W).
    pub node_loads: Vec<f64>,
    pub iterations: usize,
    /// Largest temperature change of the final iteration (K).
    pub max_delta: f64,
    pub residual_norm: f64,
}

/// Positions of the free (diffusion and arithmetic) nodes among all nodes.
fn free_nodes(problem: &ThermalProblem) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut free = Vec::new();
    let mut slot = vec![None; problem.node_count()];
    for (i, s) in slot.iter_mut().enumerate() {
        if problem.kind(i) != NodeKind::Boundary {
            *s = Some(free.len());
            free.push(i);
        }
    }
    (free, slot)
}

/// Net heat into every free node: conduction plus loads.
fn residual(problem: &ThermalProblem, free: &[usize], base: &[f64], loads: &[f64], x: &DVector<f64>) -> DVector<f64> {
    let mut temps = base.to_vec();
    for (k, &i) in free.iter().enumerate() {
        temps[i] = x[k];
    }
    let mut node_q = loads.to_vec();
    problem.accumulate_conduction(&temps, &mut node_q);
    DVector::from_iterator(free.len(), free.iter().map(|&i| node_q[i]))
}

/// Analytic Jacobian of [`residual`].
fn jacobian(
    problem: &ThermalProblem,
    free: &[usize],
    slot: &[Option<usize>],
    base: &[f64],
    x: &DVector<f64>,
) -> DMatrix<f64> {
    let mut temps = base.to_vec();
    for (k, &i) in free.iter().enumerate() {
        temps[i] = x[k];
    }
    let n = free.len();
    let mut jac = DMatrix::zeros(n, n);
    for (link, &(a, b)) in problem.links().iter().zip(problem.endpoints()) {
        let d = link.derivatives(PortTemps::new(temps[a], temps[b]));
        // Flow leaves `a` and enters `b`.
        if let Some(ra) = slot[a] {
            jac[(ra, ra)] -= d.d_from;
            if let Some(cb) = slot[b] {
                jac[(ra, cb)] -= d.d_to;
            }
        }
        if let Some(rb) = slot[b] {
            jac[(rb, rb)] += d.d_to;
            if let Some(ca) = slot[a] {
                jac[(rb, ca)] += d.d_from;
            }
        }
    }
    jac
}

/// Solve for equilibrium with an implicit Newton iteration on the flux balance of
/// every non-boundary node.
///
/// Loads are evaluated at `config.time_start`, orbital loads at their orbit average.
/// Converged when the largest temperature change of an iteration drops below
/// `config.tolerance`; `config.max_iterations` bounds the work.
pub fn solve_steady(
    problem: &ThermalProblem,
    config: &SimulationConfig,
    deadline: &Deadline,
) -> SolverResult<SteadySolution> {
    let t = config.time_start;
    let base = problem.initial_temperatures(t);
    let mut loads = vec![0.0; problem.node_count()];
    let mut scratch = Vec::new();
    problem.loads().accumulate_steady(t, &mut scratch, &mut loads);

    let (free, slot) = free_nodes(problem);
    let x0 = DVector::from_iterator(free.len(), free.iter().map(|&i| base[i]));

    let newton = NewtonConfig {
        max_iterations: config.max_iterations,
        step_tol: config.tolerance,
        ..NewtonConfig::default()
    };

    let result = if free.is_empty() {
        None
    } else {
        Some(newton_solve(
            x0,
            |x| residual(problem, &free, &base, &loads, x),
            |x| jacobian(problem, &free, &slot, &base, x),
            || deadline.check().map_err(SolverError::from),
            &newton,
        )?)
    };

    let mut temperatures = base.clone();
    let (iterations, max_delta, residual_norm) = match &result {
        Some(r) => {
            for (k, &i) in free.iter().enumerate() {
                temperatures[i] = r.x[k];
            }
            (r.iterations, r.last_step, r.residual_norm)
        }
        None => (0, 0.0, 0.0),
    };

    let mut conductor_flows = Vec::new();
    problem.conductor_flows(&temperatures, &mut conductor_flows);
    info!(iterations, max_delta, residual_norm, "steady state converged");

    Ok(SteadySolution {
        temperatures,
        conductor_flows,
        node_loads: loads,
        iterations,
        max_delta,
        residual_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ot_network::NetworkBuilder;

    fn fd_jacobian(problem: &ThermalProblem, x: &DVector<f64>) -> DMatrix<f64> {
        let (free, _) = free_nodes(problem);
        let base = problem.initial_temperatures(0.0);
        let loads = vec![0.0; problem.node_count()];
        let n = x.len();
        let mut jac = DMatrix::zeros(n, n);
        for j in 0..n {
            let h = 1e-4;
            let mut xp = x.clone();
            xp[j] += h;
            let mut xm = x.clone();
            xm[j] -= h;
            let df = (residual(problem, &free, &base, &loads, &xp)
                - residual(problem, &free, &base, &loads, &xm))
                / (2.0 * h);
            jac.set_column(j, &df);
        }
        jac
    }

    #[test]
    fn analytic_jacobian_matches_finite_difference() {
        let snap = NetworkBuilder::new()
            .diffusion("a", 320.0, 10.0)
            .arithmetic("b", 290.0)
            .diffusion("c", 275.0, 10.0)
            .boundary("space", 3.0)
            .linear("ab", "a", "b", 2.0)
            .heat_pipe("bc", "b", "c", vec![(250.0, 1.0), (300.0, 4.0)])
            .radiation("cs", "c", "space", 0.5, 1.0, 0.9)
            .radiation("as", "space", "a", 0.2, 1.0, 0.8)
            .build()
            .unwrap();
        let p = ThermalProblem::compile(&snap).unwrap();
        let (free, slot) = free_nodes(&p);
        let base = p.initial_temperatures(0.0);
        let x = DVector::from_vec(vec![320.0, 290.0, 275.0]);

        let analytic = jacobian(&p, &free, &slot, &base, &x);
        let numeric = fd_jacobian(&p, &x);
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *n, epsilon = 1e-5, max_relative = 1e-6);
        }
    }

    #[test]
    fn all_boundary_network_is_trivial() {
        let snap = NetworkBuilder::new()
            .boundary("a", 300.0)
            .boundary("b", 200.0)
            .linear("ab", "a", "b", 1.0)
            .build()
            .unwrap();
        let p = ThermalProblem::compile(&snap).unwrap();
        let sol = solve_steady(&p, &SimulationConfig::steady(10, 1e-6), &Deadline::unlimited()).unwrap();
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.conductor_flows, vec![100.0]);
    }
}
