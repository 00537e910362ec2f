//! Newton solver with backtracking line search and a positivity floor.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Converged once the largest component of an accepted step is below this.
    pub step_tol: f64,
    /// Unknowns are kept above this floor (absolute temperatures stay positive).
    pub min_value: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            step_tol: 1e-6,
            min_value: 1e-3,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    /// Largest component of the last accepted step.
    pub last_step: f64,
}

/// Solve `residual(x) = 0`.
///
/// `poll` runs once per iteration and can abort the solve (wall-clock limits).
pub fn newton_solve<F, J, P>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    mut poll: P,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
    P: FnMut() -> SolverResult<()>,
{
    let mut x = x0;
    let mut r = residual_fn(&x);
    let mut r_norm = r.norm();
    let mut last_step = f64::INFINITY;

    for iter in 1..=config.max_iterations {
        poll()?;
        if !r_norm.is_finite() {
            return Err(SolverError::instability(format!(
                "non-finite residual at iteration {iter}"
            )));
        }

        let jac = jacobian_fn(&x);
        let dx = jac
            .lu()
            .solve(&(-r.clone()))
            .ok_or_else(|| SolverError::instability("singular steady-state Jacobian"))?;

        // Backtrack until the step respects the floor and does not increase the residual.
        let mut alpha = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = residual_fn(&x_new);
        let mut r_new_norm = r_new.norm();
        for _ in 0..config.max_line_search_iters {
            let above_floor = x_new.iter().all(|v| *v >= config.min_value);
            if above_floor && r_new_norm <= r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = residual_fn(&x_new);
            r_new_norm = r_new.norm();
        }

        last_step = (&x_new - &x).amax();
        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
        debug!(iter, alpha, residual = r_norm, step = last_step, "newton iteration");

        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::instability(format!(
                "non-finite temperature at iteration {iter}"
            )));
        }
        if last_step < config.step_tol {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                last_step,
            });
        }
    }

    Err(SolverError::Convergence {
        iterations: config.max_iterations,
        max_delta: last_step,
        tolerance: config.step_tol,
    })
}
