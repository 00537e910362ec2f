//! Adaptive transient runner and result recording.

use ot_core::Deadline;
use ot_network::SimulationConfig;
use ot_solver::{RelaxOptions, ThermalProblem};
use tracing::{debug, info};

use crate::energy::EnergyBalance;
use crate::error::{SimError, SimResult};
use crate::integrator::{RK4, richardson_step};
use crate::model::TransientModel;
use crate::thermal::{ThermalModel, ThermalState};

/// Steps grow once the error estimate is below `tolerance / GROW_MARGIN`.
const GROW_MARGIN: f64 = 32.0;

/// Options for a transient run.
#[derive(Clone, Debug)]
pub struct TransientOptions {
    pub time_start: f64,
    pub time_end: f64,
    pub initial_step: f64,
    pub min_step: f64,
    pub max_step: f64,
    pub output_interval: f64,
    /// Local error bound per step (K).
    pub tolerance: f64,
    pub relax: RelaxOptions,
}

impl TransientOptions {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            time_start: config.time_start,
            time_end: config.time_end,
            initial_step: config.time_step,
            min_step: config.min_step,
            max_step: config.max_step,
            output_interval: config.output_interval,
            tolerance: config.tolerance,
            relax: RelaxOptions::default(),
        }
    }

    fn validate(&self) -> SimResult<()> {
        let all_finite = [
            self.time_start,
            self.time_end,
            self.initial_step,
            self.min_step,
            self.max_step,
            self.output_interval,
            self.tolerance,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(SimError::InvalidArg {
                what: "transient options must be finite",
            });
        }
        if self.time_end < self.time_start {
            return Err(SimError::InvalidArg {
                what: "time_end must not precede time_start",
            });
        }
        if self.initial_step <= 0.0 || self.min_step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "time steps must be positive",
            });
        }
        if self.max_step < self.min_step {
            return Err(SimError::InvalidArg {
                what: "max_step must be at least min_step",
            });
        }
        if self.output_interval <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "output_interval must be positive",
            });
        }
        if self.tolerance <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "tolerance must be positive",
            });
        }
        Ok(())
    }

    /// Times closer than this are treated as equal.
    fn time_epsilon(&self) -> f64 {
        1e-9 * (self.time_end - self.time_start).abs().max(1.0)
    }
}

/// Step-size bookkeeping of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
    pub smallest_step: f64,
    pub largest_step: f64,
    pub rhs_evaluations: usize,
}

impl StepStats {
    fn accept(&mut self, dt: f64) {
        if self.accepted == 0 {
            self.smallest_step = dt;
            self.largest_step = dt;
        } else {
            self.smallest_step = self.smallest_step.min(dt);
            self.largest_step = self.largest_step.max(dt);
        }
        self.accepted += 1;
    }
}

/// Output samples of a transient run.
///
/// Owned by the caller and filled in place so that everything recorded before a
/// failure is still available afterwards.
#[derive(Clone, Debug, Default)]
pub struct TransientRecord {
    /// Output times (s).
    pub times: Vec<f64>,
    /// Per output time, the temperature of every node (K).
    pub temperatures: Vec<Vec<f64>>,
    /// Per output time, the from→to flow of every conductor (W).
    pub conductor_flows: Vec<Vec<f64>>,
    /// Energy in and out at each output time (J, cumulative).
    pub energy_in: Vec<f64>,
    pub energy_out: Vec<f64>,
    pub stats: StepStats,
}

impl TransientRecord {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Temperature history of one node.
    pub fn node_history(&self, node: usize) -> Vec<f64> {
        self.temperatures.iter().map(|row| row[node]).collect()
    }

    pub fn last_temperatures(&self) -> Option<&[f64]> {
        self.temperatures.last().map(Vec::as_slice)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Progress report emitted after every output sample.
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    pub time: f64,
    /// Completed share of the simulated interval, `0..=1`.
    pub fraction: f64,
    pub accepted_steps: usize,
}

/// Summary of a completed transient run.
#[derive(Clone, Debug)]
pub struct TransientSummary {
    pub energy: EnergyBalance,
    pub stats: StepStats,
}

/// Run a transient simulation of `problem`.
pub fn run_transient(
    problem: &ThermalProblem,
    options: &TransientOptions,
    deadline: &Deadline,
    record: &mut TransientRecord,
) -> SimResult<TransientSummary> {
    run_transient_with_progress(problem, options, deadline, record, None)
}

/// Run a transient simulation of `problem`, reporting progress after every output.
///
/// RK4 steps are controlled by Richardson extrapolation: a step whose error estimate
/// exceeds `tolerance` is retried at half size, and a step well inside the tolerance
/// lets the next one double up to `max_step`. Steps are cut short to land exactly on
/// each output time.
pub fn run_transient_with_progress(
    problem: &ThermalProblem,
    options: &TransientOptions,
    deadline: &Deadline,
    record: &mut TransientRecord,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<TransientSummary> {
    options.validate()?;
    record.clear();

    let mut model = ThermalModel::new(problem, options.time_start).with_relax(options.relax);
    let mut t = options.time_start;
    let mut x = model.initial_state();
    let span = options.time_end - options.time_start;
    let eps = options.time_epsilon();
    info!(
        nodes = problem.node_count(),
        time_start = options.time_start,
        time_end = options.time_end,
        "transient run started"
    );

    let initial_temps = model.node_temperatures(t, &x)?;
    let initial_energy = problem.stored_energy(&initial_temps);
    push_output(problem, record, t, initial_temps, &x);

    let mut dt = options.initial_step.clamp(options.min_step, options.max_step);
    let mut next_output = 1_u64;

    while options.time_end - t > eps {
        deadline.check()?;

        let output_time = (options.time_start + next_output as f64 * options.output_interval)
            .min(options.time_end);
        let h = dt.min(output_time - t);
        let attempt = richardson_step(&RK4, &mut model, t, &x, h)?;

        if !attempt.error.is_finite() || !model.is_finite(&attempt.state) {
            record.stats.rhs_evaluations = model.evaluations();
            return Err(SimError::instability("non-finite temperature", t));
        }

        if attempt.error > options.tolerance {
            record.stats.rejected += 1;
            dt = 0.5 * h;
            debug!(t, dt, error = attempt.error, "step rejected");
            if dt < options.min_step {
                record.stats.rhs_evaluations = model.evaluations();
                return Err(SimError::instability(
                    format!(
                        "step size {dt:.3e} s fell below min_step {:.3e} s",
                        options.min_step
                    ),
                    t,
                ));
            }
            continue;
        }

        record.stats.accept(h);
        x = attempt.state;
        t += h;
        if (output_time - t).abs() <= eps {
            t = output_time;
            let temps = model.node_temperatures(t, &x)?;
            push_output(problem, record, t, temps, &x);
            next_output += 1;
            if let Some(cb) = progress.as_mut() {
                cb(SimProgress {
                    time: t,
                    fraction: if span > 0.0 {
                        (t - options.time_start) / span
                    } else {
                        1.0
                    },
                    accepted_steps: record.stats.accepted,
                });
            }
        }

        if attempt.error < options.tolerance / GROW_MARGIN && dt < options.max_step {
            dt = (2.0 * dt).min(options.max_step);
            debug!(t, dt, error = attempt.error, "step grown");
        }
    }

    record.stats.rhs_evaluations = model.evaluations();
    let final_temps = record.last_temperatures().unwrap_or(&[]);
    let energy = EnergyBalance {
        energy_in: x.energy_in,
        energy_out: x.energy_out,
        stored_change: problem.stored_energy(final_temps) - initial_energy,
        duration: span,
    };
    info!(
        outputs = record.len(),
        accepted = record.stats.accepted,
        rejected = record.stats.rejected,
        energy_error = energy.error(),
        "transient run finished"
    );
    Ok(TransientSummary {
        energy,
        stats: record.stats.clone(),
    })
}

fn push_output(
    problem: &ThermalProblem,
    record: &mut TransientRecord,
    t: f64,
    temps: Vec<f64>,
    x: &ThermalState,
) {
    let mut flows = Vec::with_capacity(problem.conductor_count());
    problem.conductor_flows(&temps, &mut flows);
    record.times.push(t);
    record.temperatures.push(temps);
    record.conductor_flows.push(flows);
    record.energy_in.push(x.energy_in);
    record.energy_out.push(x.energy_out);
}
