//! Run orchestration: snapshot + config in, result snapshot out.

use chrono::Utc;
use ot_core::Deadline;
use ot_network::{NetworkSnapshot, SimulationConfig, SimulationKind, validate_config};
use ot_results::{ConductorSeries, NodeSeries, ResultSnapshot, RunStatus, compute_run_id};
use ot_sim::{
    SimProgress, TransientOptions, TransientRecord, run_transient_with_progress,
    steady_energy_balance,
};
use ot_solver::{ThermalProblem, solve_steady};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::progress::{RunProgressEvent, RunStage, TransientProgress};

/// Version folded into run ids.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of one run: the snapshot handed back to the caller, plus the typed failure
/// when the run did not complete. A failed run keeps its partial history.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: ResultSnapshot,
    pub error: Option<EngineError>,
}

impl RunOutcome {
    pub fn into_result(self) -> EngineResult<ResultSnapshot> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.result),
        }
    }
}

/// Retry behaviour of [`run_with_retry`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Factor applied to `time_step`, `min_step` and `max_step` for the retry.
    pub step_scale: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { step_scale: 0.5 }
    }
}

fn emit(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    event: RunProgressEvent,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

/// Run `snapshot` under `config`.
pub fn run(snapshot: &NetworkSnapshot, config: &SimulationConfig) -> EngineResult<ResultSnapshot> {
    run_with_progress(snapshot, config, None).into_result()
}

/// Run `snapshot` under `config`, streaming stage and step progress.
pub fn run_with_progress(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> RunOutcome {
    let deadline = Deadline::after_secs(config.wall_clock_limit_s);
    let run_id = compute_run_id(snapshot, config, ENGINE_VERSION);
    let mut result = ResultSnapshot::pending(run_id, config.kind);
    result.stats.started_at = Some(Utc::now());
    result.status = RunStatus::Running;
    info!(run_id = %result.run_id, kind = ?config.kind, "run started");

    let outcome = execute(snapshot, config, &deadline, &mut result, &mut progress_cb);
    result.stats.wall_time_s = deadline.elapsed_s();

    let error = match outcome {
        Ok(()) => {
            result.status = RunStatus::Completed;
            info!(
                run_id = %result.run_id,
                wall_time_s = result.stats.wall_time_s,
                energy_balance_error = result.energy_balance_error,
                "run completed"
            );
            None
        }
        Err(e) => {
            result.status = RunStatus::Failed;
            result.error = Some(e.to_string());
            warn!(run_id = %result.run_id, kind = e.kind(), error = %e, "run failed");
            Some(e)
        }
    };
    emit(
        &mut progress_cb,
        RunProgressEvent::stage(
            config.kind,
            if error.is_none() {
                RunStage::Completed
            } else {
                RunStage::Failed
            },
            deadline.elapsed_s(),
            result.error.clone(),
        ),
    );
    RunOutcome { result, error }
}

/// Run once; a transient run that fails with a numerical instability is retried once
/// with every step size scaled by `policy.step_scale`.
pub fn run_with_retry(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    policy: RetryPolicy,
) -> EngineResult<ResultSnapshot> {
    match run(snapshot, config) {
        Err(EngineError::NumericalInstability(what)) if config.kind == SimulationKind::Transient => {
            warn!(%what, step_scale = policy.step_scale, "retrying with a smaller step");
            let retry = SimulationConfig {
                time_step: config.time_step * policy.step_scale,
                min_step: config.min_step * policy.step_scale,
                max_step: config.max_step * policy.step_scale,
                ..config.clone()
            };
            run(snapshot, &retry)
        }
        other => other,
    }
}

fn execute(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    deadline: &Deadline,
    result: &mut ResultSnapshot,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
) -> EngineResult<()> {
    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::Validating, deadline.elapsed_s(), None),
    );
    validate_config(config)?;

    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::Compiling, deadline.elapsed_s(), None),
    );
    let problem = ThermalProblem::compile(snapshot)?;

    match config.kind {
        SimulationKind::Steady => run_steady(&problem, config, deadline, result, progress_cb),
        SimulationKind::Transient => run_transient(&problem, config, deadline, result, progress_cb),
    }
}

fn run_steady(
    problem: &ThermalProblem,
    config: &SimulationConfig,
    deadline: &Deadline,
    result: &mut ResultSnapshot,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
) -> EngineResult<()> {
    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::SolvingSteady, deadline.elapsed_s(), None),
    );
    let solution = solve_steady(problem, config, deadline)?;
    let t = config.time_start;

    result.nodes = problem
        .node_ids()
        .iter()
        .zip(problem.node_names())
        .zip(&solution.temperatures)
        .map(|((id, name), &temp)| NodeSeries {
            id: id.clone(),
            name: name.clone(),
            times: vec![t],
            temperatures: vec![temp],
        })
        .collect();
    result.conductors = problem
        .conductor_ids()
        .iter()
        .zip(&solution.conductor_flows)
        .map(|(id, &flow)| ConductorSeries {
            id: id.clone(),
            times: vec![t],
            flows: vec![flow],
        })
        .collect();
    result.stats.iterations = solution.iterations;

    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::CheckingEnergy, deadline.elapsed_s(), None),
    );
    result.energy_balance_error = Some(steady_energy_balance(problem, &solution).error());
    Ok(())
}

fn run_transient(
    problem: &ThermalProblem,
    config: &SimulationConfig,
    deadline: &Deadline,
    result: &mut ResultSnapshot,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
) -> EngineResult<()> {
    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::RunningTransient, deadline.elapsed_s(), None),
    );
    let options = TransientOptions::from_config(config);
    let mut record = TransientRecord::default();
    let outcome = {
        let mut forward = |p: SimProgress| {
            emit(
                progress_cb,
                RunProgressEvent {
                    kind: config.kind,
                    stage: RunStage::RunningTransient,
                    elapsed_wall_s: deadline.elapsed_s(),
                    message: None,
                    transient: Some(TransientProgress {
                        sim_time_s: p.time,
                        t_end_s: options.time_end,
                        fraction_complete: p.fraction,
                        accepted_steps: p.accepted_steps,
                    }),
                },
            );
        };
        run_transient_with_progress(problem, &options, deadline, &mut record, Some(&mut forward))
    };

    // Partial histories are kept on failure.
    fill_from_record(problem, &record, result);
    let summary = outcome?;

    emit(
        progress_cb,
        RunProgressEvent::stage(config.kind, RunStage::CheckingEnergy, deadline.elapsed_s(), None),
    );
    result.energy_balance_error = Some(summary.energy.error());
    Ok(())
}

fn fill_from_record(problem: &ThermalProblem, record: &TransientRecord, result: &mut ResultSnapshot) {
    result.nodes = problem
        .node_ids()
        .iter()
        .zip(problem.node_names())
        .enumerate()
        .map(|(i, (id, name))| NodeSeries {
            id: id.clone(),
            name: name.clone(),
            times: record.times.clone(),
            temperatures: record.node_history(i),
        })
        .collect();
    result.conductors = problem
        .conductor_ids()
        .iter()
        .enumerate()
        .map(|(c, id)| ConductorSeries {
            id: id.clone(),
            times: record.times.clone(),
            flows: record.conductor_flows.iter().map(|row| row[c]).collect(),
        })
        .collect();
    result.stats.iterations = record.stats.accepted;
    result.stats.rejected_steps = record.stats.rejected;
    result.stats.rhs_evaluations = record.stats.rhs_evaluations;
}
