//! Analytical benchmark suite for orbitherm.
//!
//! Every case has a closed-form answer. The suite runs the cases through the engine
//! (or the view-factor estimator) and reports the percent error of each in a
//! [`BenchmarkTable`].

use ot_core::{SIGMA, Stopwatch};
use ot_engine::EngineError;
use ot_network::{NetworkBuilder, SimulationConfig};
use ot_results::{BenchmarkRow, BenchmarkTable};
use ot_viewfactor::analytic::parallel_rectangles;
use ot_viewfactor::{Geometry, Surface, Vec3, ViewFactorError, ViewFactorJob, ViewFactorRequest, WorkerError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("View factor error: {0}")]
    ViewFactor(#[from] ViewFactorError),

    #[error("View factor worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Result has no node '{id}'")]
    MissingNode { id: &'static str },

    #[error("Result has no energy balance")]
    MissingEnergyBalance,
}

pub type BenchResult<T> = Result<T, BenchError>;

/// Knobs for the costlier cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchOptions {
    /// Rays for the parallel-plate view factor.
    pub view_factor_rays: usize,
    pub seed: u64,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            view_factor_rays: 4_000_000,
            seed: 2024,
        }
    }
}

/// One analytical case.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkCase {
    pub id: &'static str,
    pub description: &'static str,
    pub analytical: fn() -> f64,
    pub solve: fn(&BenchOptions) -> BenchResult<f64>,
}

impl BenchmarkCase {
    /// Solve the case; a solver failure yields a failing row.
    pub fn run(&self, options: &BenchOptions) -> BenchmarkRow {
        let analytical = (self.analytical)();
        let watch = Stopwatch::start();
        let row = match (self.solve)(options) {
            Ok(solver) => BenchmarkRow::new(self.id, analytical, solver),
            Err(e) => {
                warn!(case = self.id, error = %e, "benchmark failed to run");
                BenchmarkRow::failed(self.id, analytical)
            }
        };
        info!(
            case = self.id,
            percent_error = row.percent_error,
            pass = row.pass,
            wall_time_s = watch.elapsed_s(),
            "benchmark finished"
        );
        row
    }
}

fn final_temperature(result: &ot_results::ResultSnapshot, id: &'static str) -> BenchResult<f64> {
    result
        .final_temperature(id)
        .ok_or(BenchError::MissingNode { id })
}

/// Q = 100 W into a node tied to a 200 K sink through G = 10 W/K.
fn two_node_conduction(_: &BenchOptions) -> BenchResult<f64> {
    let snap = NetworkBuilder::new()
        .diffusion("hot", 250.0, 100.0)
        .boundary("sink", 200.0)
        .linear("g", "hot", "sink", 10.0)
        .constant_load("q", "hot", 100.0)
        .build()
        .map_err(EngineError::from)?;
    let result = ot_engine::run(&snap, &SimulationConfig::steady(100, 1e-9))?;
    final_temperature(&result, "hot")
}

/// Black plate radiating 500 W to deep space: `T = (Q/σ)^¼`.
fn radiation_equilibrium(_: &BenchOptions) -> BenchResult<f64> {
    let snap = NetworkBuilder::new()
        .arithmetic("plate", 250.0)
        .boundary("space", 0.0)
        .radiation("r", "plate", "space", 1.0, 1.0, 1.0)
        .constant_load("q", "plate", 500.0)
        .build()
        .map_err(EngineError::from)?;
    let result = ot_engine::run(&snap, &SimulationConfig::steady(100, 1e-9))?;
    final_temperature(&result, "plate")
}

/// 50 W through a heat pipe of constant 5 W/K to a 300 K condenser.
fn heat_pipe_conduction(_: &BenchOptions) -> BenchResult<f64> {
    let snap = NetworkBuilder::new()
        .diffusion("evaporator", 330.0, 100.0)
        .boundary("condenser", 300.0)
        .heat_pipe("hp", "evaporator", "condenser", vec![(250.0, 5.0), (400.0, 5.0)])
        .constant_load("q", "evaporator", 50.0)
        .build()
        .map_err(EngineError::from)?;
    let result = ot_engine::run(&snap, &SimulationConfig::steady(100, 1e-9))?;
    final_temperature(&result, "evaporator")
}

/// Newtonian cooling `T = T_sink + ΔT₀·e^{−tG/C}` after one time constant.
fn transient_exponential(_: &BenchOptions) -> BenchResult<f64> {
    let snap = NetworkBuilder::new()
        .diffusion("mass", 300.0, 1000.0)
        .boundary("sink", 200.0)
        .linear("g", "mass", "sink", 10.0)
        .build()
        .map_err(EngineError::from)?;
    let config = SimulationConfig {
        tolerance: 1e-6,
        ..SimulationConfig::transient(100.0, 1.0, 10.0)
    };
    let result = ot_engine::run(&snap, &config)?;
    final_temperature(&result, "mass")
}

/// Closed two-node network under a constant load. The exact balance error is zero.
fn energy_balance_closure(_: &BenchOptions) -> BenchResult<f64> {
    let snap = NetworkBuilder::new()
        .diffusion("a", 300.0, 500.0)
        .diffusion("b", 280.0, 500.0)
        .linear("ab", "a", "b", 5.0)
        .constant_load("q", "a", 50.0)
        .build()
        .map_err(EngineError::from)?;
    let result = ot_engine::run(&snap, &SimulationConfig::transient(200.0, 1.0, 50.0))?;
    result
        .energy_balance_error
        .ok_or(BenchError::MissingEnergyBalance)
}

/// Opposed unit squares 0.2 m apart.
fn parallel_plate_view_factor(options: &BenchOptions) -> BenchResult<f64> {
    let geometry = Geometry::new(vec![
        Surface::rectangle("lower", "lower", Vec3::zeros(), Vec3::x(), Vec3::y()),
        Surface::rectangle("upper", "upper", Vec3::new(0.0, 0.0, 0.2), Vec3::y(), Vec3::x()),
    ])?;
    let request = ViewFactorRequest::new("lower", "upper")
        .with_rays(options.view_factor_rays)
        .with_seed(options.seed);
    let estimates = ViewFactorJob::spawn(geometry, vec![request]).wait()?;
    Ok(estimates.first().map_or(f64::NAN, |e| e.view_factor))
}

/// The default benchmark suite.
pub fn default_benchmarks() -> Vec<BenchmarkCase> {
    vec![
        BenchmarkCase {
            id: "two_node_conduction",
            description: "Q = 100 W, G = 10 W/K, sink 200 K",
            analytical: || 210.0,
            solve: two_node_conduction,
        },
        BenchmarkCase {
            id: "radiation_equilibrium",
            description: "black plate, 500 W to 0 K space",
            analytical: || (500.0 / SIGMA).powf(0.25),
            solve: radiation_equilibrium,
        },
        BenchmarkCase {
            id: "heat_pipe_conduction",
            description: "50 W through 5 W/K to a 300 K condenser",
            analytical: || 310.0,
            solve: heat_pipe_conduction,
        },
        BenchmarkCase {
            id: "transient_exponential",
            description: "C = 1000 J/K, G = 10 W/K, one time constant",
            analytical: || 200.0 + 100.0 * (-1.0f64).exp(),
            solve: transient_exponential,
        },
        BenchmarkCase {
            id: "energy_balance_closure",
            description: "closed network, constant load, 200 s",
            analytical: || 0.0,
            solve: energy_balance_closure,
        },
        BenchmarkCase {
            id: "parallel_plate_view_factor",
            description: "unit squares, 0.2 m gap",
            analytical: || parallel_rectangles(1.0, 1.0, 0.2),
            solve: parallel_plate_view_factor,
        },
    ]
}

/// Run every case in `cases` in order.
pub fn run_suite(cases: &[BenchmarkCase], options: &BenchOptions) -> BenchmarkTable {
    let mut table = BenchmarkTable::default();
    for case in cases {
        table.push(case.run(options));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn case(id: &str) -> BenchmarkCase {
        default_benchmarks()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap()
    }

    #[test]
    fn deterministic_cases_pass() {
        let cases: Vec<BenchmarkCase> = default_benchmarks()
            .into_iter()
            .filter(|c| c.id != "parallel_plate_view_factor")
            .collect();
        let table = run_suite(&cases, &BenchOptions::default());
        assert_eq!(table.rows.len(), 5);
        assert!(table.all_pass(), "{table}");
    }

    #[test]
    fn two_node_benchmark_value() {
        let row = case("two_node_conduction").run(&BenchOptions::default());
        assert_relative_eq!(row.solver, 210.0, epsilon = 1e-6);
    }

    #[test]
    fn view_factor_case_is_close_with_few_rays() {
        let options = BenchOptions {
            view_factor_rays: 50_000,
            ..BenchOptions::default()
        };
        let row = case("parallel_plate_view_factor").run(&options);
        // 50k rays: standard error ≈ 0.002.
        assert!((row.solver - row.analytical).abs() < 0.01, "{row:?}");
    }
}
