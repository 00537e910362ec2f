//! Batch evaluation of design points.

use ot_network::{NetworkSnapshot, SimulationConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constraints::{Extremes, TemperatureLimit, constrained_nodes};
use crate::error::{ExploreError, ExploreResult};
use crate::sampling::{SamplingMethod, design_points};
use crate::space::{ParamRange, apply_point, validate_ranges};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExploreOptions {
    pub samples: usize,
    pub method: SamplingMethod,
    pub seed: u64,
    /// Worker threads; `None` uses the available parallelism.
    pub max_threads: Option<usize>,
    pub constraints: Vec<TemperatureLimit>,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        Self {
            samples: 32,
            method: SamplingMethod::default(),
            seed: 0,
            max_threads: None,
            constraints: Vec::new(),
        }
    }
}

impl ExploreOptions {
    pub fn validate(&self, snapshot: &NetworkSnapshot) -> ExploreResult<()> {
        if self.samples == 0 {
            return Err(ExploreError::InvalidOptions {
                what: "samples must be positive",
            });
        }
        if self.max_threads == Some(0) {
            return Err(ExploreError::InvalidOptions {
                what: "max_threads must be positive",
            });
        }
        self.constraints
            .iter()
            .try_for_each(|c| c.validate(snapshot))
    }

    fn thread_pool(&self) -> ExploreResult<rayon::ThreadPool> {
        let threads = self.max_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ExploreError::Pool(e.to_string()))
    }
}

/// Outcome of one design point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleResult {
    pub index: usize,
    /// Parameter values, aligned with the explored ranges.
    pub values: Vec<f64>,
    /// Highest temperature of each node over the run (K); empty when the run failed.
    pub node_max_temperatures: Vec<f64>,
    pub node_min_temperatures: Vec<f64>,
    /// Highest temperature over all non-boundary nodes.
    pub max_temperature: Option<f64>,
    pub feasible: bool,
    pub violations: Vec<String>,
    pub error: Option<String>,
}

impl SampleResult {
    fn failed(index: usize, values: Vec<f64>, error: String) -> Self {
        warn!(index, %error, "design sample failed");
        Self {
            index,
            values,
            node_max_temperatures: Vec::new(),
            node_min_temperatures: Vec::new(),
            max_temperature: None,
            feasible: false,
            violations: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExploreSummary {
    pub total: usize,
    pub feasible: usize,
    /// Completed but violating at least one constraint.
    pub infeasible: usize,
    pub failed: usize,
    pub feasible_fraction: f64,
    /// Feasible sample with the lowest overall maximum temperature.
    pub best: Option<usize>,
}

impl ExploreSummary {
    pub fn from_samples(samples: &[SampleResult]) -> Self {
        let total = samples.len();
        let feasible = samples.iter().filter(|s| s.feasible).count();
        let failed = samples.iter().filter(|s| s.error.is_some()).count();
        let best = samples
            .iter()
            .filter(|s| s.feasible)
            .filter_map(|s| s.max_temperature.map(|t| (s.index, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        Self {
            total,
            feasible,
            infeasible: total - feasible - failed,
            failed,
            feasible_fraction: if total == 0 {
                0.0
            } else {
                feasible as f64 / total as f64
            },
            best,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exploration {
    pub ranges: Vec<ParamRange>,
    pub node_ids: Vec<String>,
    /// Ordered by sample index.
    pub samples: Vec<SampleResult>,
    pub summary: ExploreSummary,
}

impl Exploration {
    pub fn best(&self) -> Option<&SampleResult> {
        self.summary.best.and_then(|i| self.samples.get(i))
    }
}

/// Apply `values` to a copy of `snapshot`, run it and check `constraints`.
///
/// A failed run yields an infeasible sample carrying the error.
pub fn evaluate_point(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    ranges: &[ParamRange],
    constraints: &[TemperatureLimit],
    index: usize,
    values: Vec<f64>,
) -> SampleResult {
    let design = match apply_point(snapshot, ranges, &values) {
        Ok(d) => d,
        Err(e) => return SampleResult::failed(index, values, e.to_string()),
    };
    let result = match ot_engine::run(&design, config) {
        Ok(r) => r,
        Err(e) => return SampleResult::failed(index, values, e.to_string()),
    };

    let node_ids: Vec<String> = result.nodes.iter().map(|n| n.id.clone()).collect();
    let node_max_temperatures = result.max_temperatures();
    let node_min_temperatures: Vec<f64> = result
        .nodes
        .iter()
        .map(|n| n.temperatures.iter().copied().fold(f64::INFINITY, f64::min))
        .collect();
    let constrained = constrained_nodes(&design);
    let max_temperature = node_max_temperatures
        .iter()
        .zip(&constrained)
        .filter(|(_, c)| **c)
        .map(|(t, _)| *t)
        .reduce(f64::max);

    let violations = Extremes {
        node_ids: &node_ids,
        constrained: &constrained,
        max: &node_max_temperatures,
        min: &node_min_temperatures,
    }
    .violations(constraints);

    SampleResult {
        index,
        values,
        node_max_temperatures,
        node_min_temperatures,
        max_temperature,
        feasible: violations.is_empty(),
        violations,
        error: None,
    }
}

/// Sample the design space and evaluate every point on a bounded pool.
pub fn explore(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    ranges: &[ParamRange],
    options: &ExploreOptions,
) -> ExploreResult<Exploration> {
    validate_ranges(ranges)?;
    options.validate(snapshot)?;
    // Every range must name a writable property of the baseline.
    for range in ranges {
        range.param.with_value(snapshot, range.min)?;
    }

    let points = design_points(ranges, options.method, options.seed, options.samples);
    let pool = options.thread_pool()?;
    info!(
        samples = points.len(),
        params = ranges.len(),
        method = ?options.method,
        threads = pool.current_num_threads(),
        "design exploration started"
    );

    let samples: Vec<SampleResult> = pool.install(|| {
        points
            .into_par_iter()
            .enumerate()
            .map(|(i, values)| evaluate_point(snapshot, config, ranges, &options.constraints, i, values))
            .collect()
    });

    let summary = ExploreSummary::from_samples(&samples);
    info!(
        feasible = summary.feasible,
        failed = summary.failed,
        best = ?summary.best,
        "design exploration finished"
    );
    Ok(Exploration {
        ranges: ranges.to_vec(),
        node_ids: snapshot.nodes.iter().map(|n| n.id.clone()).collect(),
        samples,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(index: usize, feasible: bool, max: Option<f64>, error: bool) -> SampleResult {
        SampleResult {
            index,
            values: vec![],
            node_max_temperatures: vec![],
            node_min_temperatures: vec![],
            max_temperature: max,
            feasible,
            violations: vec![],
            error: error.then(|| "boom".to_string()),
        }
    }

    #[test]
    fn summary_counts_and_best() {
        let samples = vec![
            sample(0, true, Some(320.0), false),
            sample(1, false, Some(400.0), false),
            sample(2, true, Some(305.0), false),
            sample(3, false, None, true),
        ];
        let s = ExploreSummary::from_samples(&samples);
        assert_eq!((s.total, s.feasible, s.infeasible, s.failed), (4, 2, 1, 1));
        assert_eq!(s.feasible_fraction, 0.5);
        assert_eq!(s.best, Some(2));
    }

    #[test]
    fn options_validation() {
        let snap = ot_network::NetworkBuilder::new()
            .diffusion("a", 300.0, 1.0)
            .snapshot();
        let bad = ExploreOptions {
            constraints: vec![TemperatureLimit::max(350.0).for_node("ghost")],
            ..ExploreOptions::default()
        };
        assert!(matches!(
            bad.validate(&snap),
            Err(ExploreError::UnknownNode { .. })
        ));
        let zero = ExploreOptions {
            samples: 0,
            ..ExploreOptions::default()
        };
        assert!(zero.validate(&snap).is_err());
    }
}
