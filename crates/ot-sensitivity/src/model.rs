//! Finite-difference sensitivities of final node temperatures.

use ot_network::{NetworkSnapshot, ParamDomain, ParamRef, SimulationConfig};
use ot_results::ResultSnapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SensitivityError, SensitivityResult};
use crate::options::SensitivityOptions;

/// Finite-difference points used for one parameter.
///
/// `Central` runs `p ± Δp`. Parameters at the edge of their domain use the one-sided
/// stencils: `Forward` runs `p + Δp, p + 2Δp`, `Backward` runs `p − Δp, p − 2Δp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stencil {
    #[default]
    Central,
    Forward,
    Backward,
}

impl Stencil {
    /// First stencil whose perturbed values all stay inside `domain`.
    pub fn choose(domain: ParamDomain, value: f64, step: f64) -> Option<Self> {
        let inside = |k: f64| domain.contains(value + k * step);
        if inside(1.0) && inside(-1.0) {
            Some(Stencil::Central)
        } else if inside(1.0) && inside(2.0) {
            Some(Stencil::Forward)
        } else if inside(-1.0) && inside(-2.0) {
            Some(Stencil::Backward)
        } else {
            None
        }
    }

    /// Offsets of the two perturbed runs, in units of `Δp`.
    fn offsets(self) -> (f64, f64) {
        match self {
            Stencil::Central => (1.0, -1.0),
            Stencil::Forward => (1.0, 2.0),
            Stencil::Backward => (-1.0, -2.0),
        }
    }

    /// `(dT/dp, d²T/dp²)` of one node from the baseline and the two perturbed runs.
    fn derivatives(self, t0: f64, a: f64, b: f64, h: f64) -> (f64, f64) {
        match self {
            Stencil::Central => ((a - t0) / h, (a - 2.0 * t0 + b) / (h * h)),
            Stencil::Forward => ((a - t0) / h, (b - 2.0 * a + t0) / (h * h)),
            Stencil::Backward => ((t0 - a) / h, (t0 - 2.0 * a + b) / (h * h)),
        }
    }
}

/// Sensitivities of every node to one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensitivityEntry {
    pub param: ParamRef,
    pub baseline_value: f64,
    /// Perturbation `Δp` used for both runs.
    pub step: f64,
    #[serde(default)]
    pub stencil: Stencil,
    /// `dT/dp` per node; a one-sided difference towards the inside of the domain.
    pub first_order: Vec<f64>,
    /// `d²T/dp²` per node.
    pub second_order: Vec<f64>,
    /// Set when a perturbed run failed; the derivatives are then empty.
    pub error: Option<String>,
}

impl SensitivityEntry {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failed(param: &ParamRef, baseline_value: f64, step: f64, error: String) -> Self {
        warn!(%param, %error, "perturbed run failed");
        Self {
            param: param.clone(),
            baseline_value,
            step,
            stencil: Stencil::Central,
            first_order: Vec::new(),
            second_order: Vec::new(),
            error: Some(error),
        }
    }
}

/// Sensitivities of a baseline run to a set of parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensitivityModel {
    /// Fingerprint of the baseline the model was computed against.
    pub baseline_fingerprint: String,
    pub node_ids: Vec<String>,
    pub baseline_temperatures: Vec<f64>,
    pub entries: Vec<SensitivityEntry>,
}

impl SensitivityModel {
    pub fn entry(&self, param: &ParamRef) -> Option<&SensitivityEntry> {
        self.entries.iter().find(|e| &e.param == param)
    }

    pub fn failed(&self) -> impl Iterator<Item = &SensitivityEntry> {
        self.entries.iter().filter(|e| !e.is_ok())
    }

    /// `dT/dp` of one node, if the parameter succeeded.
    pub fn derivative(&self, param: &ParamRef, node_id: &str) -> Option<f64> {
        let node = self.node_ids.iter().position(|n| n == node_id)?;
        let entry = self.entry(param)?;
        entry.first_order.get(node).copied()
    }
}

fn perturbed_final(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    param: &ParamRef,
    delta: f64,
) -> Result<Vec<f64>, String> {
    let perturbed = param.with_delta(snapshot, delta).map_err(|e| e.to_string())?;
    let result = ot_engine::run(&perturbed, config).map_err(|e| e.to_string())?;
    Ok(result.final_temperatures())
}

fn evaluate_param(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    baseline: &[f64],
    param: &ParamRef,
    options: &SensitivityOptions,
) -> SensitivityEntry {
    let value = match param.get(snapshot) {
        Ok(v) => v,
        Err(e) => return SensitivityEntry::failed(param, f64::NAN, 0.0, e.to_string()),
    };
    let step = options.step_for(value);
    let Some(stencil) = Stencil::choose(param.domain(), value, step) else {
        let error = format!("perturbation {step} does not fit the domain of {param} at {value}");
        return SensitivityEntry::failed(param, value, step, error);
    };
    let (ka, kb) = stencil.offsets();
    let (a, b) = rayon::join(
        || perturbed_final(snapshot, config, param, ka * step),
        || perturbed_final(snapshot, config, param, kb * step),
    );
    let (a, b) = match (a, b) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => return SensitivityEntry::failed(param, value, step, e),
    };

    let (first_order, second_order) = baseline
        .iter()
        .zip(a.iter().zip(&b))
        .map(|(t0, (ta, tb))| stencil.derivatives(*t0, *ta, *tb, step))
        .unzip();
    SensitivityEntry {
        param: param.clone(),
        baseline_value: value,
        step,
        stencil,
        first_order,
        second_order,
        error: None,
    }
}

/// Run two perturbations of every parameter against a completed baseline.
///
/// Perturbations run on a bounded pool and stay inside each parameter's domain. A parameter whose perturbed run fails is
/// recorded as failed; the others are unaffected.
pub fn compute_sensitivities(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    baseline: &ResultSnapshot,
    fingerprint: &str,
    params: &[ParamRef],
    options: &SensitivityOptions,
) -> SensitivityResult<SensitivityModel> {
    options.validate()?;
    if !baseline.is_completed() {
        return Err(SensitivityError::NoBaseline);
    }
    let baseline_temperatures = baseline.final_temperatures();
    let pool = options.thread_pool()?;
    info!(params = params.len(), threads = pool.current_num_threads(), "sensitivity analysis started");

    let entries: Vec<SensitivityEntry> = pool.install(|| {
        params
            .par_iter()
            .map(|p| evaluate_param(snapshot, config, &baseline_temperatures, p, options))
            .collect()
    });

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    info!(params = entries.len(), failed, "sensitivity analysis finished");
    Ok(SensitivityModel {
        baseline_fingerprint: fingerprint.to_string(),
        node_ids: baseline.nodes.iter().map(|n| n.id.clone()).collect(),
        baseline_temperatures,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stencil_stays_inside_domain() {
        assert_eq!(Stencil::choose(ParamDomain::Fraction, 0.5, 0.005), Some(Stencil::Central));
        assert_eq!(Stencil::choose(ParamDomain::Fraction, 1.0, 0.01), Some(Stencil::Backward));
        assert_eq!(Stencil::choose(ParamDomain::NonNegative, 0.0, 1e-6), Some(Stencil::Forward));
        assert_eq!(Stencil::choose(ParamDomain::Positive, 1e-7, 1e-6), Some(Stencil::Forward));
        assert_eq!(Stencil::choose(ParamDomain::Fraction, 0.5, 0.6), None);
    }

    #[test]
    fn one_sided_stencils_recover_a_quadratic() {
        // T(p) = 3p² + 2p at p = 1: dT/dp = 8, d²T/dp² = 6.
        let t = |p: f64| 3.0 * p * p + 2.0 * p;
        let h = 0.01;
        for stencil in [Stencil::Central, Stencil::Forward, Stencil::Backward] {
            let (ka, kb) = stencil.offsets();
            let (d1, d2) = stencil.derivatives(t(1.0), t(1.0 + ka * h), t(1.0 + kb * h), h);
            assert_relative_eq!(d1, 8.0, epsilon = 0.05);
            assert_relative_eq!(d2, 6.0, epsilon = 1e-6);
        }
    }
}
