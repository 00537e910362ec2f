//! The baseline a sensitivity model is tied to.

use ot_engine::ENGINE_VERSION;
use ot_network::{NetworkSnapshot, ParamRef, SimulationConfig};
use ot_results::{ResultSnapshot, compute_run_id};
use tracing::info;

use crate::error::{SensitivityError, SensitivityResult};
use crate::model::{SensitivityModel, compute_sensitivities};
use crate::options::SensitivityOptions;
use crate::whatif::WhatIf;

/// The network and configuration sensitivities are measured against.
///
/// Replacing the snapshot or the configuration drops the stored result and changes
/// the fingerprint, so models computed earlier are refused by [`Self::what_if`].
#[derive(Debug, Clone)]
pub struct CurrentBaseline {
    snapshot: NetworkSnapshot,
    config: SimulationConfig,
    fingerprint: String,
    result: Option<ResultSnapshot>,
}

impl CurrentBaseline {
    pub fn new(snapshot: NetworkSnapshot, config: SimulationConfig) -> Self {
        let fingerprint = compute_run_id(&snapshot, &config, ENGINE_VERSION);
        Self {
            snapshot,
            config,
            fingerprint,
            result: None,
        }
    }

    pub fn snapshot(&self) -> &NetworkSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn result(&self) -> Option<&ResultSnapshot> {
        self.result.as_ref()
    }

    /// Run the baseline if it has no result yet.
    pub fn compute(&mut self) -> SensitivityResult<&ResultSnapshot> {
        if self.result.is_none() {
            info!(fingerprint = %self.fingerprint, "computing baseline");
            self.result = Some(ot_engine::run(&self.snapshot, &self.config)?);
        }
        self.result.as_ref().ok_or(SensitivityError::NoBaseline)
    }

    pub fn replace_snapshot(&mut self, snapshot: NetworkSnapshot) {
        *self = Self::new(snapshot, self.config.clone());
    }

    pub fn replace_config(&mut self, config: SimulationConfig) {
        *self = Self::new(self.snapshot.clone(), config);
    }

    /// Sensitivities of the baseline to `params`. Requires [`Self::compute`] first.
    pub fn analyze(
        &self,
        params: &[ParamRef],
        options: &SensitivityOptions,
    ) -> SensitivityResult<SensitivityModel> {
        let result = self.result.as_ref().ok_or(SensitivityError::NoBaseline)?;
        compute_sensitivities(
            &self.snapshot,
            &self.config,
            result,
            &self.fingerprint,
            params,
            options,
        )
    }

    /// Reconstruct temperatures for `deltas`, refusing models of another baseline.
    pub fn what_if(
        &self,
        model: &SensitivityModel,
        deltas: &[(ParamRef, f64)],
    ) -> SensitivityResult<WhatIf> {
        if model.baseline_fingerprint != self.fingerprint {
            return Err(SensitivityError::StaleBaseline {
                expected: self.fingerprint.clone(),
                found: model.baseline_fingerprint.clone(),
            });
        }
        model.reconstruct(deltas)
    }
}
