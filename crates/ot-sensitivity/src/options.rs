use serde::{Deserialize, Serialize};

use crate::error::{SensitivityError, SensitivityResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensitivityOptions {
    /// Perturbation as a fraction of the parameter value.
    pub relative_step: f64,
    /// Smallest absolute perturbation, used for parameters at or near zero.
    pub min_step: f64,
    /// Worker threads; `None` uses the available parallelism.
    pub max_threads: Option<usize>,
}

impl Default for SensitivityOptions {
    fn default() -> Self {
        Self {
            relative_step: 0.01,
            min_step: 1e-6,
            max_threads: None,
        }
    }
}

impl SensitivityOptions {
    pub fn validate(&self) -> SensitivityResult<()> {
        if !(self.relative_step.is_finite() && self.relative_step > 0.0) {
            return Err(SensitivityError::InvalidOptions {
                what: "relative_step must be finite and positive",
            });
        }
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(SensitivityError::InvalidOptions {
                what: "min_step must be finite and positive",
            });
        }
        if self.max_threads == Some(0) {
            return Err(SensitivityError::InvalidOptions {
                what: "max_threads must be positive",
            });
        }
        Ok(())
    }

    /// `Δp = max(|p|·relative_step, min_step)`
    pub fn step_for(&self, value: f64) -> f64 {
        (value.abs() * self.relative_step).max(self.min_step)
    }

    pub(crate) fn thread_pool(&self) -> SensitivityResult<rayon::ThreadPool> {
        let threads = self.max_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SensitivityError::Pool(e.to_string()))
    }
}
