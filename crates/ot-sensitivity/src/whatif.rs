//! What-if reconstruction from a sensitivity model.

use ot_network::ParamRef;
use serde::{Deserialize, Serialize};

use crate::error::{SensitivityError, SensitivityResult};
use crate::model::SensitivityModel;

/// Terms below this (K) are treated as solver noise when judging nonlinearity.
const NEGLIGIBLE_K: f64 = 1e-6;

/// Trust in a linear extrapolation, ordered from best to worst.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Classify by curvature ratio and relative size of the change.
    pub fn classify(ratio: f64, relative_change: f64) -> Self {
        if ratio > 0.2 || relative_change > 0.3 {
            Confidence::Low
        } else if ratio > 0.1 || relative_change > 0.1 {
            Confidence::Medium
        } else {
            Confidence::High
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamConfidence {
    pub param: ParamRef,
    pub delta: f64,
    /// `max_nodes |½·d²T/dp²·Δp²| / |dT/dp·Δp|`
    pub ratio: f64,
    /// `|Δp| / |p₀|`
    pub relative_change: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhatIf {
    /// Reconstructed final temperature per node (K).
    pub temperatures: Vec<f64>,
    /// One entry per non-zero delta.
    pub confidence: Vec<ParamConfidence>,
    pub overall: Confidence,
}

impl SensitivityModel {
    /// `T = T₀ + Σ dT/dp_i · Δp_i` for the given parameter deltas.
    ///
    /// Zero deltas contribute nothing, so an all-zero request returns the baseline
    /// exactly.
    pub fn reconstruct(&self, deltas: &[(ParamRef, f64)]) -> SensitivityResult<WhatIf> {
        let mut temperatures = self.baseline_temperatures.clone();
        let mut confidence = Vec::new();

        for (param, delta) in deltas {
            let entry = self
                .entry(param)
                .ok_or_else(|| SensitivityError::UnknownParameter {
                    param: param.clone(),
                })?;
            if let Some(error) = &entry.error {
                return Err(SensitivityError::FailedParameter {
                    param: param.clone(),
                    error: error.clone(),
                });
            }
            if *delta == 0.0 {
                continue;
            }

            let mut ratio: f64 = 0.0;
            for ((t, d1), d2) in temperatures
                .iter_mut()
                .zip(&entry.first_order)
                .zip(&entry.second_order)
            {
                *t += d1 * delta;
                let linear = (d1 * delta).abs();
                let curvature = (0.5 * d2 * delta * delta).abs();
                if linear < NEGLIGIBLE_K && curvature < NEGLIGIBLE_K {
                    continue;
                }
                ratio = ratio.max(if linear > 0.0 {
                    curvature / linear
                } else {
                    f64::INFINITY
                });
            }

            let relative_change = if entry.baseline_value != 0.0 {
                (delta / entry.baseline_value).abs()
            } else {
                f64::INFINITY
            };
            confidence.push(ParamConfidence {
                param: param.clone(),
                delta: *delta,
                ratio,
                relative_change,
                confidence: Confidence::classify(ratio, relative_change),
            });
        }

        let overall = confidence
            .iter()
            .map(|c| c.confidence)
            .max()
            .unwrap_or(Confidence::High);
        Ok(WhatIf {
            temperatures,
            confidence,
            overall,
        })
    }
}
