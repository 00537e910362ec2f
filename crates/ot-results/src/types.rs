//! Result data types.

use chrono::{DateTime, Utc};
use ot_network::SimulationKind;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// Temperature history of one node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSeries {
    pub id: String,
    pub name: String,
    /// s
    pub times: Vec<f64>,
    /// K
    pub temperatures: Vec<f64>,
}

/// From→to heat flow history of one conductor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConductorSeries {
    pub id: String,
    pub times: Vec<f64>,
    /// W
    pub flows: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RunStats {
    /// Newton iterations (steady) or accepted steps (transient).
    pub iterations: usize,
    #[serde(default)]
    pub rejected_steps: usize,
    #[serde(default)]
    pub rhs_evaluations: usize,
    pub wall_time_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Everything a run produced, in the shape handed back to the caller.
///
/// A failed run keeps whatever was recorded before the failure alongside `error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSnapshot {
    pub run_id: RunId,
    pub status: RunStatus,
    pub kind: SimulationKind,
    pub nodes: Vec<NodeSeries>,
    pub conductors: Vec<ConductorSeries>,
    /// Fraction, `|ΣQ_in − ΣQ_out − ΔU/Δt| / ΣQ_in`.
    pub energy_balance_error: Option<f64>,
    pub error: Option<String>,
    pub stats: RunStats,
}

impl ResultSnapshot {
    pub fn pending(run_id: RunId, kind: SimulationKind) -> Self {
        Self {
            run_id,
            status: RunStatus::Pending,
            kind,
            nodes: Vec::new(),
            conductors: Vec::new(),
            energy_balance_error: None,
            error: None,
            stats: RunStats::default(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeSeries> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn conductor(&self, id: &str) -> Option<&ConductorSeries> {
        self.conductors.iter().find(|c| c.id == id)
    }

    pub fn final_temperature(&self, id: &str) -> Option<f64> {
        self.node(id).and_then(|n| n.temperatures.last().copied())
    }

    /// Last recorded temperature of every node, in node order.
    pub fn final_temperatures(&self) -> Vec<f64> {
        self.nodes
            .iter()
            .map(|n| n.temperatures.last().copied().unwrap_or(f64::NAN))
            .collect()
    }

    /// Highest temperature each node reached.
    pub fn max_temperatures(&self) -> Vec<f64> {
        self.nodes
            .iter()
            .map(|n| n.temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
