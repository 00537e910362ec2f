//! Temperature constraints on explored designs.

use ot_network::{NetworkSnapshot, NodeKind};
use serde::{Deserialize, Serialize};

use crate::error::{ExploreError, ExploreResult};

/// Allowed temperature band (K). Without `node` it applies to every non-boundary node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemperatureLimit {
    pub node: Option<String>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
}

impl TemperatureLimit {
    pub fn max(limit: f64) -> Self {
        Self {
            max_temperature: Some(limit),
            ..Self::default()
        }
    }

    pub fn min(limit: f64) -> Self {
        Self {
            min_temperature: Some(limit),
            ..Self::default()
        }
    }

    pub fn for_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub(crate) fn validate(&self, snapshot: &NetworkSnapshot) -> ExploreResult<()> {
        if let Some(id) = &self.node
            && snapshot.node(id).is_none()
        {
            return Err(ExploreError::UnknownNode { id: id.clone() });
        }
        Ok(())
    }
}

/// Temperature extremes of one evaluated design, in node order.
pub(crate) struct Extremes<'a> {
    pub node_ids: &'a [String],
    pub constrained: &'a [bool],
    pub max: &'a [f64],
    pub min: &'a [f64],
}

impl Extremes<'_> {
    /// Human-readable description of every violated limit.
    pub fn violations(&self, limits: &[TemperatureLimit]) -> Vec<String> {
        let mut out = Vec::new();
        for limit in limits {
            for (i, id) in self.node_ids.iter().enumerate() {
                let applies = match &limit.node {
                    Some(node) => node == id,
                    None => self.constrained[i],
                };
                if !applies {
                    continue;
                }
                if let Some(max) = limit.max_temperature
                    && self.max[i] > max
                {
                    out.push(format!("{id}: {:.3} K above {max} K", self.max[i]));
                }
                if let Some(min) = limit.min_temperature
                    && self.min[i] < min
                {
                    out.push(format!("{id}: {:.3} K below {min} K", self.min[i]));
                }
            }
        }
        out
    }
}

/// Nodes subject to global limits: everything except boundary nodes.
pub(crate) fn constrained_nodes(snapshot: &NetworkSnapshot) -> Vec<bool> {
    snapshot
        .nodes
        .iter()
        .map(|n| n.kind != NodeKind::Boundary)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_limits_skip_boundary_nodes() {
        let ids = vec!["a".to_string(), "space".to_string()];
        let extremes = Extremes {
            node_ids: &ids,
            constrained: &[true, false],
            max: &[320.0, 3.0],
            min: &[280.0, 3.0],
        };
        assert!(extremes.violations(&[TemperatureLimit::min(100.0)]).is_empty());
        assert_eq!(extremes.violations(&[TemperatureLimit::max(300.0)]).len(), 1);
        // An explicit node limit applies even to a boundary node.
        let v = extremes.violations(&[TemperatureLimit::min(100.0).for_node("space")]);
        assert_eq!(v, ["space: 3.000 K below 100 K"]);
    }
}
