//! Writing estimated view factors into a network snapshot.

use ot_network::{ConductorKind, NetworkSnapshot};
use tracing::debug;

use crate::error::{ViewFactorError, ViewFactorResult};
use crate::estimate::ViewFactorEstimate;

/// Copy of `snapshot` with every radiation conductor between the nodes of an
/// estimate set to the estimated factor.
///
/// A conductor running `to_node → from_node` receives the reciprocal factor. Every
/// estimate must match at least one radiation conductor.
pub fn apply_view_factors(
    snapshot: &NetworkSnapshot,
    estimates: &[ViewFactorEstimate],
) -> ViewFactorResult<NetworkSnapshot> {
    let mut out = snapshot.clone();
    for est in estimates {
        let mut matched = false;
        for c in out
            .conductors
            .iter_mut()
            .filter(|c| c.kind == ConductorKind::Radiation)
        {
            let f = if c.from == est.from_node && c.to == est.to_node {
                est.view_factor
            } else if c.from == est.to_node && c.to == est.from_node {
                est.reciprocal()
            } else {
                continue;
            };
            c.view_factor = Some(f.clamp(0.0, 1.0));
            matched = true;
            debug!(conductor = %c.id, view_factor = f, "view factor applied");
        }
        if !matched {
            return Err(ViewFactorError::NoRadiationConductor {
                from: est.from_node.clone(),
                to: est.to_node.clone(),
            });
        }
    }
    Ok(out)
}
