//! Content-based hashing for run IDs.

use ot_network::{NetworkSnapshot, SimulationConfig};
use sha2::{Digest, Sha256};

/// SHA-256 over the serialized inputs of a run.
///
/// Identical inputs always map to the same id, so a run id identifies its result.
pub fn compute_run_id(
    snapshot: &NetworkSnapshot,
    config: &SimulationConfig,
    engine_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let snapshot_json = serde_json::to_string(snapshot).unwrap_or_default();
    hasher.update(snapshot_json.as_bytes());

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ot_network::NetworkBuilder;

    fn snapshot(t: f64) -> NetworkSnapshot {
        NetworkBuilder::new()
            .diffusion("a", t, 10.0)
            .boundary("b", 200.0)
            .linear("ab", "a", "b", 1.0)
            .snapshot()
    }

    #[test]
    fn hash_stability() {
        let config = SimulationConfig::default();
        let hash1 = compute_run_id(&snapshot(300.0), &config, "v1");
        let hash2 = compute_run_id(&snapshot(300.0), &config, "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let config = SimulationConfig::default();
        let base = compute_run_id(&snapshot(300.0), &config, "v1");
        assert_ne!(base, compute_run_id(&snapshot(301.0), &config, "v1"));
        assert_ne!(base, compute_run_id(&snapshot(300.0), &SimulationConfig::steady(10, 1e-3), "v1"));
        assert_ne!(base, compute_run_id(&snapshot(300.0), &config, "v2"));
    }
}
