//! Heat-load evaluation.

use ot_core::{NodeIdx, interp_flat};
use ot_network::{HeatLoadKind, NetworkIndex, NetworkSnapshot, OrbitalLoadParams};
use ot_orbit::{OrbitEnvironment, absorbed_power, orbit_average_power};
use tracing::debug;

use crate::error::{ConductanceError, ConductanceResult};

#[derive(Debug, Clone)]
pub enum LoadModel {
    /// W
    Constant(f64),
    /// `(time_s, W)`, flat outside the schedule.
    Schedule(Vec<(f64, f64)>),
    /// Absorbed environment flux; `average` is the orbit-average power (W).
    Orbital {
        params: OrbitalLoadParams,
        average: f64,
    },
}

#[derive(Debug, Clone)]
pub struct CompiledLoad {
    pub id: String,
    pub node: NodeIdx,
    pub model: LoadModel,
}

/// All heat loads of a network, ready for evaluation at any time.
#[derive(Debug, Clone, Default)]
pub struct LoadSet {
    loads: Vec<CompiledLoad>,
    env: Option<OrbitEnvironment>,
}

impl LoadSet {
    pub fn compile(snapshot: &NetworkSnapshot, index: &NetworkIndex) -> ConductanceResult<Self> {
        let env = match &snapshot.orbit {
            Some(orbit) => Some(OrbitEnvironment::new(orbit)?),
            None => None,
        };

        let missing = |id: &str, field: &'static str| ConductanceError::MissingField {
            context: "heat load",
            id: id.to_string(),
            field,
        };

        let mut loads = Vec::with_capacity(snapshot.heat_loads.len());
        for (load, &node) in snapshot.heat_loads.iter().zip(index.load_nodes()) {
            let model = match load.kind {
                HeatLoadKind::Constant => {
                    LoadModel::Constant(load.value.ok_or_else(|| missing(&load.id, "value"))?)
                }
                HeatLoadKind::TimeVarying => LoadModel::Schedule(
                    load.time_values
                        .clone()
                        .ok_or_else(|| missing(&load.id, "time_values"))?,
                ),
                HeatLoadKind::Orbital => {
                    let params = load
                        .orbital_params
                        .clone()
                        .ok_or_else(|| missing(&load.id, "orbital_params"))?;
                    let env = env.as_ref().ok_or_else(|| ConductanceError::MissingOrbit {
                        id: load.id.clone(),
                    })?;
                    let average = orbit_average_power(env, &params);
                    debug!(load = %load.id, average_w = average, "orbital load compiled");
                    LoadModel::Orbital { params, average }
                }
            };
            loads.push(CompiledLoad {
                id: load.id.clone(),
                node,
                model,
            });
        }
        Ok(Self { loads, env })
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    pub fn loads(&self) -> &[CompiledLoad] {
        &self.loads
    }

    pub fn environment(&self) -> Option<&OrbitEnvironment> {
        self.env.as_ref()
    }

    /// Power of every load at time `t`, in load order.
    pub fn powers_at(&self, t: f64, out: &mut Vec<f64>) {
        out.clear();
        // One environment sample serves every orbital load.
        let sample = self.env.as_ref().map(|env| env.sample_at(t));
        for load in &self.loads {
            let q = match &load.model {
                LoadModel::Constant(v) => *v,
                LoadModel::Schedule(points) => interp_flat(points, t).unwrap_or(0.0),
                LoadModel::Orbital { params, average } => match &sample {
                    Some(s) => absorbed_power(params, s),
                    None => *average,
                },
            };
            out.push(q);
        }
    }

    /// Add load power at time `t` into per-node buckets.
    pub fn accumulate_at(&self, t: f64, scratch: &mut Vec<f64>, node_q: &mut [f64]) {
        self.powers_at(t, scratch);
        for (load, q) in self.loads.iter().zip(scratch.iter()) {
            node_q[load.node.index()] += q;
        }
    }

    /// Add steady-state load power into per-node buckets: loads at `t`, orbital loads
    /// at their orbit average.
    pub fn accumulate_steady(&self, t: f64, scratch: &mut Vec<f64>, node_q: &mut [f64]) {
        self.powers_at(t, scratch);
        for (load, q) in self.loads.iter().zip(scratch.iter()) {
            let q = match &load.model {
                LoadModel::Orbital { average, .. } => *average,
                _ => *q,
            };
            node_q[load.node.index()] += q;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ot_network::{NetworkBuilder, OrbitalConfig, SurfaceType};

    fn snapshot() -> NetworkSnapshot {
        NetworkBuilder::new()
            .diffusion("a", 290.0, 10.0)
            .diffusion("b", 290.0, 10.0)
            .linear("g", "a", "b", 1.0)
            .constant_load("q1", "a", 5.0)
            .time_varying_load("q2", "b", vec![(0.0, 0.0), (100.0, 50.0)])
            .constant_load("q3", "b", 1.0)
            .snapshot()
    }

    #[test]
    fn evaluates_constant_and_schedule() {
        let snap = snapshot();
        let index = NetworkIndex::from_snapshot(&snap).unwrap();
        let set = LoadSet::compile(&snap, &index).unwrap();
        assert_eq!(set.len(), 3);

        let mut scratch = Vec::new();
        let mut node_q = vec![0.0; 2];
        set.accumulate_at(50.0, &mut scratch, &mut node_q);
        assert_eq!(node_q, vec![5.0, 26.0]);

        node_q.fill(0.0);
        set.accumulate_at(500.0, &mut scratch, &mut node_q);
        assert_eq!(node_q, vec![5.0, 51.0]);
    }

    #[test]
    fn orbital_load_needs_orbit() {
        let snap = NetworkBuilder::from_snapshot(snapshot())
            .orbital_load("sun", "a", SurfaceType::Zenith, 0.3, 0.8, 1.0)
            .snapshot();
        let index = NetworkIndex::from_snapshot(&snap).unwrap();
        assert!(matches!(
            LoadSet::compile(&snap, &index),
            Err(ConductanceError::MissingOrbit { .. })
        ));
    }

    #[test]
    fn steady_uses_orbit_average() {
        let snap = NetworkBuilder::from_snapshot(snapshot())
            .orbital_load("sun", "a", SurfaceType::Zenith, 0.3, 0.8, 1.0)
            .orbit(OrbitalConfig {
                altitude: 500.0,
                inclination: 28.5,
                raan: 40.0,
                epoch: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            })
            .snapshot();
        let index = NetworkIndex::from_snapshot(&snap).unwrap();
        let set = LoadSet::compile(&snap, &index).unwrap();
        let LoadModel::Orbital { average, .. } = &set.loads()[3].model else {
            panic!("expected orbital load");
        };

        let mut scratch = Vec::new();
        let mut node_q = vec![0.0; 2];
        set.accumulate_steady(0.0, &mut scratch, &mut node_q);
        assert_eq!(node_q[0], 5.0 + *average);
        assert!(*average > 0.0);
    }
}
