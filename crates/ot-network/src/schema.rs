//! Snapshot schema definitions.
//!
//! Field shapes mirror what the surrounding product stores: every entity carries a
//! `kind` plus the optional fields some kinds require. [`crate::validate_snapshot`]
//! enforces that exactly the fields a kind needs are present.

use chrono::{DateTime, Utc};
use ot_core::interp_flat;
use serde::{Deserialize, Serialize};

fn default_temperature() -> f64 {
    293.15
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Diffusion,
    Arithmetic,
    Boundary,
}

/// Boundary temperature: a constant or a piecewise-linear schedule `(time_s, T_K)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BoundaryTemp {
    Fixed(f64),
    Schedule(Vec<(f64, f64)>),
}

impl BoundaryTemp {
    /// Temperature at time `t` (flat outside a schedule's range).
    pub fn at(&self, t: f64) -> f64 {
        match self {
            BoundaryTemp::Fixed(v) => *v,
            BoundaryTemp::Schedule(points) => interp_flat(points, t).unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: NodeKind,
    /// Initial temperature (K); the starting guess for arithmetic nodes.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Thermal capacitance (J/K).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_temp: Option<BoundaryTemp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorptivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
}

impl Node {
    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConductorKind {
    Linear,
    Radiation,
    Contact,
    HeatPipe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conductor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: ConductorKind,
    pub from: String,
    pub to: String,
    /// W/K (linear, contact).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductance: Option<f64>,
    /// m² (radiation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissivity: Option<f64>,
    /// `(temperature_K, conductance_W_per_K)` table (heat_pipe).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductance_data: Option<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HeatLoadKind {
    Constant,
    TimeVarying,
    Orbital,
}

/// Orientation of an externally exposed surface in the orbit frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    /// Faces the Earth centre.
    Nadir,
    /// Faces away from the Earth.
    Zenith,
    /// Tracks the sun.
    Sun,
    /// Faces the velocity vector.
    Ram,
    /// Faces against the velocity vector.
    Wake,
    /// Faces along the positive orbit normal.
    North,
    /// Faces along the negative orbit normal.
    South,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitalLoadParams {
    pub surface_type: SurfaceType,
    pub absorptivity: f64,
    pub emissivity: f64,
    /// m²
    pub area: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatLoad {
    pub id: String,
    pub node_id: String,
    pub kind: HeatLoadKind,
    /// W (constant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// `(time_s, W)` schedule (time_varying).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_values: Option<Vec<(f64, f64)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbital_params: Option<OrbitalLoadParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// kg/m³
    pub density: f64,
    /// J/(kg·K)
    pub specific_heat: f64,
    /// W/(m·K)
    pub conductivity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorptivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissivity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitalConfig {
    /// km above the equatorial radius.
    pub altitude: f64,
    /// degrees
    pub inclination: f64,
    /// degrees
    pub raan: f64,
    pub epoch: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    #[default]
    Transient,
    Steady,
}

fn default_wall_clock_limit() -> f64 {
    300.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub kind: SimulationKind,
    pub time_start: f64,
    pub time_end: f64,
    pub time_step: f64,
    pub min_step: f64,
    pub max_step: f64,
    pub output_interval: f64,
    pub max_iterations: usize,
    /// K
    pub tolerance: f64,
    #[serde(default = "default_wall_clock_limit")]
    pub wall_clock_limit_s: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            kind: SimulationKind::Transient,
            time_start: 0.0,
            time_end: 3600.0,
            time_step: 10.0,
            min_step: 1e-3,
            max_step: 600.0,
            output_interval: 60.0,
            max_iterations: 1000,
            tolerance: 0.01,
            wall_clock_limit_s: default_wall_clock_limit(),
        }
    }
}

impl SimulationConfig {
    /// Steady-state configuration with the given iteration budget and tolerance.
    pub fn steady(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            kind: SimulationKind::Steady,
            max_iterations,
            tolerance,
            ..Self::default()
        }
    }

    /// Transient configuration over `[0, time_end]`.
    pub fn transient(time_end: f64, time_step: f64, output_interval: f64) -> Self {
        Self {
            kind: SimulationKind::Transient,
            time_end,
            time_step,
            max_step: time_step.max(output_interval),
            output_interval,
            ..Self::default()
        }
    }
}

/// Immutable input of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub conductors: Vec<Conductor>,
    #[serde(default)]
    pub heat_loads: Vec<HeatLoad>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<OrbitalConfig>,
}

impl NetworkSnapshot {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn conductor(&self, id: &str) -> Option<&Conductor> {
        self.conductors.iter().find(|c| c.id == id)
    }

    pub fn heat_load(&self, id: &str) -> Option<&HeatLoad> {
        self.heat_loads.iter().find(|l| l.id == id)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    fn node_material(&self, node: &Node) -> Option<&Material> {
        node.material_id.as_deref().and_then(|id| self.material(id))
    }

    /// Capacitance of a node, derived from `mass · specific_heat` when not given.
    pub fn effective_capacitance(&self, node: &Node) -> Option<f64> {
        node.capacitance.or_else(|| {
            let mass = node.mass?;
            let material = self.node_material(node)?;
            Some(mass * material.specific_heat)
        })
    }

    /// Emissivity of a node, falling back to its material.
    pub fn effective_emissivity(&self, node: &Node) -> Option<f64> {
        node.emissivity
            .or_else(|| self.node_material(node).and_then(|m| m.emissivity))
    }

    /// Absorptivity of a node, falling back to its material.
    pub fn effective_absorptivity(&self, node: &Node) -> Option<f64> {
        node.absorptivity
            .or_else(|| self.node_material(node).and_then(|m| m.absorptivity))
    }
}

/// A network plus the configuration to run it with, as stored in a case file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    #[serde(default)]
    pub name: String,
    pub network: NetworkSnapshot,
    #[serde(default)]
    pub simulation: SimulationConfig,
}
