//! Incremental snapshot builder.

use crate::NetworkResult;
use crate::schema::{
    BoundaryTemp, Conductor, ConductorKind, HeatLoad, HeatLoadKind, Material, NetworkSnapshot,
    Node, NodeKind, OrbitalConfig, OrbitalLoadParams, SurfaceType,
};
use crate::validate::validate_snapshot;

/// Builder for assembling a snapshot in code.
///
/// Chain the `add` style methods, then call `build()` to validate and freeze the
/// result into a `NetworkSnapshot`. `snapshot()` skips validation, which is handy
/// when a test wants to construct a deliberately broken network.
#[derive(Debug, Default, Clone)]
pub struct NetworkBuilder {
    snapshot: NetworkSnapshot,
}

fn bare_node(id: &str, kind: NodeKind, temperature: f64) -> Node {
    Node {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        temperature,
        capacitance: None,
        boundary_temp: None,
        area: None,
        mass: None,
        absorptivity: None,
        emissivity: None,
        material_id: None,
    }
}

fn bare_conductor(id: &str, kind: ConductorKind, from: &str, to: &str) -> Conductor {
    Conductor {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        from: from.to_string(),
        to: to.to_string(),
        conductance: None,
        area: None,
        view_factor: None,
        emissivity: None,
        conductance_data: None,
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.snapshot.nodes.push(node);
        self
    }

    pub fn diffusion(self, id: &str, temperature: f64, capacitance: f64) -> Self {
        let mut node = bare_node(id, NodeKind::Diffusion, temperature);
        node.capacitance = Some(capacitance);
        self.node(node)
    }

    pub fn arithmetic(self, id: &str, temperature: f64) -> Self {
        self.node(bare_node(id, NodeKind::Arithmetic, temperature))
    }

    pub fn boundary(self, id: &str, temperature: f64) -> Self {
        let mut node = bare_node(id, NodeKind::Boundary, temperature);
        node.boundary_temp = Some(BoundaryTemp::Fixed(temperature));
        self.node(node)
    }

    pub fn boundary_schedule(self, id: &str, schedule: Vec<(f64, f64)>) -> Self {
        let t0 = schedule.first().map_or(0.0, |p| p.1);
        let mut node = bare_node(id, NodeKind::Boundary, t0);
        node.boundary_temp = Some(BoundaryTemp::Schedule(schedule));
        self.node(node)
    }

    pub fn conductor(mut self, conductor: Conductor) -> Self {
        self.snapshot.conductors.push(conductor);
        self
    }

    pub fn linear(self, id: &str, from: &str, to: &str, conductance: f64) -> Self {
        let mut c = bare_conductor(id, ConductorKind::Linear, from, to);
        c.conductance = Some(conductance);
        self.conductor(c)
    }

    pub fn contact(self, id: &str, from: &str, to: &str, conductance: f64) -> Self {
        let mut c = bare_conductor(id, ConductorKind::Contact, from, to);
        c.conductance = Some(conductance);
        self.conductor(c)
    }

    pub fn radiation(
        self,
        id: &str,
        from: &str,
        to: &str,
        area: f64,
        view_factor: f64,
        emissivity: f64,
    ) -> Self {
        let mut c = bare_conductor(id, ConductorKind::Radiation, from, to);
        c.area = Some(area);
        c.view_factor = Some(view_factor);
        c.emissivity = Some(emissivity);
        self.conductor(c)
    }

    pub fn heat_pipe(self, id: &str, from: &str, to: &str, data: Vec<(f64, f64)>) -> Self {
        let mut c = bare_conductor(id, ConductorKind::HeatPipe, from, to);
        c.conductance_data = Some(data);
        self.conductor(c)
    }

    pub fn heat_load(mut self, load: HeatLoad) -> Self {
        self.snapshot.heat_loads.push(load);
        self
    }

    pub fn constant_load(self, id: &str, node_id: &str, watts: f64) -> Self {
        self.heat_load(HeatLoad {
            id: id.to_string(),
            node_id: node_id.to_string(),
            kind: HeatLoadKind::Constant,
            value: Some(watts),
            time_values: None,
            orbital_params: None,
        })
    }

    pub fn time_varying_load(self, id: &str, node_id: &str, schedule: Vec<(f64, f64)>) -> Self {
        self.heat_load(HeatLoad {
            id: id.to_string(),
            node_id: node_id.to_string(),
            kind: HeatLoadKind::TimeVarying,
            value: None,
            time_values: Some(schedule),
            orbital_params: None,
        })
    }

    pub fn orbital_load(
        self,
        id: &str,
        node_id: &str,
        surface_type: SurfaceType,
        absorptivity: f64,
        emissivity: f64,
        area: f64,
    ) -> Self {
        self.heat_load(HeatLoad {
            id: id.to_string(),
            node_id: node_id.to_string(),
            kind: HeatLoadKind::Orbital,
            value: None,
            time_values: None,
            orbital_params: Some(OrbitalLoadParams {
                surface_type,
                absorptivity,
                emissivity,
                area,
            }),
        })
    }

    pub fn material(mut self, material: Material) -> Self {
        self.snapshot.materials.push(material);
        self
    }

    pub fn orbit(mut self, orbit: OrbitalConfig) -> Self {
        self.snapshot.orbit = Some(orbit);
        self
    }

    /// Return the snapshot without validating it.
    pub fn snapshot(self) -> NetworkSnapshot {
        self.snapshot
    }

    /// Validate and return the snapshot.
    pub fn build(self) -> NetworkResult<NetworkSnapshot> {
        validate_snapshot(&self.snapshot)?;
        Ok(self.snapshot)
    }
}
