//! Structural validation, run before a snapshot can enter integration.

use std::collections::{HashMap, HashSet};

use ot_core::strictly_increasing;

use crate::schema::{
    Conductor, ConductorKind, HeatLoad, HeatLoadKind, NetworkSnapshot, Node, NodeKind,
    SimulationConfig,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Conductor {id} connects node {node} to itself")]
    SelfLoop { id: String, node: String },

    #[error("{context} '{id}' is missing required field '{field}'")]
    MissingField {
        context: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("{context} '{id}' carries field '{field}' not used by its kind")]
    UnexpectedField {
        context: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Arithmetic node {id} has no conductors")]
    IsolatedArithmetic { id: String },

    #[error("Orbital heat load {id} requires an orbit definition")]
    MissingOrbit { id: String },

    #[error("Network has no nodes")]
    Empty,
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_fraction(field: String, v: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&v) {
        return Err(invalid(field, v, "must lie in [0, 1]"));
    }
    Ok(())
}

fn check_positive(field: String, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(invalid(field, v, "must be finite and > 0"));
    }
    Ok(())
}

fn check_schedule(field: String, points: &[(f64, f64)]) -> Result<(), ValidationError> {
    if points.len() < 2 {
        return Err(invalid(field, points.len(), "needs at least 2 points"));
    }
    if !strictly_increasing(points) {
        return Err(invalid(field, "table", "abscissae must be strictly increasing"));
    }
    if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(invalid(field, "table", "entries must be finite"));
    }
    Ok(())
}

/// Validate the whole snapshot. Returns the first violation found.
pub fn validate_snapshot(snapshot: &NetworkSnapshot) -> Result<(), ValidationError> {
    if snapshot.nodes.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut material_ids = HashSet::new();
    for material in &snapshot.materials {
        if !material_ids.insert(material.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: material.id.clone(),
                context: "materials".to_string(),
            });
        }
        check_positive(format!("material {} specific_heat", material.id), material.specific_heat)?;
        check_positive(format!("material {} density", material.id), material.density)?;
        if let Some(a) = material.absorptivity {
            check_fraction(format!("material {} absorptivity", material.id), a)?;
        }
        if let Some(e) = material.emissivity {
            check_fraction(format!("material {} emissivity", material.id), e)?;
        }
    }

    let mut node_kinds = HashMap::new();
    for node in &snapshot.nodes {
        if node_kinds.insert(node.id.as_str(), node.kind).is_some() {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
        validate_node(node, snapshot, &material_ids)?;
    }

    let mut conductor_ids = HashSet::new();
    let mut connected = HashSet::new();
    for conductor in &snapshot.conductors {
        if !conductor_ids.insert(conductor.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: conductor.id.clone(),
                context: "conductors".to_string(),
            });
        }
        validate_conductor(conductor, &node_kinds)?;
        connected.insert(conductor.from.as_str());
        connected.insert(conductor.to.as_str());
    }

    for node in &snapshot.nodes {
        if node.kind == NodeKind::Arithmetic && !connected.contains(node.id.as_str()) {
            return Err(ValidationError::IsolatedArithmetic {
                id: node.id.clone(),
            });
        }
    }

    let mut load_ids = HashSet::new();
    for load in &snapshot.heat_loads {
        if !load_ids.insert(load.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: load.id.clone(),
                context: "heat_loads".to_string(),
            });
        }
        validate_heat_load(load, snapshot, &node_kinds)?;
    }

    Ok(())
}

fn validate_node(
    node: &Node,
    snapshot: &NetworkSnapshot,
    material_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    const CTX: &str = "Node";
    if let Some(mid) = &node.material_id
        && !material_ids.contains(mid.as_str())
    {
        return Err(ValidationError::MissingReference {
            id: mid.clone(),
            context: format!("node '{}' material_id", node.id),
        });
    }
    if !node.temperature.is_finite() || node.temperature < 0.0 {
        return Err(invalid(
            format!("node {} temperature", node.id),
            node.temperature,
            "must be a finite absolute temperature",
        ));
    }
    for (field, value) in [("absorptivity", node.absorptivity), ("emissivity", node.emissivity)] {
        if let Some(v) = value {
            check_fraction(format!("node {} {field}", node.id), v)?;
        }
    }
    if let Some(area) = node.area {
        check_positive(format!("node {} area", node.id), area)?;
    }
    if let Some(mass) = node.mass {
        check_positive(format!("node {} mass", node.id), mass)?;
    }

    match node.kind {
        NodeKind::Diffusion => {
            let c = snapshot
                .effective_capacitance(node)
                .ok_or_else(|| ValidationError::MissingField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "capacitance",
                })?;
            check_positive(format!("node {} capacitance", node.id), c)?;
            if node.boundary_temp.is_some() {
                return Err(ValidationError::UnexpectedField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "boundary_temp",
                });
            }
        }
        NodeKind::Arithmetic => {
            if node.capacitance.is_some() {
                return Err(ValidationError::UnexpectedField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "capacitance",
                });
            }
            if node.boundary_temp.is_some() {
                return Err(ValidationError::UnexpectedField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "boundary_temp",
                });
            }
        }
        NodeKind::Boundary => {
            let bt = node
                .boundary_temp
                .as_ref()
                .ok_or_else(|| ValidationError::MissingField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "boundary_temp",
                })?;
            match bt {
                crate::schema::BoundaryTemp::Fixed(v) => {
                    if !v.is_finite() || *v < 0.0 {
                        return Err(invalid(
                            format!("node {} boundary_temp", node.id),
                            v,
                            "must be a finite absolute temperature",
                        ));
                    }
                }
                crate::schema::BoundaryTemp::Schedule(points) => {
                    check_schedule(format!("node {} boundary_temp", node.id), points)?;
                    if points.iter().any(|(_, t)| *t < 0.0) {
                        return Err(invalid(
                            format!("node {} boundary_temp", node.id),
                            "schedule",
                            "temperatures must be >= 0 K",
                        ));
                    }
                }
            }
            if node.capacitance.is_some() {
                return Err(ValidationError::UnexpectedField {
                    context: CTX,
                    id: node.id.clone(),
                    field: "capacitance",
                });
            }
        }
    }
    Ok(())
}

fn validate_conductor(
    conductor: &Conductor,
    node_kinds: &HashMap<&str, NodeKind>,
) -> Result<(), ValidationError> {
    const CTX: &str = "Conductor";
    for endpoint in [&conductor.from, &conductor.to] {
        if !node_kinds.contains_key(endpoint.as_str()) {
            return Err(ValidationError::MissingReference {
                id: endpoint.clone(),
                context: format!("conductor '{}' endpoint", conductor.id),
            });
        }
    }
    if conductor.from == conductor.to {
        return Err(ValidationError::SelfLoop {
            id: conductor.id.clone(),
            node: conductor.from.clone(),
        });
    }

    let require = |present: bool, field: &'static str| {
        if present {
            Ok(())
        } else {
            Err(ValidationError::MissingField {
                context: CTX,
                id: conductor.id.clone(),
                field,
            })
        }
    };
    let forbid = |present: bool, field: &'static str| {
        if present {
            Err(ValidationError::UnexpectedField {
                context: CTX,
                id: conductor.id.clone(),
                field,
            })
        } else {
            Ok(())
        }
    };

    match conductor.kind {
        ConductorKind::Linear | ConductorKind::Contact => {
            require(conductor.conductance.is_some(), "conductance")?;
            forbid(conductor.area.is_some(), "area")?;
            forbid(conductor.view_factor.is_some(), "view_factor")?;
            forbid(conductor.emissivity.is_some(), "emissivity")?;
            forbid(conductor.conductance_data.is_some(), "conductance_data")?;
            if let Some(g) = conductor.conductance
                && (!g.is_finite() || g < 0.0)
            {
                return Err(invalid(
                    format!("conductor {} conductance", conductor.id),
                    g,
                    "must be finite and >= 0",
                ));
            }
        }
        ConductorKind::Radiation => {
            require(conductor.area.is_some(), "area")?;
            require(conductor.view_factor.is_some(), "view_factor")?;
            require(conductor.emissivity.is_some(), "emissivity")?;
            forbid(conductor.conductance.is_some(), "conductance")?;
            forbid(conductor.conductance_data.is_some(), "conductance_data")?;
            if let Some(a) = conductor.area {
                check_positive(format!("conductor {} area", conductor.id), a)?;
            }
            if let Some(f) = conductor.view_factor {
                check_fraction(format!("conductor {} view_factor", conductor.id), f)?;
            }
            if let Some(e) = conductor.emissivity {
                check_fraction(format!("conductor {} emissivity", conductor.id), e)?;
            }
        }
        ConductorKind::HeatPipe => {
            require(conductor.conductance_data.is_some(), "conductance_data")?;
            forbid(conductor.conductance.is_some(), "conductance")?;
            forbid(conductor.area.is_some(), "area")?;
            forbid(conductor.view_factor.is_some(), "view_factor")?;
            forbid(conductor.emissivity.is_some(), "emissivity")?;
            if let Some(data) = &conductor.conductance_data {
                let field = format!("conductor {} conductance_data", conductor.id);
                check_schedule(field.clone(), data)?;
                if data.iter().any(|(_, g)| *g <= 0.0) {
                    return Err(invalid(field, "table", "conductances must be > 0"));
                }
            }
        }
    }
    Ok(())
}

fn validate_heat_load(
    load: &HeatLoad,
    snapshot: &NetworkSnapshot,
    node_kinds: &HashMap<&str, NodeKind>,
) -> Result<(), ValidationError> {
    const CTX: &str = "HeatLoad";
    match node_kinds.get(load.node_id.as_str()) {
        None => {
            return Err(ValidationError::MissingReference {
                id: load.node_id.clone(),
                context: format!("heat load '{}' node_id", load.id),
            });
        }
        Some(NodeKind::Boundary) => {
            return Err(invalid(
                format!("heat load {} node_id", load.id),
                &load.node_id,
                "loads on boundary nodes have no effect",
            ));
        }
        Some(_) => {}
    }

    let missing = |field| ValidationError::MissingField {
        context: CTX,
        id: load.id.clone(),
        field,
    };
    let unexpected = |field| ValidationError::UnexpectedField {
        context: CTX,
        id: load.id.clone(),
        field,
    };

    match load.kind {
        HeatLoadKind::Constant => {
            let v = load.value.ok_or_else(|| missing("value"))?;
            if !v.is_finite() {
                return Err(invalid(format!("heat load {} value", load.id), v, "must be finite"));
            }
            if load.time_values.is_some() {
                return Err(unexpected("time_values"));
            }
            if load.orbital_params.is_some() {
                return Err(unexpected("orbital_params"));
            }
        }
        HeatLoadKind::TimeVarying => {
            let points = load.time_values.as_ref().ok_or_else(|| missing("time_values"))?;
            let field = format!("heat load {} time_values", load.id);
            check_schedule(field.clone(), points)?;
            if points.iter().any(|(t, _)| *t < 0.0) {
                return Err(invalid(field, "schedule", "times must be >= 0"));
            }
            if load.value.is_some() {
                return Err(unexpected("value"));
            }
            if load.orbital_params.is_some() {
                return Err(unexpected("orbital_params"));
            }
        }
        HeatLoadKind::Orbital => {
            let params = load.orbital_params.as_ref().ok_or_else(|| missing("orbital_params"))?;
            check_fraction(format!("heat load {} absorptivity", load.id), params.absorptivity)?;
            check_fraction(format!("heat load {} emissivity", load.id), params.emissivity)?;
            check_positive(format!("heat load {} area", load.id), params.area)?;
            if load.value.is_some() {
                return Err(unexpected("value"));
            }
            if load.time_values.is_some() {
                return Err(unexpected("time_values"));
            }
            if snapshot.orbit.is_none() {
                return Err(ValidationError::MissingOrbit {
                    id: load.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validate simulation configuration ranges.
pub fn validate_config(config: &SimulationConfig) -> Result<(), ValidationError> {
    if !config.time_start.is_finite() || !config.time_end.is_finite() {
        return Err(invalid("time range", config.time_end, "must be finite"));
    }
    if config.time_end <= config.time_start {
        return Err(invalid("time_end", config.time_end, "must exceed time_start"));
    }
    check_positive("min_step".to_string(), config.min_step)?;
    check_positive("time_step".to_string(), config.time_step)?;
    check_positive("max_step".to_string(), config.max_step)?;
    check_positive("output_interval".to_string(), config.output_interval)?;
    check_positive("tolerance".to_string(), config.tolerance)?;
    if config.min_step > config.time_step {
        return Err(invalid("min_step", config.min_step, "must not exceed time_step"));
    }
    if config.time_step > config.max_step {
        return Err(invalid("time_step", config.time_step, "must not exceed max_step"));
    }
    if config.max_iterations == 0 {
        return Err(invalid("max_iterations", 0, "must be positive"));
    }
    Ok(())
}
