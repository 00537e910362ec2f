//! Parameter references for perturb-and-rerun workflows.
//!
//! A [`ParamRef`] names one scalar property of one entity. Reading goes through
//! [`ParamRef::get`]; writing always produces a fresh snapshot so that the baseline a
//! caller holds is never touched.

use serde::{Deserialize, Serialize};

use crate::schema::{BoundaryTemp, HeatLoadKind, NetworkSnapshot};
use crate::{NetworkError, NetworkResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Conductor,
    HeatLoad,
}

/// Values a property accepts, mirroring snapshot validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDomain {
    Unbounded,
    /// `>= 0`
    NonNegative,
    /// `> 0`
    Positive,
    /// `[0, 1]`
    Fraction,
}

impl ParamDomain {
    pub fn contains(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                ParamDomain::Unbounded => true,
                ParamDomain::NonNegative => value >= 0.0,
                ParamDomain::Positive => value > 0.0,
                ParamDomain::Fraction => (0.0..=1.0).contains(&value),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamRef {
    pub entity: EntityKind,
    pub id: String,
    pub property: String,
}

impl std::fmt::Display for ParamRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entity = match self.entity {
            EntityKind::Node => "node",
            EntityKind::Conductor => "conductor",
            EntityKind::HeatLoad => "heat_load",
        };
        write!(f, "{entity}:{}.{}", self.id, self.property)
    }
}

impl ParamRef {
    pub fn node(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            entity: EntityKind::Node,
            id: id.into(),
            property: property.into(),
        }
    }

    pub fn conductor(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            entity: EntityKind::Conductor,
            id: id.into(),
            property: property.into(),
        }
    }

    pub fn heat_load(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            entity: EntityKind::HeatLoad,
            id: id.into(),
            property: property.into(),
        }
    }

    /// Domain of the property. Unknown properties are reported by [`ParamRef::get`].
    pub fn domain(&self) -> ParamDomain {
        match (self.entity, self.property.as_str()) {
            (_, "absorptivity" | "emissivity" | "view_factor") => ParamDomain::Fraction,
            (_, "area" | "mass" | "capacitance") => ParamDomain::Positive,
            (EntityKind::Node, "temperature" | "boundary_temp") => ParamDomain::NonNegative,
            (EntityKind::Conductor, "conductance") => ParamDomain::NonNegative,
            (EntityKind::HeatLoad, "scale") => ParamDomain::NonNegative,
            _ => ParamDomain::Unbounded,
        }
    }

    fn unknown(&self) -> NetworkError {
        NetworkError::UnknownProperty {
            entity: self.entity,
            id: self.id.clone(),
            property: self.property.clone(),
        }
    }

    fn unset(&self) -> NetworkError {
        NetworkError::PropertyUnset {
            entity: self.entity,
            id: self.id.clone(),
            property: self.property.clone(),
        }
    }

    fn missing_entity(&self) -> NetworkError {
        let what = match self.entity {
            EntityKind::Node => "node",
            EntityKind::Conductor => "conductor",
            EntityKind::HeatLoad => "heat load",
        };
        NetworkError::UnknownId {
            what,
            id: self.id.clone(),
        }
    }

    /// Current value of the property in `snapshot`.
    pub fn get(&self, snapshot: &NetworkSnapshot) -> NetworkResult<f64> {
        let value = match self.entity {
            EntityKind::Node => {
                let node = snapshot.node(&self.id).ok_or_else(|| self.missing_entity())?;
                match self.property.as_str() {
                    "temperature" => Some(node.temperature),
                    "capacitance" => snapshot.effective_capacitance(node),
                    "boundary_temp" => match &node.boundary_temp {
                        Some(BoundaryTemp::Fixed(v)) => Some(*v),
                        Some(BoundaryTemp::Schedule(points)) => points.first().map(|p| p.1),
                        None => None,
                    },
                    "area" => node.area,
                    "mass" => node.mass,
                    "absorptivity" => snapshot.effective_absorptivity(node),
                    "emissivity" => snapshot.effective_emissivity(node),
                    _ => return Err(self.unknown()),
                }
            }
            EntityKind::Conductor => {
                let c = snapshot
                    .conductor(&self.id)
                    .ok_or_else(|| self.missing_entity())?;
                match self.property.as_str() {
                    "conductance" => c.conductance,
                    "area" => c.area,
                    "view_factor" => c.view_factor,
                    "emissivity" => c.emissivity,
                    _ => return Err(self.unknown()),
                }
            }
            EntityKind::HeatLoad => {
                let l = snapshot
                    .heat_load(&self.id)
                    .ok_or_else(|| self.missing_entity())?;
                let orbital = l.orbital_params.as_ref();
                match self.property.as_str() {
                    "value" => l.value,
                    // Relative to the schedule currently in the snapshot.
                    "scale" => (l.kind == HeatLoadKind::TimeVarying).then_some(1.0),
                    "absorptivity" => orbital.map(|p| p.absorptivity),
                    "emissivity" => orbital.map(|p| p.emissivity),
                    "area" => orbital.map(|p| p.area),
                    _ => return Err(self.unknown()),
                }
            }
        };
        value.ok_or_else(|| self.unset())
    }

    /// Write `value` into `snapshot` in place. Only used on private copies.
    fn set_in(&self, snapshot: &mut NetworkSnapshot, value: f64) -> NetworkResult<()> {
        match self.entity {
            EntityKind::Node => {
                let node = snapshot
                    .nodes
                    .iter_mut()
                    .find(|n| n.id == self.id)
                    .ok_or_else(|| self.missing_entity())?;
                match self.property.as_str() {
                    "temperature" => node.temperature = value,
                    "capacitance" => node.capacitance = Some(value),
                    "boundary_temp" => match &mut node.boundary_temp {
                        Some(BoundaryTemp::Fixed(v)) => *v = value,
                        // Shift the whole schedule so its first point lands on `value`.
                        Some(BoundaryTemp::Schedule(points)) => {
                            let shift = value - points.first().map_or(value, |p| p.1);
                            points.iter_mut().for_each(|p| p.1 += shift);
                        }
                        None => return Err(self.unset()),
                    },
                    "area" => node.area = Some(value),
                    "mass" => node.mass = Some(value),
                    "absorptivity" => node.absorptivity = Some(value),
                    "emissivity" => node.emissivity = Some(value),
                    _ => return Err(self.unknown()),
                }
            }
            EntityKind::Conductor => {
                let c = snapshot
                    .conductors
                    .iter_mut()
                    .find(|c| c.id == self.id)
                    .ok_or_else(|| self.missing_entity())?;
                let slot = match self.property.as_str() {
                    "conductance" => &mut c.conductance,
                    "area" => &mut c.area,
                    "view_factor" => &mut c.view_factor,
                    "emissivity" => &mut c.emissivity,
                    _ => return Err(self.unknown()),
                };
                if slot.is_none() {
                    return Err(self.unset());
                }
                *slot = Some(value);
            }
            EntityKind::HeatLoad => {
                let l = snapshot
                    .heat_loads
                    .iter_mut()
                    .find(|l| l.id == self.id)
                    .ok_or_else(|| self.missing_entity())?;
                match (self.property.as_str(), l.kind) {
                    ("value", HeatLoadKind::Constant) => l.value = Some(value),
                    ("value", _) => return Err(self.unset()),
                    ("scale", HeatLoadKind::TimeVarying) => {
                        let points = l.time_values.as_mut().ok_or_else(|| self.unset())?;
                        points.iter_mut().for_each(|p| p.1 *= value);
                    }
                    ("scale", _) => return Err(self.unset()),
                    (prop @ ("absorptivity" | "emissivity" | "area"), _) => {
                        let params = l.orbital_params.as_mut().ok_or_else(|| self.unset())?;
                        match prop {
                            "absorptivity" => params.absorptivity = value,
                            "emissivity" => params.emissivity = value,
                            _ => params.area = value,
                        }
                    }
                    _ => return Err(self.unknown()),
                }
            }
        }
        Ok(())
    }

    /// A copy of `snapshot` with the property set to `value`.
    pub fn with_value(&self, snapshot: &NetworkSnapshot, value: f64) -> NetworkResult<NetworkSnapshot> {
        let mut copy = snapshot.clone();
        self.set_in(&mut copy, value)?;
        Ok(copy)
    }

    /// A copy of `snapshot` with the property shifted by `delta`.
    pub fn with_delta(&self, snapshot: &NetworkSnapshot, delta: f64) -> NetworkResult<NetworkSnapshot> {
        let current = self.get(snapshot)?;
        self.with_value(snapshot, current + delta)
    }
}

/// A copy of `snapshot` with every `(param, value)` assignment applied.
pub fn apply_values(
    snapshot: &NetworkSnapshot,
    values: &[(ParamRef, f64)],
) -> NetworkResult<NetworkSnapshot> {
    let mut copy = snapshot.clone();
    for (param, value) in values {
        param.set_in(&mut copy, *value)?;
    }
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;

    fn snap() -> NetworkSnapshot {
        NetworkBuilder::new()
            .diffusion("a", 290.0, 100.0)
            .boundary("b", 200.0)
            .linear("g", "a", "b", 10.0)
            .constant_load("q", "a", 50.0)
            .snapshot()
    }

    #[test]
    fn get_and_with_value() {
        let base = snap();
        let p = ParamRef::conductor("g", "conductance");
        assert_eq!(p.get(&base).unwrap(), 10.0);

        let changed = p.with_value(&base, 12.5).unwrap();
        assert_eq!(p.get(&changed).unwrap(), 12.5);
        // Baseline untouched.
        assert_eq!(p.get(&base).unwrap(), 10.0);
    }

    #[test]
    fn with_delta_shifts() {
        let base = snap();
        let p = ParamRef::heat_load("q", "value");
        let changed = p.with_delta(&base, -5.0).unwrap();
        assert_eq!(p.get(&changed).unwrap(), 45.0);
    }

    #[test]
    fn unknown_property_and_unset_field() {
        let base = snap();
        assert!(matches!(
            ParamRef::node("a", "colour").get(&base),
            Err(NetworkError::UnknownProperty { .. })
        ));
        assert!(matches!(
            ParamRef::conductor("g", "view_factor").with_value(&base, 0.5),
            Err(NetworkError::PropertyUnset { .. })
        ));
        assert!(matches!(
            ParamRef::node("zz", "temperature").get(&base),
            Err(NetworkError::UnknownId { .. })
        ));
    }

    #[test]
    fn apply_many_values() {
        let base = snap();
        let out = apply_values(
            &base,
            &[
                (ParamRef::node("b", "boundary_temp"), 150.0),
                (ParamRef::node("a", "capacitance"), 400.0),
            ],
        )
        .unwrap();
        assert_eq!(ParamRef::node("b", "boundary_temp").get(&out).unwrap(), 150.0);
        assert_eq!(ParamRef::node("a", "capacitance").get(&out).unwrap(), 400.0);
    }

    #[test]
    fn scale_multiplies_schedule() {
        let base = NetworkBuilder::new()
            .diffusion("a", 290.0, 100.0)
            .boundary("b", 200.0)
            .linear("g", "a", "b", 10.0)
            .time_varying_load("q", "a", vec![(0.0, 40.0), (600.0, 80.0)])
            .snapshot();
        let scale = ParamRef::heat_load("q", "scale");
        assert_eq!(scale.get(&base).unwrap(), 1.0);

        let changed = scale.with_delta(&base, 0.5).unwrap();
        assert_eq!(
            changed.heat_load("q").unwrap().time_values,
            Some(vec![(0.0, 60.0), (600.0, 120.0)])
        );
        assert_eq!(scale.get(&changed).unwrap(), 1.0);
        assert_eq!(
            base.heat_load("q").unwrap().time_values,
            Some(vec![(0.0, 40.0), (600.0, 80.0)])
        );

        // Constant loads carry no schedule.
        assert!(matches!(
            ParamRef::heat_load("q", "scale").get(&snap()),
            Err(NetworkError::PropertyUnset { .. })
        ));
    }

    #[test]
    fn domains_follow_validation() {
        assert_eq!(ParamRef::conductor("r", "emissivity").domain(), ParamDomain::Fraction);
        assert_eq!(ParamRef::conductor("g", "conductance").domain(), ParamDomain::NonNegative);
        assert_eq!(ParamRef::node("a", "mass").domain(), ParamDomain::Positive);
        assert_eq!(ParamRef::heat_load("q", "value").domain(), ParamDomain::Unbounded);
        assert!(ParamDomain::Fraction.contains(1.0));
        assert!(!ParamDomain::Fraction.contains(1.01));
        assert!(!ParamDomain::Positive.contains(0.0));
        assert!(ParamDomain::NonNegative.contains(0.0));
        assert!(!ParamDomain::Unbounded.contains(f64::NAN));
    }

    #[test]
    fn display_form() {
        assert_eq!(
            ParamRef::conductor("g", "conductance").to_string(),
            "conductor:g.conductance"
        );
    }
}
