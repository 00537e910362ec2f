//! Parameter ranges and design points.

use ot_network::{NetworkSnapshot, ParamRef, apply_values};
use serde::{Deserialize, Serialize};

use crate::error::{ExploreError, ExploreResult};

/// Absolute bounds of one explored parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamRange {
    pub param: ParamRef,
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub fn new(param: ParamRef, min: f64, max: f64) -> Self {
        Self { param, min, max }
    }

    pub fn validate(&self) -> ExploreResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min <= self.max) {
            return Err(ExploreError::InvalidRange {
                param: self.param.clone(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Map `u ∈ [0, 1)` onto the range.
    pub fn at(&self, u: f64) -> f64 {
        self.min + u * (self.max - self.min)
    }
}

pub(crate) fn validate_ranges(ranges: &[ParamRange]) -> ExploreResult<()> {
    for (i, range) in ranges.iter().enumerate() {
        range.validate()?;
        if ranges[..i].iter().any(|r| r.param == range.param) {
            return Err(ExploreError::DuplicateParameter {
                param: range.param.clone(),
            });
        }
    }
    Ok(())
}

/// A copy of `snapshot` with `values[k]` assigned to `ranges[k]`.
pub fn apply_point(
    snapshot: &NetworkSnapshot,
    ranges: &[ParamRange],
    values: &[f64],
) -> ExploreResult<NetworkSnapshot> {
    let assignments: Vec<(ParamRef, f64)> = ranges
        .iter()
        .zip(values)
        .map(|(r, v)| (r.param.clone(), *v))
        .collect();
    Ok(apply_values(snapshot, &assignments)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_and_duplicate_ranges() {
        let p = ParamRef::conductor("g", "conductance");
        assert!(ParamRange::new(p.clone(), 2.0, 1.0).validate().is_err());
        assert!(ParamRange::new(p.clone(), f64::NAN, 1.0).validate().is_err());
        assert!(ParamRange::new(p.clone(), 1.0, 1.0).validate().is_ok());

        let ranges = vec![
            ParamRange::new(p.clone(), 0.0, 1.0),
            ParamRange::new(p, 1.0, 2.0),
        ];
        assert!(matches!(
            validate_ranges(&ranges),
            Err(ExploreError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn maps_unit_interval() {
        let r = ParamRange::new(ParamRef::heat_load("q", "value"), 10.0, 30.0);
        assert_eq!(r.at(0.0), 10.0);
        assert_eq!(r.at(0.5), 20.0);
    }
}
