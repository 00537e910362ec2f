//! Orbit regime classification and range checks.

use ot_network::OrbitalConfig;
use serde::{Deserialize, Serialize};

use crate::{OrbitError, OrbitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitRegime {
    Leo,
    Meo,
    Geo,
    Heo,
}

/// Altitude band (km) and inclination ceiling (deg) of one regime.
struct Band {
    regime: OrbitRegime,
    min_km: f64,
    max_km: f64,
    max_inclination: f64,
}

const BANDS: [Band; 4] = [
    Band {
        regime: OrbitRegime::Leo,
        min_km: 160.0,
        max_km: 2_000.0,
        max_inclination: 180.0,
    },
    Band {
        regime: OrbitRegime::Meo,
        min_km: 2_000.0,
        max_km: 35_586.0,
        max_inclination: 180.0,
    },
    Band {
        regime: OrbitRegime::Geo,
        min_km: 35_586.0,
        max_km: 35_986.0,
        max_inclination: 15.0,
    },
    Band {
        regime: OrbitRegime::Heo,
        min_km: 35_986.0,
        max_km: 400_000.0,
        max_inclination: 180.0,
    },
];

impl OrbitRegime {
    /// Regime of a circular orbit at `altitude_km`. Shared band edges belong to the
    /// lower regime.
    pub fn classify(altitude_km: f64) -> OrbitResult<Self> {
        BANDS
            .iter()
            .find(|b| altitude_km >= b.min_km && altitude_km <= b.max_km)
            .map(|b| b.regime)
            .ok_or(OrbitError::AltitudeOutOfRange {
                altitude: altitude_km,
                min: BANDS[0].min_km,
                max: BANDS[BANDS.len() - 1].max_km,
            })
    }

    fn max_inclination(self) -> f64 {
        BANDS
            .iter()
            .find(|b| b.regime == self)
            .map_or(180.0, |b| b.max_inclination)
    }
}

/// Check an orbit definition and return its regime. Out-of-range values are errors,
/// never clamped.
pub fn validate_orbit(config: &OrbitalConfig) -> OrbitResult<OrbitRegime> {
    for (field, value) in [
        ("altitude", config.altitude),
        ("inclination", config.inclination),
        ("raan", config.raan),
    ] {
        if !value.is_finite() {
            return Err(OrbitError::NonFinite { field, value });
        }
    }
    if !(0.0..=180.0).contains(&config.inclination) {
        return Err(OrbitError::InclinationOutOfRange {
            inclination: config.inclination,
        });
    }
    if !(0.0..360.0).contains(&config.raan) {
        return Err(OrbitError::RaanOutOfRange { raan: config.raan });
    }

    let regime = OrbitRegime::classify(config.altitude)?;
    let max = regime.max_inclination();
    if config.inclination > max {
        return Err(OrbitError::RegimeInclination {
            regime,
            inclination: config.inclination,
            max,
        });
    }
    Ok(regime)
}
