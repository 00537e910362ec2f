//! Absorbed power of orbital heat loads.

use ot_network::OrbitalLoadParams;

use crate::environment::{EnvironmentSample, OrbitEnvironment};

/// Samples per orbit used for orbit averages.
pub const ORBIT_AVERAGE_SAMPLES: usize = 360;

/// Power (W) absorbed by a surface: `α·A·(solar + albedo) + ε·A·earth_ir`.
pub fn absorbed_power(params: &OrbitalLoadParams, sample: &EnvironmentSample) -> f64 {
    let flux = sample.flux(params.surface_type);
    params.area * (params.absorptivity * flux.shortwave() + params.emissivity * flux.earth_ir)
}

/// Mean absorbed power over one orbit.
pub fn orbit_average_power(env: &OrbitEnvironment, params: &OrbitalLoadParams) -> f64 {
    let samples = env.one_orbit(0.0, ORBIT_AVERAGE_SAMPLES);
    let n = samples.len() as f64;
    samples.map(|s| absorbed_power(params, &s)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use ot_core::constants::{EARTH_IR_W_M2, SOLAR_CONSTANT_W_M2};
    use ot_network::{OrbitalConfig, SurfaceType};

    fn env() -> OrbitEnvironment {
        OrbitEnvironment::new(&OrbitalConfig {
            altitude: 500.0,
            inclination: 0.0,
            raan: 0.0,
            epoch: Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn sun_facing_plate_absorbs_alpha_a_s() {
        let params = OrbitalLoadParams {
            surface_type: SurfaceType::Sun,
            absorptivity: 0.5,
            emissivity: 0.8,
            area: 2.0,
        };
        let env = env();
        let s = env.sample_at(0.0);
        let expected_solar = 0.5 * 2.0 * SOLAR_CONSTANT_W_M2;
        let flux = s.flux(SurfaceType::Sun);
        let expected = expected_solar + 0.5 * 2.0 * flux.albedo + 0.8 * 2.0 * flux.earth_ir;
        assert_relative_eq!(absorbed_power(&params, &s), expected, max_relative = 1e-9);
    }

    #[test]
    fn nadir_average_includes_ir_all_orbit() {
        let params = OrbitalLoadParams {
            surface_type: SurfaceType::Nadir,
            absorptivity: 0.0,
            emissivity: 1.0,
            area: 1.0,
        };
        let env = env();
        let s = env.sample_at(0.0);
        let ir = EARTH_IR_W_M2 / (s.h_ratio * s.h_ratio);
        // With zero absorptivity only the constant Earth-IR term remains.
        assert_relative_eq!(orbit_average_power(&env, &params), ir, max_relative = 1e-9);
    }
}
