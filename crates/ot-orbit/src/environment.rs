//! Time-indexed environment samples.

use std::f64::consts::TAU;

use nalgebra::Vector3;
use ot_core::constants::{
    EARTH_ALBEDO, EARTH_IR_W_M2, EARTH_RADIUS_KM, MU_EARTH_KM3_S2, SOLAR_CONSTANT_W_M2,
};
use ot_core::{Time, s};
use ot_network::{OrbitalConfig, SurfaceType};
use tracing::debug;

use crate::ephemeris::{julian_date, sun_direction};
use crate::geometry::{Attitude, OrbitFrame, earth_view_factor, in_cylindrical_shadow};
use crate::regime::{OrbitRegime, validate_orbit};
use crate::{OrbitError, OrbitResult};

/// Incident flux (W/m²) on one surface at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceFlux {
    pub solar: f64,
    pub albedo: f64,
    pub earth_ir: f64,
}

impl SurfaceFlux {
    /// Short-wave part (absorbed with absorptivity).
    pub fn shortwave(&self) -> f64 {
        self.solar + self.albedo
    }
}

/// Environment at one instant of the orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    /// Seconds since the epoch.
    pub time: f64,
    pub eclipse: bool,
    /// Solar flux at the spacecraft (W/m²); zero in eclipse.
    pub solar: f64,
    pub sun: Vector3<f64>,
    pub attitude: Attitude,
    /// Orbit radius over Earth radius.
    pub h_ratio: f64,
}

impl EnvironmentSample {
    /// Outward normal of a surface with the given orientation.
    pub fn surface_normal(&self, surface: SurfaceType) -> Vector3<f64> {
        let a = &self.attitude;
        match surface {
            SurfaceType::Nadir => -a.radial,
            SurfaceType::Zenith => a.radial,
            SurfaceType::Sun => self.sun,
            SurfaceType::Ram => a.velocity,
            SurfaceType::Wake => -a.velocity,
            SurfaceType::North => a.normal,
            SurfaceType::South => -a.normal,
        }
    }

    /// View factor from the surface to the Earth.
    pub fn earth_view_factor(&self, surface: SurfaceType) -> f64 {
        let n = self.surface_normal(surface);
        let lambda = n.dot(&(-self.attitude.radial)).clamp(-1.0, 1.0).acos();
        earth_view_factor(self.h_ratio, lambda)
    }

    /// Albedo scaling with the solar elevation under the spacecraft.
    fn subsolar_cosine(&self) -> f64 {
        self.attitude.radial.dot(&self.sun).max(0.0)
    }

    pub fn flux(&self, surface: SurfaceType) -> SurfaceFlux {
        let f_earth = self.earth_view_factor(surface);
        let earth_ir = EARTH_IR_W_M2 * f_earth;
        if self.eclipse {
            return SurfaceFlux {
                solar: 0.0,
                albedo: 0.0,
                earth_ir,
            };
        }

        let cos_sun = self.surface_normal(surface).dot(&self.sun).max(0.0);
        SurfaceFlux {
            solar: self.solar * cos_sun,
            albedo: self.solar * EARTH_ALBEDO * f_earth * self.subsolar_cosine(),
            earth_ir,
        }
    }
}

/// Propagated circular orbit able to produce [`EnvironmentSample`]s.
///
/// The spacecraft crosses the ascending node at the epoch.
#[derive(Debug, Clone)]
pub struct OrbitEnvironment {
    config: OrbitalConfig,
    regime: OrbitRegime,
    radius_km: f64,
    /// rad/s
    mean_motion: f64,
    frame: OrbitFrame,
    epoch_jd: f64,
}

impl OrbitEnvironment {
    pub fn new(config: &OrbitalConfig) -> OrbitResult<Self> {
        let regime = validate_orbit(config)?;
        let radius_km = EARTH_RADIUS_KM + config.altitude;
        let mean_motion = (MU_EARTH_KM3_S2 / radius_km.powi(3)).sqrt();
        let env = Self {
            config: config.clone(),
            regime,
            radius_km,
            mean_motion,
            frame: OrbitFrame::new(config.inclination, config.raan),
            epoch_jd: julian_date(&config.epoch),
        };
        debug!(
            ?regime,
            altitude_km = config.altitude,
            period_s = env.period_s(),
            "orbit environment ready"
        );
        Ok(env)
    }

    pub fn config(&self) -> &OrbitalConfig {
        &self.config
    }

    pub fn regime(&self) -> OrbitRegime {
        self.regime
    }

    /// Two-body period `2π·sqrt(a³/μ)`.
    pub fn period(&self) -> Time {
        s(self.period_s())
    }

    pub fn period_s(&self) -> f64 {
        TAU / self.mean_motion
    }

    pub fn sample_at(&self, time: f64) -> EnvironmentSample {
        let attitude = self.frame.attitude(self.mean_motion * time);
        let sun = sun_direction(self.epoch_jd + time / 86_400.0);
        let position = attitude.radial * self.radius_km;
        let eclipse = in_cylindrical_shadow(&position, &sun, EARTH_RADIUS_KM);
        EnvironmentSample {
            time,
            eclipse,
            solar: if eclipse { 0.0 } else { SOLAR_CONSTANT_W_M2 },
            sun,
            attitude,
            h_ratio: self.radius_km / EARTH_RADIUS_KM,
        }
    }

    /// Samples at `start, start + step, ...` up to and including `end`.
    pub fn samples(&self, start: f64, end: f64, step: f64) -> OrbitResult<EnvironmentSamples<'_>> {
        if !(start.is_finite() && end.is_finite() && step.is_finite()) || step <= 0.0 || end < start {
            return Err(OrbitError::InvalidDomain { start, end, step });
        }
        let count = ((end - start) / step + 1e-9).floor() as usize + 1;
        Ok(EnvironmentSamples {
            env: self,
            start,
            step,
            next: 0,
            count,
        })
    }

    /// `count` samples evenly spread over one period, starting at `start`.
    pub fn one_orbit(&self, start: f64, count: usize) -> EnvironmentSamples<'_> {
        let count = count.max(1);
        EnvironmentSamples {
            env: self,
            start,
            step: self.period_s() / count as f64,
            next: 0,
            count,
        }
    }

    /// Fraction of one orbit spent in eclipse, from `count` samples.
    pub fn eclipse_fraction(&self, count: usize) -> f64 {
        let samples = self.one_orbit(0.0, count);
        let total = samples.len();
        samples.filter(|s| s.eclipse).count() as f64 / total as f64
    }
}

/// Lazy sequence of environment samples. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct EnvironmentSamples<'a> {
    env: &'a OrbitEnvironment,
    start: f64,
    step: f64,
    next: usize,
    count: usize,
}

impl EnvironmentSamples<'_> {
    /// Rewind to the first sample.
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for EnvironmentSamples<'_> {
    type Item = EnvironmentSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let t = self.start + self.step * self.next as f64;
        self.next += 1;
        Some(self.env.sample_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for EnvironmentSamples<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn leo() -> OrbitEnvironment {
        OrbitEnvironment::new(&OrbitalConfig {
            altitude: 400.0,
            inclination: 0.0,
            raan: 0.0,
            epoch: Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn period_matches_two_body() {
        let env = leo();
        let a: f64 = 6778.137;
        let expected = TAU * (a.powi(3) / MU_EARTH_KM3_S2).sqrt();
        assert_relative_eq!(env.period_s(), expected, max_relative = 1e-12);
    }

    #[test]
    fn eclipse_on_night_side() {
        // Equatorial orbit at equinox: sun along +x, node along +x at the epoch.
        let env = leo();
        let day = env.sample_at(0.0);
        assert!(!day.eclipse);
        assert_eq!(day.solar, SOLAR_CONSTANT_W_M2);

        let night = env.sample_at(env.period_s() / 2.0);
        assert!(night.eclipse);
        let flux = night.flux(SurfaceType::Nadir);
        assert_eq!(flux.solar, 0.0);
        assert_eq!(flux.albedo, 0.0);
        assert!(flux.earth_ir > 0.0);
    }

    #[test]
    fn subsolar_nadir_and_zenith_fluxes() {
        let env = leo();
        let s = env.sample_at(0.0);
        let nadir = s.flux(SurfaceType::Nadir);
        let f = 1.0 / (s.h_ratio * s.h_ratio);
        // Nadir faces away from the sun at the subsolar point.
        assert!(nadir.solar < 1e-6);
        assert_relative_eq!(nadir.earth_ir, EARTH_IR_W_M2 * f, max_relative = 1e-3);
        assert_relative_eq!(
            nadir.albedo,
            SOLAR_CONSTANT_W_M2 * EARTH_ALBEDO * f,
            max_relative = 1e-3
        );

        let zenith = s.flux(SurfaceType::Zenith);
        assert_relative_eq!(zenith.solar, SOLAR_CONSTANT_W_M2, max_relative = 1e-3);
        assert_eq!(zenith.earth_ir, 0.0);
    }

    #[test]
    fn sun_tracking_surface_sees_full_sun() {
        let env = leo();
        let s = env.sample_at(600.0);
        assert!(!s.eclipse);
        assert_relative_eq!(s.flux(SurfaceType::Sun).solar, SOLAR_CONSTANT_W_M2, epsilon = 1e-9);
    }

    #[test]
    fn samples_are_restartable() {
        let env = leo();
        let mut it = env.samples(0.0, 300.0, 100.0).unwrap();
        assert_eq!(it.len(), 4);
        let first: Vec<f64> = it.clone().map(|s| s.time).collect();
        assert_eq!(first, vec![0.0, 100.0, 200.0, 300.0]);

        it.next();
        it.next();
        it.restart();
        let again: Vec<f64> = it.map(|s| s.time).collect();
        assert_eq!(again, first);
        assert!(env.samples(10.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn leo_eclipse_fraction_is_plausible() {
        let frac = leo().eclipse_fraction(720);
        // About 36 minutes of a 92 minute orbit at beta = 0.
        assert!((0.35..0.42).contains(&frac), "{frac}");
    }
}
