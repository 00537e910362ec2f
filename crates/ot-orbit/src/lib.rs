//! ot-orbit: orbital heat-flux environment.
//!
//! Given an [`OrbitalConfig`](ot_network::OrbitalConfig) this crate propagates a
//! circular orbit, tracks the sun and the Earth shadow, and reports the solar, albedo
//! and Earth-IR flux seen by a flat surface of a given orientation.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use ot_network::{OrbitalConfig, SurfaceType};
//! use ot_orbit::OrbitEnvironment;
//!
//! let config = OrbitalConfig {
//!     altitude: 400.0,
//!     inclination: 51.6,
//!     raan: 0.0,
//!     epoch: Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap(),
//! };
//! let env = OrbitEnvironment::new(&config).unwrap();
//! let minutes = ot_core::as_seconds(env.period()) / 60.0;
//! assert!((minutes - 92.4).abs() < 0.5);
//!
//! let nadir_ir: Vec<f64> = env
//!     .samples(0.0, 600.0, 60.0)
//!     .unwrap()
//!     .map(|s| s.flux(SurfaceType::Nadir).earth_ir)
//!     .collect();
//! assert_eq!(nadir_ir.len(), 11);
//! ```

pub mod environment;
pub mod ephemeris;
pub mod geometry;
pub mod loads;
pub mod regime;

pub use environment::{EnvironmentSample, EnvironmentSamples, OrbitEnvironment, SurfaceFlux};
pub use geometry::earth_view_factor;
pub use loads::{absorbed_power, orbit_average_power};
pub use regime::{OrbitRegime, validate_orbit};

pub type OrbitResult<T> = Result<T, OrbitError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    #[error("Orbit {field} is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Altitude {altitude} km outside supported range [{min}, {max}] km")]
    AltitudeOutOfRange { altitude: f64, min: f64, max: f64 },

    #[error("Inclination {inclination} deg outside [0, 180]")]
    InclinationOutOfRange { inclination: f64 },

    #[error("RAAN {raan} deg outside [0, 360)")]
    RaanOutOfRange { raan: f64 },

    #[error("{regime:?} orbit needs inclination <= {max} deg, got {inclination}")]
    RegimeInclination {
        regime: OrbitRegime,
        inclination: f64,
        max: f64,
    },

    #[error("Invalid sample domain: start={start}, end={end}, step={step}")]
    InvalidDomain { start: f64, end: f64, step: f64 },
}
