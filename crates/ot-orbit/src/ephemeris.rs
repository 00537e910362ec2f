//! Low-precision solar ephemeris.
//!
//! Uses the Astronomical Almanac approximation (about 0.01 deg over 1950-2050), which
//! is far below the accuracy a lumped thermal model can resolve.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

/// Julian date of the Unix epoch.
const JD_UNIX_EPOCH: f64 = 2_440_587.5;
/// Julian date of J2000.0.
const JD_J2000: f64 = 2_451_545.0;

/// Julian date of a UTC instant.
pub fn julian_date(at: &DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9;
    JD_UNIX_EPOCH + seconds / 86_400.0
}

/// Unit vector from the Earth to the sun in the equatorial inertial frame at
/// Julian date `jd`.
pub fn sun_direction(jd: f64) -> Vector3<f64> {
    let n = jd - JD_J2000;
    let mean_longitude = (280.460 + 0.985_647_4 * n).to_radians();
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let ecliptic_longitude = mean_longitude
        + 1.915_f64.to_radians() * mean_anomaly.sin()
        + 0.020_f64.to_radians() * (2.0 * mean_anomaly).sin();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    Vector3::new(
        ecliptic_longitude.cos(),
        obliquity.cos() * ecliptic_longitude.sin(),
        obliquity.sin() * ecliptic_longitude.sin(),
    )
}
