// ot-core/src/units.rs

use uom::si::f64::{Power as UomPower, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Power = UomPower;
pub type Time = UomTime;

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

/// Seconds value of a time.
#[inline]
pub fn as_seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

pub mod constants {
    /// Earth equatorial radius (km).
    pub const EARTH_RADIUS_KM: f64 = 6378.137;
    /// Earth gravitational parameter (km³/s²).
    pub const MU_EARTH_KM3_S2: f64 = 398_600.441_8;
    /// Nominal solar constant at 1 AU (W/m²).
    pub const SOLAR_CONSTANT_W_M2: f64 = 1361.0;
    /// Nominal Earth bond albedo coefficient.
    pub const EARTH_ALBEDO: f64 = 0.306;
    /// Nominal Earth outgoing longwave flux (W/m²).
    pub const EARTH_IR_W_M2: f64 = 237.0;
}
