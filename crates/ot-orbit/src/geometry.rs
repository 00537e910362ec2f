//! Circular-orbit frame and Earth view factors.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;

/// Orientation of a circular orbit in the equatorial inertial frame.
#[derive(Debug, Clone, Copy)]
pub struct OrbitFrame {
    /// Direction of the ascending node.
    node: Vector3<f64>,
    /// In-plane direction 90 deg ahead of the node.
    ahead: Vector3<f64>,
    /// Orbit normal (angular momentum direction).
    normal: Vector3<f64>,
}

/// Unit vectors describing where the spacecraft is and where it is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub radial: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl OrbitFrame {
    pub fn new(inclination_deg: f64, raan_deg: f64) -> Self {
        let (si, ci) = inclination_deg.to_radians().sin_cos();
        let (so, co) = raan_deg.to_radians().sin_cos();
        Self {
            node: Vector3::new(co, so, 0.0),
            ahead: Vector3::new(-so * ci, co * ci, si),
            normal: Vector3::new(so * si, -co * si, ci),
        }
    }

    /// Attitude at argument of latitude `u` (radians from the ascending node).
    pub fn attitude(&self, u: f64) -> Attitude {
        let (su, cu) = u.sin_cos();
        Attitude {
            radial: self.node * cu + self.ahead * su,
            velocity: self.ahead * cu - self.node * su,
            normal: self.normal,
        }
    }
}

/// True when a spacecraft at `position` (km) is inside the cylindrical Earth shadow
/// cast along `sun`.
pub fn in_cylindrical_shadow(position: &Vector3<f64>, sun: &Vector3<f64>, earth_radius: f64) -> bool {
    let along = position.dot(sun);
    if along >= 0.0 {
        return false;
    }
    (position - sun * along).norm() < earth_radius
}

/// View factor from a flat plate to the Earth disc.
///
/// `h_ratio` is orbit radius over Earth radius; `lambda` is the angle (radians)
/// between the plate normal and nadir. The plate sees the full disc when
/// `lambda <= pi/2 - phi`, nothing when `lambda >= pi/2 + phi`, and the partial-disc
/// expression in between (`phi` being the Earth half-angle).
pub fn earth_view_factor(h_ratio: f64, lambda: f64) -> f64 {
    if h_ratio <= 1.0 {
        return 0.0;
    }
    let half_angle = (1.0 / h_ratio).asin();
    let h2 = h_ratio * h_ratio;

    if lambda <= FRAC_PI_2 - half_angle {
        return lambda.cos() / h2;
    }
    if lambda >= FRAC_PI_2 + half_angle {
        return 0.0;
    }

    let x = (h2 - 1.0).sqrt();
    let (sin_l, cos_l) = lambda.sin_cos();
    let asin_arg = (x / (h_ratio * sin_l)).clamp(-1.0, 1.0);
    let acos_arg = (-x * cos_l / sin_l).clamp(-1.0, 1.0);
    let root = (1.0 - h2 * cos_l * cos_l).max(0.0).sqrt();

    let f = 0.5 - asin_arg.asin() / PI + (cos_l * acos_arg.acos() - x * root) / (PI * h2);
    f.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn frame_is_orthonormal() {
        let frame = OrbitFrame::new(51.6, 123.0);
        for u in [0.0, 0.7, 2.0, 4.5] {
            let a = frame.attitude(u);
            assert_relative_eq!(a.radial.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(a.velocity.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(a.radial.dot(&a.velocity), 0.0, epsilon = 1e-12);
            assert_relative_eq!(a.radial.cross(&a.velocity), a.normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn equatorial_normal_points_north() {
        let frame = OrbitFrame::new(0.0, 0.0);
        assert_relative_eq!(frame.attitude(0.0).normal, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn shadow_behind_earth_only() {
        let sun = Vector3::x();
        let r = 6778.0;
        assert!(in_cylindrical_shadow(&Vector3::new(-r, 0.0, 0.0), &sun, 6378.0));
        assert!(!in_cylindrical_shadow(&Vector3::new(r, 0.0, 0.0), &sun, 6378.0));
        assert!(!in_cylindrical_shadow(&Vector3::new(0.0, r, 0.0), &sun, 6378.0));
    }

    #[test]
    fn nadir_plate_sees_full_disc() {
        let h = 6778.0 / 6378.0;
        assert_relative_eq!(earth_view_factor(h, 0.0), 1.0 / (h * h), epsilon = 1e-12);
        assert_eq!(earth_view_factor(h, PI), 0.0);
    }

    #[test]
    fn continuous_at_full_disc_edge() {
        let h: f64 = 1.5;
        let edge = FRAC_PI_2 - (1.0 / h).asin();
        let inside = earth_view_factor(h, edge - 1e-9);
        let outside = earth_view_factor(h, edge + 1e-9);
        assert_relative_eq!(inside, outside, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn view_factor_bounded_and_monotone(h in 1.01f64..10.0, a in 0.0f64..3.1, b in 0.0f64..3.1) {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let f_lo = earth_view_factor(h, lo);
            let f_hi = earth_view_factor(h, hi);
            prop_assert!((0.0..=1.0).contains(&f_lo));
            prop_assert!(f_hi <= f_lo + 1e-7);
        }
    }
}
