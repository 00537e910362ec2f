//! Closed-form view factors for reference geometries.

use std::f64::consts::PI;

/// Directly opposed, aligned parallel rectangles of sides `a × b` separated by `c`.
pub fn parallel_rectangles(a: f64, b: f64, c: f64) -> f64 {
    let x = a / c;
    let y = b / c;
    let x2 = 1.0 + x * x;
    let y2 = 1.0 + y * y;
    let log_term = 0.5 * (x2 * y2 / (x2 + y2 - 1.0)).ln();
    let s = log_term + x * y2.sqrt() * (x / y2.sqrt()).atan() + y * x2.sqrt() * (y / x2.sqrt()).atan()
        - x * x.atan()
        - y * y.atan();
    2.0 * s / (PI * x * y)
}

/// Coaxial parallel discs of radii `r1` (emitter) and `r2` separated by `h`.
pub fn coaxial_discs(r1: f64, r2: f64, h: f64) -> f64 {
    let big_r1 = r1 / h;
    let big_r2 = r2 / h;
    let s = 1.0 + (1.0 + big_r2 * big_r2) / (big_r1 * big_r1);
    0.5 * (s - (s * s - 4.0 * (big_r2 / big_r1).powi(2)).sqrt())
}
