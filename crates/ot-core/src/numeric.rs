use crate::OtError;

/// Floating point type used throughout system
pub type Real = f64;

/// Stefan–Boltzmann constant [W/(m² K⁴)].
pub const SIGMA: Real = 5.670e-8;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, OtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(OtError::NonFinite { what, value: v })
    }
}

/// Piecewise-linear interpolation over `(x, y)` points sorted by strictly increasing `x`.
///
/// Outside the table the boundary value is returned unchanged; an exact match on a
/// table abscissa returns that ordinate exactly.
pub fn interp_flat(points: &[(Real, Real)], x: Real) -> Option<Real> {
    let (first, last) = (points.first()?, points.last()?);
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    // First index whose abscissa is >= x; guaranteed in 1..len by the checks above.
    let hi = points.partition_point(|p| p.0 < x);
    let (x1, y1) = points[hi];
    if x1 == x {
        return Some(y1);
    }
    let (x0, y0) = points[hi - 1];
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

/// Local slope of [`interp_flat`] at `x` (zero outside the table).
pub fn interp_flat_slope(points: &[(Real, Real)], x: Real) -> Real {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= first.0 || x >= last.0 {
        return 0.0;
    }
    let hi = points.partition_point(|p| p.0 <= x).min(points.len() - 1);
    let (x0, y0) = points[hi - 1];
    let (x1, y1) = points[hi];
    (y1 - y0) / (x1 - x0)
}

/// True if the abscissae are strictly increasing.
pub fn strictly_increasing(points: &[(Real, Real)]) -> bool {
    points.windows(2).all(|w| w[1].0 > w[0].0)
}
