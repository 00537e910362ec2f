//! Triangulated radiating surfaces and ray intersection.

use std::collections::HashSet;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ViewFactorError, ViewFactorResult};

pub type Vec3 = Vector3<f64>;

/// Rays closer than this to their origin do not count as hits (m).
const HIT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    fn cross(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    pub fn area(&self) -> f64 {
        0.5 * self.cross().norm()
    }

    /// Unit normal following the right-hand winding `a → b → c`.
    pub fn normal(&self) -> Vec3 {
        self.cross().normalize()
    }

    /// Uniform point for `(u1, u2)` in the unit square.
    pub fn sample_point(&self, u1: f64, u2: f64) -> Vec3 {
        let s = u1.sqrt();
        self.a * (1.0 - s) + self.b * (s * (1.0 - u2)) + self.c * (s * u2)
    }

    /// Distance along `dir` to the triangle (Möller–Trumbore), two-sided.
    pub fn intersect(&self, origin: &Vec3, dir: &Vec3) -> Option<f64> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = dir.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < 1e-14 {
            return None;
        }
        let inv = 1.0 / det;
        let s = origin - self.a;
        let u = s.dot(&p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = dir.dot(&q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv;
        (t > HIT_EPSILON).then_some(t)
    }
}

/// A radiating surface belonging to one network node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Surface {
    pub id: String,
    pub node_id: String,
    pub triangles: Vec<Triangle>,
}

impl Surface {
    /// Parallelogram with corner `origin` and edges `u`, `v`; the normal is `u × v`.
    pub fn rectangle(id: &str, node_id: &str, origin: Vec3, u: Vec3, v: Vec3) -> Self {
        Self {
            id: id.to_string(),
            node_id: node_id.to_string(),
            triangles: vec![
                Triangle::new(origin, origin + u, origin + u + v),
                Triangle::new(origin, origin + u + v, origin + v),
            ],
        }
    }

    pub fn area(&self) -> f64 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Cumulative triangle areas normalised to end at 1.
    pub(crate) fn area_cdf(&self) -> Vec<f64> {
        let total = self.area();
        let mut acc = 0.0;
        self.triangles
            .iter()
            .map(|t| {
                acc += t.area() / total;
                acc
            })
            .collect()
    }
}

/// The full set of surfaces rays can hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    pub surfaces: Vec<Surface>,
}

impl Geometry {
    pub fn new(surfaces: Vec<Surface>) -> ViewFactorResult<Self> {
        let geometry = Self { surfaces };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> ViewFactorResult<()> {
        let mut seen = HashSet::new();
        for s in &self.surfaces {
            if !seen.insert(s.id.as_str()) {
                return Err(ViewFactorError::DuplicateSurface { id: s.id.clone() });
            }
            if s.triangles.is_empty() {
                return Err(ViewFactorError::EmptySurface { id: s.id.clone() });
            }
            for (index, t) in s.triangles.iter().enumerate() {
                let area = t.area();
                if !area.is_finite() || area <= 0.0 {
                    return Err(ViewFactorError::DegenerateTriangle {
                        surface: s.id.clone(),
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn surface_index(&self, id: &str) -> ViewFactorResult<usize> {
        self.surfaces
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ViewFactorError::UnknownSurface { id: id.to_string() })
    }

    /// Surface of the closest triangle hit by the ray, if any.
    pub fn nearest_hit(&self, origin: &Vec3, dir: &Vec3) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (si, s) in self.surfaces.iter().enumerate() {
            for t in &s.triangles {
                if let Some(d) = t.intersect(origin, dir)
                    && best.is_none_or(|(_, bd)| d < bd)
                {
                    best = Some((si, d));
                }
            }
        }
        best.map(|(si, _)| si)
    }
}
