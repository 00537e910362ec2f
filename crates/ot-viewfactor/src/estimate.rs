//! Monte Carlo view-factor estimation.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ViewFactorError, ViewFactorResult};
use crate::geometry::{Geometry, Vec3};

/// Ray budget presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RayPreset {
    Fast,
    #[default]
    Default,
    High,
}

impl RayPreset {
    pub fn n_rays(self) -> usize {
        match self {
            RayPreset::Fast => 10_000,
            RayPreset::Default => 100_000,
            RayPreset::High => 1_000_000,
        }
    }
}

fn default_rays() -> usize {
    RayPreset::default().n_rays()
}

fn default_chunk_size() -> usize {
    4096
}

/// Estimate of `F(from → to)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewFactorRequest {
    pub from: String,
    pub to: String,
    #[serde(default = "default_rays")]
    pub n_rays: usize,
    #[serde(default)]
    pub seed: u64,
    /// Rays per independent random stream.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl ViewFactorRequest {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            n_rays: RayPreset::default().n_rays(),
            seed: 0,
            chunk_size: default_chunk_size(),
        }
    }

    pub fn with_preset(mut self, preset: RayPreset) -> Self {
        self.n_rays = preset.n_rays();
        self
    }

    pub fn with_rays(mut self, n_rays: usize) -> Self {
        self.n_rays = n_rays;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.n_rays.div_ceil(self.chunk_size)
    }

    /// Rays traced by chunk `chunk`.
    pub(crate) fn chunk_rays(&self, chunk: usize) -> usize {
        let start = chunk * self.chunk_size;
        self.chunk_size.min(self.n_rays - start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewFactorEstimate {
    pub from: String,
    pub to: String,
    pub from_node: String,
    pub to_node: String,
    /// m²
    pub from_area: f64,
    /// m²
    pub to_area: f64,
    pub view_factor: f64,
    /// `sqrt(F(1−F)/n)`
    pub standard_error: f64,
    pub n_rays: usize,
    pub hits: usize,
}

impl ViewFactorEstimate {
    /// `F(to → from)` by reciprocity.
    pub fn reciprocal(&self) -> f64 {
        self.view_factor * self.from_area / self.to_area
    }
}

/// Surfaces of a validated request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pair {
    pub from: usize,
    pub to: usize,
}

pub(crate) fn resolve(geometry: &Geometry, request: &ViewFactorRequest) -> ViewFactorResult<Pair> {
    if request.n_rays == 0 {
        return Err(ViewFactorError::InvalidRequest {
            what: "n_rays must be positive".into(),
        });
    }
    if request.chunk_size == 0 {
        return Err(ViewFactorError::InvalidRequest {
            what: "chunk_size must be positive".into(),
        });
    }
    let from = geometry.surface_index(&request.from)?;
    let to = geometry.surface_index(&request.to)?;
    if from == to {
        return Err(ViewFactorError::InvalidRequest {
            what: format!("surface {} cannot view itself", request.from),
        });
    }
    Ok(Pair { from, to })
}

/// Random stream of one chunk. Depends only on `(seed, chunk)`, so results do not
/// depend on how chunks are scheduled.
pub(crate) fn chunk_rng(seed: u64, chunk: usize) -> Pcg64 {
    let stream = chunk as u64 + 1;
    Pcg64::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// Orthonormal `(t1, t2)` completing `n` to a right-handed frame.
fn tangent_frame(n: &Vec3) -> (Vec3, Vec3) {
    let helper = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let t1 = n.cross(&helper).normalize();
    let t2 = n.cross(&t1);
    (t1, t2)
}

/// Cosine-weighted hemisphere direction about `n` (Malley's method).
fn cosine_direction<R: Rng>(rng: &mut R, n: &Vec3) -> Vec3 {
    let r = rng.r#gen::<f64>().sqrt();
    let phi = 2.0 * PI * rng.r#gen::<f64>();
    let z = (1.0 - r * r).max(0.0).sqrt();
    let (t1, t2) = tangent_frame(n);
    t1 * (r * phi.cos()) + t2 * (r * phi.sin()) + n * z
}

/// Trace one chunk and return its hits on `pair.to`.
pub(crate) fn trace_chunk(
    geometry: &Geometry,
    pair: Pair,
    cdf: &[f64],
    request: &ViewFactorRequest,
    chunk: usize,
) -> usize {
    let source = &geometry.surfaces[pair.from];
    let mut rng = chunk_rng(request.seed, chunk);
    let mut hits = 0;
    for _ in 0..request.chunk_rays(chunk) {
        let pick: f64 = rng.r#gen();
        let ti = cdf.partition_point(|&c| c < pick).min(cdf.len() - 1);
        let tri = &source.triangles[ti];
        let origin = tri.sample_point(rng.r#gen(), rng.r#gen());
        let dir = cosine_direction(&mut rng, &tri.normal());
        if geometry.nearest_hit(&origin, &dir) == Some(pair.to) {
            hits += 1;
        }
    }
    hits
}

pub(crate) fn finish(
    geometry: &Geometry,
    pair: Pair,
    request: &ViewFactorRequest,
    hits: usize,
) -> ViewFactorEstimate {
    let n = request.n_rays as f64;
    let f = hits as f64 / n;
    let from = &geometry.surfaces[pair.from];
    let to = &geometry.surfaces[pair.to];
    ViewFactorEstimate {
        from: from.id.clone(),
        to: to.id.clone(),
        from_node: from.node_id.clone(),
        to_node: to.node_id.clone(),
        from_area: from.area(),
        to_area: to.area(),
        view_factor: f,
        standard_error: (f * (1.0 - f) / n).sqrt(),
        n_rays: request.n_rays,
        hits,
    }
}

/// Estimate one view factor, tracing chunks in parallel on the current rayon pool.
///
/// The result is identical for a given seed whatever the number of threads.
pub fn estimate(geometry: &Geometry, request: &ViewFactorRequest) -> ViewFactorResult<ViewFactorEstimate> {
    geometry.validate()?;
    let pair = resolve(geometry, request)?;
    let cdf = geometry.surfaces[pair.from].area_cdf();
    let hits: usize = (0..request.chunk_count())
        .into_par_iter()
        .map(|chunk| trace_chunk(geometry, pair, &cdf, request, chunk))
        .sum();
    let result = finish(geometry, pair, request, hits);
    debug!(
        from = %result.from,
        to = %result.to,
        f = result.view_factor,
        se = result.standard_error,
        "view factor estimated"
    );
    Ok(result)
}
