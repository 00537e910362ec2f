//! Monte Carlo radiative view factors between triangulated surfaces.
//!
//! Rays leave area-weighted random points of the emitting surface in cosine-weighted
//! directions; the factor is the share of rays whose nearest hit lies on the target.
//! Each chunk of rays draws from its own PCG stream derived from the request seed, so
//! an estimate is reproducible whatever the thread count.
//!
//! Long estimates run as a [`ViewFactorJob`] on a background thread that reports
//! progress over a bounded channel and can be cancelled between chunks.

pub mod analytic;
pub mod apply;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod job;

pub use apply::apply_view_factors;
pub use error::{ViewFactorError, ViewFactorResult, WorkerError};
pub use estimate::{RayPreset, ViewFactorEstimate, ViewFactorRequest, estimate};
pub use geometry::{Geometry, Surface, Triangle, Vec3};
pub use job::{JobMessage, ViewFactorJob};
