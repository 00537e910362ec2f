//! ot-core: stable foundation for orbitherm.
//!
//! Contains:
//! - units (uom SI types + constructors + orbital constants)
//! - numeric (Real + tolerances + float helpers + SIGMA)
//! - ids (compact dense indices for solver arrays)
//! - timing (wall-clock budgets for runs)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{OtError, OtResult};
pub use ids::*;
pub use numeric::*;
pub use timing::{Deadline, Stopwatch};
pub use units::*;
