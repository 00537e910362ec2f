//! Design-space exploration over parameter ranges.
//!
//! Points are drawn by independent random streams or latin hypercube stratification,
//! applied to copies of a baseline snapshot and run through the engine in parallel.
//! Failed runs are kept as infeasible samples so one bad design never aborts a batch.

pub mod constraints;
pub mod error;
pub mod explore;
pub mod sampling;
pub mod space;

pub use constraints::TemperatureLimit;
pub use error::{ExploreError, ExploreResult};
pub use explore::{
    Exploration, ExploreOptions, ExploreSummary, SampleResult, evaluate_point, explore,
};
pub use sampling::{SamplingMethod, design_points, latin_hypercube, random_point};
pub use space::{ParamRange, apply_point};
