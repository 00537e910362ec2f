//! Run orchestration for thermal networks.
//!
//! [`run`] is the single entry point the rest of the workspace treats as a black box:
//! it validates a snapshot, compiles it, runs the steady solver or the transient
//! integrator under a wall-clock budget, checks the energy balance and packages
//! everything into a [`ResultSnapshot`](ot_results::ResultSnapshot).

pub mod error;
pub mod progress;
pub mod run;

pub use error::{EngineError, EngineResult};
pub use progress::{RunProgressEvent, RunStage, TransientProgress};
pub use run::{ENGINE_VERSION, RetryPolicy, RunOutcome, run, run_with_progress, run_with_retry};
