//! Thermal network solvers.
//!
//! A [`NetworkSnapshot`](ot_network::NetworkSnapshot) is compiled once into a
//! [`ThermalProblem`]: dense per-node arrays, boxed conductor links and compiled heat
//! loads. The steady solver runs Newton on the flux balance of every free node; the
//! transient integrator in `ot-sim` reuses the same problem and the arithmetic-node
//! relaxation defined here.

pub mod error;
pub mod newton;
pub mod problem;
pub mod relax;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use problem::ThermalProblem;
pub use relax::RelaxOptions;
pub use steady::{SteadySolution, solve_steady};
