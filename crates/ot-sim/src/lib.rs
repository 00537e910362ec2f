//! Transient integration of thermal networks.
//!
//! Provides:
//! - a generic [`TransientModel`] trait and RK4 with Richardson error estimation
//! - [`ThermalModel`], the network right-hand side with arithmetic-node relaxation
//! - an adaptive runner that fills a caller-owned [`TransientRecord`]
//! - the whole-network [`EnergyBalance`] check

pub mod energy;
pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod thermal;

pub use energy::{EnergyBalance, steady_energy_balance};
pub use error::{SimError, SimResult};
pub use integrator::{Integrator, RK4, StepAttempt, richardson_step};
pub use model::TransientModel;
pub use sim::{
    SimProgress, StepStats, TransientOptions, TransientRecord, TransientSummary, run_transient,
    run_transient_with_progress,
};
pub use thermal::{ThermalModel, ThermalState};
