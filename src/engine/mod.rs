//! The simulation instance: step validation, step application and completion.
//!
//! # Key Concepts
//!
//! - **Two-phase step**: an action is dry-run against a copy of the call
//!   queue, then applied to the real elevators and queue only if every
//!   command passed
//! - **Atomic rejection**: a rejected action leaves no trace, the time step
//!   included
//! - **Completion**: the schedule is exhausted, no call waits and no
//!   elevator carries anyone

mod error;
mod simulation;
mod state;

pub use error::StepError;
pub use simulation::Simulation;
pub use state::SimulationState;
