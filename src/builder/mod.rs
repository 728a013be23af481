//! Builder API for creating simulations.
//!
//! The scenario catalog is passed in at build time rather than looked up from
//! any global, so tests and services can hand in whatever catalog they hold.

pub mod error;
pub mod simulation;

pub use error::BuildError;
pub use simulation::SimulationBuilder;
