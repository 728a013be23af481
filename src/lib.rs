//! Liftgrid: the authoritative state engine for turn-based elevator puzzles
//!
//! A remote controller submits, once per discrete time step, one command for
//! every elevator. The engine validates the whole action against a private
//! copy of the call queue, applies it atomically, admits the calls scheduled
//! for the new step and reports whether the puzzle is solved.
//!
//! # Core Concepts
//!
//! - **Scenario**: immutable puzzle definition looked up in a [`ScenarioCatalog`]
//! - **Elevator unit**: the [`ElevatorUnit`] contract the engine drives
//! - **Simulation**: one run of one scenario, stepped through [`Simulation::advance`]
//! - **Checkpoint**: serializable snapshot a run can be resumed from
//!
//! # Example
//!
//! ```rust
//! use liftgrid::catalog::InMemoryCatalog;
//! use liftgrid::core::{Action, CallId, Command, CommandKind, ElevatorId};
//! use liftgrid::SimulationBuilder;
//!
//! let catalog = InMemoryCatalog::from_json(r#"{
//!     "id": "ride",
//!     "floor_count": 3,
//!     "capacity": 1,
//!     "elevator_count": 1,
//!     "arrivals": [[{"id": 7, "start": 0, "end": 1}]]
//! }"#).unwrap();
//!
//! let mut simulation = SimulationBuilder::new()
//!     .user_key("tester")
//!     .scenario("ride")
//!     .build(&catalog)
//!     .unwrap();
//!
//! let e0 = ElevatorId(0);
//! let script = [
//!     Command::new(e0, CommandKind::Open),
//!     Command::enter(e0, vec![CallId(7)]),
//!     Command::new(e0, CommandKind::Close),
//!     Command::new(e0, CommandKind::Up),
//!     Command::new(e0, CommandKind::Stop),
//!     Command::new(e0, CommandKind::Open),
//!     Command::exit(e0, vec![CallId(7)]),
//! ];
//! for command in script {
//!     assert!(simulation.advance(&Action::new(vec![command])));
//! }
//!
//! assert!(simulation.is_complete());
//! assert_eq!(simulation.timestamp(), 7);
//! ```

pub mod builder;
pub mod catalog;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, SimulationBuilder};
pub use catalog::{InMemoryCatalog, Scenario, ScenarioCatalog, ScenarioId};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use self::core::{Action, Command, CommandKind, Elevator, ElevatorId, ElevatorUnit};
pub use engine::{Simulation, SimulationState, StepError};
