//! Core value types of the engine.
//!
//! This module contains the data the simulation is made of:
//! - Calls and the pending call queue
//! - Commands and the per-step action
//! - The elevator unit contract and its reference implementation
//! - The history of accepted steps

mod call;
mod command;
mod elevator;
mod history;

pub use call::{Call, CallId, CallQueue, Direction};
pub use command::{Action, Command, CommandKind, ElevatorId};
pub use elevator::{CommandError, Elevator, ElevatorStatus, ElevatorUnit, QueueScope};
pub use history::{StepHistory, StepRecord};
