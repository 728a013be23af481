//! Structural violations of an action.

use crate::core::ElevatorId;
use thiserror::Error;

/// Ways an action can be malformed before any elevator is consulted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionViolation {
    #[error("Expected one command per elevator ({expected}), got {got}")]
    WrongCommandCount { expected: usize, got: usize },

    #[error("Elevator {0} is addressed more than once")]
    DuplicateElevator(ElevatorId),

    #[error("Elevator {id} does not exist (elevator count: {count})")]
    UnknownElevator { id: ElevatorId, count: usize },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}
