//! Reasons a step is rejected.

use crate::core::{CommandError, ElevatorId};
use crate::validation::ActionViolation;
use thiserror::Error;

/// Errors returned by [`Simulation::step`](super::Simulation::step).
///
/// Every variant except [`StepError::ContractViolation`] leaves the simulation
/// exactly as it was before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StepError {
    #[error("simulation already completed at time step {timestamp}")]
    Completed { timestamp: u32 },

    #[error("action could not be decoded: {0}")]
    Malformed(String),

    #[error("action is malformed: {}", summarize(.0))]
    Invalid(Vec<ActionViolation>),

    #[error("elevator {elevator_id} rejected its command: {source}")]
    Rejected {
        elevator_id: ElevatorId,
        source: CommandError,
    },

    #[error("elevator faulted while validating: {message}")]
    CollaboratorFault { message: String },

    #[error("elevator {elevator_id} failed a validated command: {source}")]
    ContractViolation {
        elevator_id: ElevatorId,
        source: CommandError,
    },
}

impl StepError {
    /// Whether the canonical state is guaranteed untouched.
    pub fn is_clean_rejection(&self) -> bool {
        !matches!(self, Self::ContractViolation { .. })
    }
}

fn summarize(violations: &[ActionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
