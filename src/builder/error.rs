//! Build errors for the simulation builder.

use crate::catalog::ScenarioId;
use thiserror::Error;

/// Errors that can occur when building a simulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("User key not specified. Call .user_key(key) before .build()")]
    MissingUserKey,

    #[error("Scenario not specified. Call .scenario(id) before .build()")]
    MissingScenario,

    #[error("Scenario '{0}' is not in the catalog")]
    UnknownScenario(ScenarioId),

    #[error("Cannot run {requested} elevator(s); the scenario allows 1 to {max}")]
    InvalidElevatorCount { requested: usize, max: usize },
}
