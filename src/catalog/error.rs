//! Catalog error types.

use super::ScenarioId;
use crate::core::CallId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating scenarios
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Scenario JSON could not be decoded
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scenario file or directory could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two scenarios share an identifier
    #[error("Scenario '{0}' is defined more than once")]
    DuplicateScenario(ScenarioId),

    /// Scenario definition is internally inconsistent
    #[error("Scenario '{id}' is invalid: {reason}")]
    Invalid { id: ScenarioId, reason: String },

    /// A call id appears twice in the arrival schedule
    #[error("Scenario '{id}' schedules call {call} more than once")]
    DuplicateCall { id: ScenarioId, call: CallId },
}
