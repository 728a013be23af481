//! Checkpoint error types.

use crate::catalog::ScenarioId;
use thiserror::Error;

/// Errors that can occur while saving or restoring a simulation
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Encoding to JSON or bincode failed
    #[error("Failed to encode checkpoint as {format}: {reason}")]
    Encode { format: &'static str, reason: String },

    /// Decoding from JSON or bincode failed
    #[error("Failed to decode {format} checkpoint: {reason}")]
    Decode { format: &'static str, reason: String },

    /// Checkpoint was written by an incompatible format version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint contents contradict each other or the scenario
    #[error("Checkpoint is inconsistent: {0}")]
    Inconsistent(String),

    /// The checkpoint's scenario is not in the catalog it is resumed against
    #[error("Scenario '{0}' is not in the catalog")]
    UnknownScenario(ScenarioId),
}
