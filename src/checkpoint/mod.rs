//! Checkpoint and resume for simulations.
//!
//! A checkpoint is a point-in-time copy of a simulation's state and step
//! history that can be written as JSON or compact bincode, shipped to a
//! client, or stored and later resumed against the same scenario catalog.
//! Action rules are not part of a checkpoint (closures are not serializable).

use crate::core::{ElevatorId, ElevatorUnit, StepHistory};
use crate::engine::SimulationState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of a simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<E: ElevatorUnit> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was taken
    pub taken_at: DateTime<Utc>,

    /// Simulation state at that moment
    pub state: SimulationState<E>,

    /// Every step accepted up to that moment
    pub history: StepHistory,
}

impl<E: ElevatorUnit> Checkpoint<E> {
    pub fn new(state: SimulationState<E>, history: StepHistory) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            state,
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Encode {
            format: "json",
            reason: e.to_string(),
        })
    }

    /// Decode and validate a JSON checkpoint.
    pub fn from_json(raw: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(raw).map_err(|e| CheckpointError::Decode {
            format: "json",
            reason: e.to_string(),
        })?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode {
            format: "bincode",
            reason: e.to_string(),
        })
    }

    /// Decode and validate a bincode checkpoint.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode {
            format: "bincode",
            reason: e.to_string(),
        })?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Check the checkpoint is one this version can resume.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        if self.state.elevators.is_empty() {
            return Err(CheckpointError::Inconsistent(
                "checkpoint has no elevators".to_string(),
            ));
        }

        for (index, elevator) in self.state.elevators.iter().enumerate() {
            if elevator.id() != ElevatorId(index) {
                return Err(CheckpointError::Inconsistent(format!(
                    "elevator at position {} has id {}",
                    index,
                    elevator.id()
                )));
            }
        }

        if let Some(last) = self.history.last() {
            if last.timestamp != self.state.timestamp {
                return Err(CheckpointError::Inconsistent(format!(
                    "history ends at step {} but state is at step {}",
                    last.timestamp, self.state.timestamp
                )));
            }
        }
        Ok(())
    }
}
