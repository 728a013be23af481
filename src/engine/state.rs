//! Serializable state of one simulation.

use crate::catalog::ScenarioId;
use crate::core::{CallQueue, Elevator, ElevatorId, ElevatorUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything that changes while a simulation runs, plus who owns it.
///
/// This is the value handed out by [`Simulation::snapshot`](super::Simulation::snapshot)
/// and carried by checkpoints. It owns all of its data, so a copy never
/// shares anything mutable with the simulation it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SimulationState<E: ElevatorUnit = Elevator> {
    /// Caller the simulation belongs to
    pub user_key: String,
    /// Opaque session token
    pub token: String,
    /// When the simulation was created
    pub created_at: DateTime<Utc>,
    pub scenario_id: ScenarioId,
    /// Discrete time step, starting at 0
    pub timestamp: u32,
    /// Calls waiting to be boarded
    pub calls: CallQueue,
    /// Elevator units ordered by id
    pub elevators: Vec<E>,
}

impl<E: ElevatorUnit> SimulationState<E> {
    pub fn elevator(&self, id: ElevatorId) -> Option<&E> {
        self.elevators.get(id.index())
    }

    /// Number of calls currently riding in any elevator.
    pub fn passenger_count(&self) -> usize {
        self.elevators.iter().map(|e| e.passengers().len()).sum()
    }

    /// One-line progress report.
    pub fn summary(&self) -> String {
        format!(
            "Step: {} | Waiting: {} | Riding: {} | Delivered: {}",
            self.timestamp,
            self.calls.len(),
            self.passenger_count(),
            self.calls.finished().len()
        )
    }
}
