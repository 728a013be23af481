//! Elevator units and the capability contract the engine drives them through.
//!
//! The engine never touches an elevator's fields. It asks the unit whether a
//! command is legal against some call state, lets it apply the queue-visible
//! side effect of boarding and alighting, and finally lets it execute the
//! command for real. [`Elevator`] is the reference unit implementing the
//! standard puzzle rules.

use super::call::{Call, CallId, CallQueue};
use super::command::{Command, CommandKind, ElevatorId};
use crate::catalog::Scenario;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Debug};
use thiserror::Error;

/// Which call queue an [`ElevatorUnit::update_calls`] call is acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueScope {
    /// Disposable copy used while validating an action
    Snapshot,
    /// The simulation's canonical queue
    Live,
}

/// Reasons an elevator refuses a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("command addressed to elevator {got} was given to elevator {expected}")]
    WrongElevator { expected: ElevatorId, got: ElevatorId },

    #[error("{command} is not allowed while {status}")]
    IllegalTransition {
        command: CommandKind,
        status: ElevatorStatus,
    },

    #[error("{command} from floor {floor} would leave the shaft")]
    NoFloorBeyond { command: CommandKind, floor: u32 },

    #[error("{command} needs at least one call id")]
    MissingCalls { command: CommandKind },

    #[error("{command} does not take call ids")]
    UnexpectedCalls { command: CommandKind },

    #[error("call {0} is named more than once")]
    DuplicateCall(CallId),

    #[error("call {0} is not waiting")]
    NotWaiting(CallId),

    #[error("call {call} waits on floor {start}, elevator is on floor {floor}")]
    WrongFloor { call: CallId, start: u32, floor: u32 },

    #[error("boarding {boarding} would exceed capacity {capacity} ({aboard} aboard)")]
    OverCapacity {
        capacity: usize,
        aboard: usize,
        boarding: usize,
    },

    #[error("call {0} is not aboard")]
    NotAboard(CallId),

    #[error("call {call} is bound for floor {end}, elevator is on floor {floor}")]
    NotDestination { call: CallId, end: u32, floor: u32 },
}

/// Capability surface of one elevator shaft.
///
/// The three operations must agree: whenever `is_executable` accepts a command
/// against some call state, `execute` against an equal live state succeeds.
/// `is_executable` and `update_calls` may be handed disposable copies and must
/// not rely on seeing the canonical queue.
pub trait ElevatorUnit:
    Clone + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Build the unit with ordinal `id` for a scenario.
    fn from_scenario(id: ElevatorId, scenario: &Scenario) -> Self;

    fn id(&self) -> ElevatorId;

    /// Calls currently riding in this elevator.
    fn passengers(&self) -> &[Call];

    fn is_carrying(&self) -> bool {
        !self.passengers().is_empty()
    }

    /// Pure legality check of `command` against `calls`.
    fn is_executable(&self, calls: &CallQueue, command: &Command) -> Result<(), CommandError>;

    /// Apply the queue-visible effect of a boarding or alighting command.
    ///
    /// Commands that do not touch calls are a no-op.
    fn update_calls(
        &self,
        calls: &mut CallQueue,
        command: &Command,
        scope: QueueScope,
    ) -> Result<(), CommandError>;

    /// Apply the full effect of `command` to this elevator and the live queue.
    fn execute(&mut self, calls: &mut CallQueue, command: &Command) -> Result<(), CommandError>;
}

/// Door and motion state of an [`Elevator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElevatorStatus {
    Stopped,
    Opened,
    Upward,
    Downward,
}

impl fmt::Display for ElevatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "STOPPED",
            Self::Opened => "OPENED",
            Self::Upward => "UPWARD",
            Self::Downward => "DOWNWARD",
        })
    }
}

/// Reference elevator unit.
///
/// Floors are numbered `0..floor_count`. The car starts stopped on floor 0
/// with its doors closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elevator {
    id: ElevatorId,
    floor: u32,
    floor_count: u32,
    capacity: usize,
    status: ElevatorStatus,
    passengers: Vec<Call>,
}

impl Elevator {
    pub fn new(id: ElevatorId, floor_count: u32, capacity: usize) -> Self {
        Self {
            id,
            floor: 0,
            floor_count,
            capacity,
            status: ElevatorStatus::Stopped,
            passengers: Vec::new(),
        }
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn floor_count(&self) -> u32 {
        self.floor_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn status(&self) -> ElevatorStatus {
        self.status
    }

    fn illegal(&self, command: CommandKind) -> CommandError {
        CommandError::IllegalTransition {
            command,
            status: self.status,
        }
    }

    fn require_open(&self, command: CommandKind) -> Result<(), CommandError> {
        if self.status == ElevatorStatus::Opened {
            Ok(())
        } else {
            Err(self.illegal(command))
        }
    }

    fn passenger(&self, id: CallId) -> Option<&Call> {
        self.passengers.iter().find(|call| call.id == id)
    }

    fn check_enter(&self, calls: &CallQueue, ids: &[CallId]) -> Result<(), CommandError> {
        self.require_open(CommandKind::Enter)?;
        check_call_ids(CommandKind::Enter, ids)?;

        for &id in ids {
            let call = calls.find(id).ok_or(CommandError::NotWaiting(id))?;
            if call.start != self.floor {
                return Err(CommandError::WrongFloor {
                    call: id,
                    start: call.start,
                    floor: self.floor,
                });
            }
        }

        if self.passengers.len() + ids.len() > self.capacity {
            return Err(CommandError::OverCapacity {
                capacity: self.capacity,
                aboard: self.passengers.len(),
                boarding: ids.len(),
            });
        }
        Ok(())
    }

    fn check_exit(&self, ids: &[CallId]) -> Result<(), CommandError> {
        self.require_open(CommandKind::Exit)?;
        check_call_ids(CommandKind::Exit, ids)?;

        for &id in ids {
            let call = self.passenger(id).ok_or(CommandError::NotAboard(id))?;
            // Alighting short of the destination would put a call back in the
            // queue outside the arrival schedule.
            if call.end != self.floor {
                return Err(CommandError::NotDestination {
                    call: id,
                    end: call.end,
                    floor: self.floor,
                });
            }
        }
        Ok(())
    }
}

fn check_call_ids(command: CommandKind, ids: &[CallId]) -> Result<(), CommandError> {
    if ids.is_empty() {
        return Err(CommandError::MissingCalls { command });
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) {
            return Err(CommandError::DuplicateCall(id));
        }
    }
    Ok(())
}

impl ElevatorUnit for Elevator {
    fn from_scenario(id: ElevatorId, scenario: &Scenario) -> Self {
        Self::new(id, scenario.floor_count, scenario.capacity)
    }

    fn id(&self) -> ElevatorId {
        self.id
    }

    fn passengers(&self) -> &[Call] {
        &self.passengers
    }

    fn is_executable(&self, calls: &CallQueue, command: &Command) -> Result<(), CommandError> {
        if command.elevator_id != self.id {
            return Err(CommandError::WrongElevator {
                expected: self.id,
                got: command.elevator_id,
            });
        }

        let kind = command.kind();
        if !kind.touches_calls() && !command.call_ids.is_empty() {
            return Err(CommandError::UnexpectedCalls { command: kind });
        }

        match kind {
            CommandKind::Stop => match self.status {
                ElevatorStatus::Opened => Err(self.illegal(kind)),
                _ => Ok(()),
            },
            CommandKind::Up => match self.status {
                ElevatorStatus::Stopped | ElevatorStatus::Upward => {
                    if self.floor + 1 >= self.floor_count {
                        Err(CommandError::NoFloorBeyond {
                            command: kind,
                            floor: self.floor,
                        })
                    } else {
                        Ok(())
                    }
                }
                _ => Err(self.illegal(kind)),
            },
            CommandKind::Down => match self.status {
                ElevatorStatus::Stopped | ElevatorStatus::Downward => {
                    if self.floor == 0 {
                        Err(CommandError::NoFloorBeyond {
                            command: kind,
                            floor: self.floor,
                        })
                    } else {
                        Ok(())
                    }
                }
                _ => Err(self.illegal(kind)),
            },
            CommandKind::Open => match self.status {
                ElevatorStatus::Stopped | ElevatorStatus::Opened => Ok(()),
                _ => Err(self.illegal(kind)),
            },
            CommandKind::Close => self.require_open(kind),
            CommandKind::Enter => self.check_enter(calls, &command.call_ids),
            CommandKind::Exit => self.check_exit(&command.call_ids),
        }
    }

    fn update_calls(
        &self,
        calls: &mut CallQueue,
        command: &Command,
        scope: QueueScope,
    ) -> Result<(), CommandError> {
        match command.kind() {
            CommandKind::Enter => {
                for &id in &command.call_ids {
                    calls.take(id).ok_or(CommandError::NotWaiting(id))?;
                }
                if scope == QueueScope::Live {
                    debug!(
                        "elevator {} boarded {:?} on floor {}",
                        self.id, command.call_ids, self.floor
                    );
                }
            }
            CommandKind::Exit => {
                let mut alighting = Vec::with_capacity(command.call_ids.len());
                for &id in &command.call_ids {
                    let call = self.passenger(id).ok_or(CommandError::NotAboard(id))?;
                    alighting.push(call.clone());
                }
                if scope == QueueScope::Live {
                    debug!(
                        "elevator {} delivered {:?} to floor {}",
                        self.id, command.call_ids, self.floor
                    );
                    for call in alighting {
                        calls.finish(call);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn execute(&mut self, calls: &mut CallQueue, command: &Command) -> Result<(), CommandError> {
        self.is_executable(calls, command)?;

        match command.kind() {
            CommandKind::Stop => self.status = ElevatorStatus::Stopped,
            CommandKind::Up => {
                self.floor += 1;
                self.status = ElevatorStatus::Upward;
            }
            CommandKind::Down => {
                self.floor -= 1;
                self.status = ElevatorStatus::Downward;
            }
            CommandKind::Open => self.status = ElevatorStatus::Opened,
            CommandKind::Close => self.status = ElevatorStatus::Stopped,
            CommandKind::Enter => {
                let boarding: Vec<Call> = command
                    .call_ids
                    .iter()
                    .filter_map(|&id| calls.find(id).cloned())
                    .collect();
                self.update_calls(calls, command, QueueScope::Live)?;
                self.passengers.extend(boarding);
            }
            CommandKind::Exit => {
                self.update_calls(calls, command, QueueScope::Live)?;
                self.passengers
                    .retain(|call| !command.call_ids.contains(&call.id));
            }
        }
        Ok(())
    }
}
