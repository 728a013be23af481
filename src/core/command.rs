//! Commands addressed to elevators and the per-step action that bundles them.

use super::call::CallId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal id of an elevator, `0..N` within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElevatorId(pub usize);

impl ElevatorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an elevator is told to do for one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Stop,
    Up,
    Down,
    Open,
    Close,
    Enter,
    Exit,
}

impl CommandKind {
    /// Boarding and alighting change the call queue as well as the elevator.
    pub fn touches_calls(self) -> bool {
        matches!(self, Self::Enter | Self::Exit)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Enter => "ENTER",
            Self::Exit => "EXIT",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One instruction to one elevator.
///
/// `call_ids` names the calls boarded by `ENTER` or alighted by `EXIT` and is
/// empty for every other kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub elevator_id: ElevatorId,
    pub command: CommandKind,
    #[serde(default)]
    pub call_ids: Vec<CallId>,
}

impl Command {
    pub fn new(elevator_id: ElevatorId, command: CommandKind) -> Self {
        Self {
            elevator_id,
            command,
            call_ids: Vec::new(),
        }
    }

    pub fn enter(elevator_id: ElevatorId, call_ids: Vec<CallId>) -> Self {
        Self {
            elevator_id,
            command: CommandKind::Enter,
            call_ids,
        }
    }

    pub fn exit(elevator_id: ElevatorId, call_ids: Vec<CallId>) -> Self {
        Self {
            elevator_id,
            command: CommandKind::Exit,
            call_ids,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.command
    }
}

/// The caller's batch of commands for a single time step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub commands: Vec<Command>,
}

impl Action {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Decode the transport's JSON form of an action.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for Action {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
