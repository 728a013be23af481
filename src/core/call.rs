//! Passenger calls and the pending call queue.
//!
//! A call becomes visible to the engine when its scheduled time step arrives.
//! It waits in the [`CallQueue`] until an elevator boards it, rides as a
//! passenger, and is finished when it alights at its destination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario-assigned identifier of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub u32);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Travel direction requested by a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// A passenger request, visible from the time step it was created at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    /// Time step at which the call became visible
    pub timestamp: u32,
    /// Floor the passenger is waiting on
    pub start: u32,
    /// Floor the passenger wants to reach
    pub end: u32,
}

impl Call {
    pub fn new(id: CallId, timestamp: u32, start: u32, end: u32) -> Self {
        Self {
            id,
            timestamp,
            start,
            end,
        }
    }

    pub fn direction(&self) -> Direction {
        if self.end > self.start {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Ordered queue of calls waiting to be boarded.
///
/// The queue grows only through [`CallQueue::admit`] and shrinks only through
/// [`CallQueue::take`]. Calls that alighted at their destination are kept in a
/// separate finished list so progress can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallQueue {
    pending: Vec<Call>,
    finished: Vec<Call>,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly visible calls, keeping arrival order.
    pub fn admit<I>(&mut self, calls: I)
    where
        I: IntoIterator<Item = Call>,
    {
        self.pending.extend(calls);
    }

    /// Remove a pending call by id, preserving the order of the rest.
    pub fn take(&mut self, id: CallId) -> Option<Call> {
        let index = self.pending.iter().position(|call| call.id == id)?;
        Some(self.pending.remove(index))
    }

    pub fn find(&self, id: CallId) -> Option<&Call> {
        self.pending.iter().find(|call| call.id == id)
    }

    pub fn contains(&self, id: CallId) -> bool {
        self.find(id).is_some()
    }

    /// Record a call that reached its destination.
    pub fn finish(&mut self, call: Call) {
        self.finished.push(call);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Call> {
        self.pending.iter()
    }

    pub fn pending(&self) -> &[Call] {
        &self.pending
    }

    pub fn finished(&self) -> &[Call] {
        &self.finished
    }
}
