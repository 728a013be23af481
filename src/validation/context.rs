//! Context provided to action checks.

use crate::core::Action;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// What a check may look at when judging an action
#[derive(Clone, Debug)]
pub struct ActionContext<'a> {
    pub action: &'a Action,
    /// Time step the action would be applied at
    pub timestamp: u32,
    pub elevator_count: usize,
    /// When the simulation was created
    pub started_at: DateTime<Utc>,
}

impl ActionContext<'_> {
    /// Wall-clock age of the simulation
    pub fn elapsed(&self) -> Duration {
        let now = Utc::now();
        now.signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
