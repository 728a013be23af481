//! Validation-based structural checks for actions.
//!
//! Before any elevator is asked about its command, an action must address
//! every elevator exactly once. These checks use Stillwater's `Validation`
//! type so that a rejected action reports ALL of its problems, not just the
//! first one found.
//!
//! # Example
//!
//! ```rust
//! use liftgrid::core::{Action, Command, CommandKind, ElevatorId};
//! use liftgrid::validation::{ActionContext, ActionRulesBuilder};
//! use std::time::Duration;
//!
//! let rules = ActionRulesBuilder::new()
//!     .time_budget(Duration::from_secs(30))
//!     .build();
//!
//! let action = Action::new(vec![
//!     Command::new(ElevatorId(0), CommandKind::Stop),
//!     Command::new(ElevatorId(0), CommandKind::Up),
//! ]);
//! let context = ActionContext {
//!     action: &action,
//!     timestamp: 0,
//!     elevator_count: 2,
//!     started_at: chrono::Utc::now(),
//! };
//!
//! assert!(rules.check(&context).is_failure());
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

// Re-export commonly used types
pub use builder::ActionRulesBuilder;
pub use context::ActionContext;
pub use rules::{ActionCheck, ActionRules};
pub use violations::ActionViolation;
