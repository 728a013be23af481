//! Structural rules every action must satisfy.

use crate::core::ElevatorId;
use crate::validation::context::ActionContext;
use crate::validation::violations::ActionViolation;
use std::collections::HashSet;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for validation check functions
pub type ActionCheck = Box<
    dyn Fn(&ActionContext<'_>) -> Validation<(), NonEmptyVec<ActionViolation>> + Send + Sync,
>;

/// Rules an action is held to before any elevator sees it.
///
/// One command per elevator, every id in range and none repeated. Extra
/// checks registered through [`ActionRulesBuilder`](super::ActionRulesBuilder)
/// run after the built-in ones. Uses Validation to accumulate ALL violations.
#[derive(Default)]
pub struct ActionRules {
    pub(crate) required_checks: Vec<ActionCheck>,
}

impl ActionRules {
    /// Rules with only the built-in structural checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every rule, accumulating ALL violations.
    /// Returns Validation::Success(()) if all checks pass.
    /// Returns Validation::Failure with ALL violations if any fail.
    pub fn check(&self, context: &ActionContext<'_>) -> Validation<(), NonEmptyVec<ActionViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ActionViolation>>> = Vec::new();
        let commands = context.action.commands();

        if commands.len() != context.elevator_count {
            checks.push(Validation::fail(ActionViolation::WrongCommandCount {
                expected: context.elevator_count,
                got: commands.len(),
            }));
        }

        let mut seen: HashSet<ElevatorId> = HashSet::with_capacity(commands.len());
        for command in commands {
            let id = command.elevator_id;
            let check = if id.index() >= context.elevator_count {
                Validation::fail(ActionViolation::UnknownElevator {
                    id,
                    count: context.elevator_count,
                })
            } else if !seen.insert(id) {
                Validation::fail(ActionViolation::DuplicateElevator(id))
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    pub fn custom_check_count(&self) -> usize {
        self.required_checks.len()
    }
}

impl fmt::Debug for ActionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRules")
            .field("required_checks", &self.required_checks.len())
            .finish()
    }
}
