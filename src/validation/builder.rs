//! Builder API for extending the action rules.

use crate::validation::context::ActionContext;
use crate::validation::rules::{ActionCheck, ActionRules};
use crate::validation::violations::ActionViolation;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for [`ActionRules`] with caller-supplied checks
pub struct ActionRulesBuilder {
    required_checks: Vec<ActionCheck>,
}

impl ActionRulesBuilder {
    pub fn new() -> Self {
        Self {
            required_checks: Vec::new(),
        }
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Validation<(), NonEmptyVec<ActionViolation>>
            + Send
            + Sync
            + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&ActionContext<'_>) -> bool + Send + Sync + 'static,
    {
        let check = move |ctx: &ActionContext<'_>| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(ActionViolation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    /// Reject actions once the simulation is older than `budget`
    pub fn time_budget(self, budget: Duration) -> Self {
        self.require_pred(
            move |ctx| ctx.elapsed() <= budget,
            format!("time budget of {budget:?} exhausted"),
        )
    }

    /// Build the rules
    pub fn build(self) -> ActionRules {
        ActionRules {
            required_checks: self.required_checks,
        }
    }
}

impl Default for ActionRulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
