//! The simulation instance and its two-phase step.

use crate::catalog::{Scenario, ScenarioCatalog};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{
    Action, CallQueue, Elevator, ElevatorId, ElevatorUnit, QueueScope, StepHistory, StepRecord,
};
use crate::engine::error::StepError;
use crate::engine::state::SimulationState;
use crate::validation::{ActionContext, ActionRules};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use stillwater::validation::Validation;

/// Authoritative state machine for one run of one scenario.
///
/// Each accepted action moves the simulation forward by exactly one time
/// step. An action is first checked against a private copy of the call queue
/// and only touches the real elevators and queue once every command in it has
/// passed. A rejected action leaves the simulation unchanged.
///
/// The simulation does no internal locking; callers serialize steps against
/// one instance. Create one through [`SimulationBuilder`](crate::SimulationBuilder).
pub struct Simulation<E: ElevatorUnit = Elevator> {
    state: SimulationState<E>,
    scenario: Arc<Scenario>,
    rules: ActionRules,
    history: StepHistory,
}

impl<E: ElevatorUnit> Simulation<E> {
    /// Start a fresh run at time step 0 with the first arrival batch admitted.
    pub(crate) fn new(
        user_key: String,
        token: String,
        scenario: Arc<Scenario>,
        elevator_count: usize,
        rules: ActionRules,
    ) -> Self {
        let elevators = (0..elevator_count)
            .map(|i| E::from_scenario(ElevatorId(i), &scenario))
            .collect();

        let mut calls = CallQueue::new();
        calls.admit(scenario.arrivals_at(0));

        let state = SimulationState {
            user_key,
            token,
            created_at: Utc::now(),
            scenario_id: scenario.id.clone(),
            timestamp: 0,
            calls,
            elevators,
        };

        debug!(
            "simulation for '{}' created on scenario '{}' with {} elevator(s), {} call(s) waiting",
            state.user_key,
            state.scenario_id,
            elevator_count,
            state.calls.len()
        );

        Self {
            state,
            scenario,
            rules,
            history: StepHistory::new(),
        }
    }

    /// Resume a run from a checkpoint, looking its scenario up in `catalog`.
    ///
    /// Action rules are not checkpointed; the resumed run has only the
    /// structural ones until [`Simulation::with_rules`] restores the rest.
    pub fn resume(
        checkpoint: Checkpoint<E>,
        catalog: &dyn ScenarioCatalog,
    ) -> Result<Self, CheckpointError> {
        checkpoint.validate()?;

        let scenario = catalog
            .get(&checkpoint.state.scenario_id)
            .ok_or_else(|| CheckpointError::UnknownScenario(checkpoint.state.scenario_id.clone()))?;

        let elevator_count = checkpoint.state.elevators.len();
        if elevator_count > scenario.elevator_count {
            return Err(CheckpointError::Inconsistent(format!(
                "checkpoint runs {} elevators, scenario '{}' allows {}",
                elevator_count, scenario.id, scenario.elevator_count
            )));
        }

        Ok(Self {
            state: checkpoint.state,
            scenario,
            rules: ActionRules::new(),
            history: checkpoint.history,
        })
    }

    /// Replace the action rules, e.g. after resuming from a checkpoint.
    pub fn with_rules(mut self, rules: ActionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> &SimulationState<E> {
        &self.state
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn timestamp(&self) -> u32 {
        self.state.timestamp
    }

    pub fn calls(&self) -> &CallQueue {
        &self.state.calls
    }

    pub fn elevators(&self) -> &[E] {
        &self.state.elevators
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    /// Wall-clock time since the simulation was created.
    ///
    /// Informational only; it plays no part in stepping.
    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.state.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the puzzle is solved.
    ///
    /// Holds when the last arrival batch is due or past, no call is waiting
    /// and no elevator carries anyone. Once true it stays true, because no
    /// further step is accepted.
    pub fn is_complete(&self) -> bool {
        let schedule_exhausted = self.state.timestamp >= self.scenario.last_arrival_index();
        let queue_drained = self.state.calls.is_empty();
        let cars_empty = self.state.elevators.iter().all(|e| !e.is_carrying());

        schedule_exhausted && queue_drained && cars_empty
    }

    /// Independent copy of the current state.
    pub fn snapshot(&self) -> SimulationState<E> {
        self.state.clone()
    }

    /// Capture state and history for persistence.
    pub fn checkpoint(&self) -> Checkpoint<E> {
        Checkpoint::new(self.snapshot(), self.history.clone())
    }

    /// Apply `action` as the next time step, reporting only whether it was accepted.
    pub fn advance(&mut self, action: &Action) -> bool {
        self.step(action).is_ok()
    }

    /// Decode and apply an action in its JSON transport form.
    ///
    /// Input that does not decode is rejected like any other bad action.
    pub fn advance_json(&mut self, raw: &str) -> bool {
        self.step_json(raw).is_ok()
    }

    pub fn step_json(&mut self, raw: &str) -> Result<u32, StepError> {
        match Action::from_json(raw) {
            Ok(action) => self.step(&action),
            Err(e) => {
                let err = StepError::Malformed(e.to_string());
                warn!("step {} rejected: {}", self.state.timestamp, err);
                Err(err)
            }
        }
    }

    /// Apply `action` as the next time step.
    ///
    /// On success returns the new time step. On error the simulation is
    /// unchanged, except for [`StepError::ContractViolation`] which signals an
    /// elevator unit breaking its own contract after validation.
    pub fn step(&mut self, action: &Action) -> Result<u32, StepError> {
        let result = self.validate(action).and_then(|()| self.apply(action));

        match &result {
            Ok(timestamp) => {
                debug!("step {} accepted: {}", timestamp, self.state.summary());
                let completed = panic::catch_unwind(AssertUnwindSafe(|| self.is_complete()));
                if matches!(completed, Ok(true)) {
                    info!(
                        "simulation for '{}' completed at step {} after {:?}",
                        self.state.user_key,
                        timestamp,
                        self.elapsed()
                    );
                }
            }
            Err(err) => warn!("step {} rejected: {}", self.state.timestamp, err),
        }
        result
    }

    /// Validation phase. Never mutates canonical state.
    fn validate(&self, action: &Action) -> Result<(), StepError> {
        // Every unit call in here only reads `self` or writes to the dry run's
        // own copy of the queue, so a panic cannot leave anything half-updated.
        match panic::catch_unwind(AssertUnwindSafe(|| {
            if self.is_complete() {
                return Err(StepError::Completed {
                    timestamp: self.state.timestamp,
                });
            }
            self.check_structure(action)?;
            self.dry_run(action)
        })) {
            Ok(result) => result,
            Err(payload) => Err(StepError::CollaboratorFault {
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn check_structure(&self, action: &Action) -> Result<(), StepError> {
        let context = ActionContext {
            action,
            timestamp: self.state.timestamp,
            elevator_count: self.state.elevators.len(),
            started_at: self.state.created_at,
        };

        match self.rules.check(&context) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => {
                Err(StepError::Invalid(violations.iter().cloned().collect()))
            }
        }
    }

    /// Ask every addressed elevator about its command against a private copy
    /// of the queue, threading boarding and alighting through that copy so
    /// later commands see the effect of earlier ones.
    fn dry_run(&self, action: &Action) -> Result<(), StepError> {
        let mut calls = self.state.calls.clone();

        for command in action.commands() {
            let elevator_id = command.elevator_id;
            let elevator = self.elevator(elevator_id)?;

            elevator
                .is_executable(&calls, command)
                .map_err(|source| StepError::Rejected {
                    elevator_id,
                    source,
                })?;

            if command.kind().touches_calls() {
                elevator
                    .update_calls(&mut calls, command, QueueScope::Snapshot)
                    .map_err(|source| StepError::Rejected {
                        elevator_id,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Apply phase. Only entered once every command has passed the dry run.
    fn apply(&mut self, action: &Action) -> Result<u32, StepError> {
        let state = &mut self.state;

        for command in action.commands() {
            let elevator_id = command.elevator_id;
            let Some(elevator) = state.elevators.get_mut(elevator_id.index()) else {
                return Err(StepError::Invalid(vec![
                    crate::validation::ActionViolation::UnknownElevator {
                        id: elevator_id,
                        count: state.elevators.len(),
                    },
                ]));
            };

            elevator
                .execute(&mut state.calls, command)
                .map_err(|source| {
                    error!(
                        "elevator {} failed validated {} at step {}: {}",
                        elevator_id,
                        command.kind(),
                        state.timestamp,
                        source
                    );
                    StepError::ContractViolation {
                        elevator_id,
                        source,
                    }
                })?;
        }

        state.timestamp += 1;
        let arrivals: Vec<_> = self.scenario.arrivals_at(state.timestamp).collect();
        for call in &arrivals {
            debug!(
                "call {} arrived at step {}: floor {} going {}",
                call.id,
                state.timestamp,
                call.start,
                call.direction()
            );
        }
        state.calls.admit(arrivals);

        self.history.record(StepRecord {
            timestamp: state.timestamp,
            action: action.clone(),
            recorded_at: Utc::now(),
        });

        Ok(state.timestamp)
    }

    fn elevator(&self, id: ElevatorId) -> Result<&E, StepError> {
        self.state.elevator(id).ok_or_else(|| {
            StepError::Invalid(vec![crate::validation::ActionViolation::UnknownElevator {
                id,
                count: self.state.elevators.len(),
            }])
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
