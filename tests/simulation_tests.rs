//! Integration tests for stepping simulations.
//!
//! Most tests drive the engine through small `ElevatorUnit` test doubles so
//! that the engine's own guarantees can be checked independently of the
//! reference elevator's rules.

use liftgrid::catalog::{InMemoryCatalog, Scenario, ScenarioId, ScheduledCall};
use liftgrid::core::{
    Action, Call, CallId, CallQueue, Command, CommandError, CommandKind, ElevatorId,
    ElevatorUnit, QueueScope,
};
use liftgrid::validation::{ActionRulesBuilder, ActionViolation};
use liftgrid::{Checkpoint, Simulation, SimulationBuilder, StepError};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Test doubles

/// Boards any waiting call and lets passengers off anywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StubElevator {
    id: ElevatorId,
    passengers: Vec<Call>,
}

impl ElevatorUnit for StubElevator {
    fn from_scenario(id: ElevatorId, _scenario: &Scenario) -> Self {
        Self {
            id,
            passengers: Vec::new(),
        }
    }

    fn id(&self) -> ElevatorId {
        self.id
    }

    fn passengers(&self) -> &[Call] {
        &self.passengers
    }

    fn is_executable(&self, calls: &CallQueue, command: &Command) -> Result<(), CommandError> {
        match command.kind() {
            CommandKind::Enter => {
                for &id in &command.call_ids {
                    if !calls.contains(id) {
                        return Err(CommandError::NotWaiting(id));
                    }
                }
            }
            CommandKind::Exit => {
                for &id in &command.call_ids {
                    if !self.passengers.iter().any(|c| c.id == id) {
                        return Err(CommandError::NotAboard(id));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn update_calls(
        &self,
        calls: &mut CallQueue,
        command: &Command,
        scope: QueueScope,
    ) -> Result<(), CommandError> {
        SCOPES.with(|scopes| {
            scopes
                .borrow_mut()
                .push((scope, calls as *const CallQueue as usize))
        });
        match command.kind() {
            CommandKind::Enter => {
                for &id in &command.call_ids {
                    calls.take(id).ok_or(CommandError::NotWaiting(id))?;
                }
            }
            CommandKind::Exit if scope == QueueScope::Live => {
                for call in &self.passengers {
                    if command.call_ids.contains(&call.id) {
                        calls.finish(call.clone());
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
                    .retain(|c| !command.call_ids.contains(&c.id));
            }
            _ => {}
        }
        Ok(())
    }
}

thread_local! {
    static SCOPES: RefCell<Vec<(QueueScope, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Panics when asked about moving up or letting anyone off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FaultyElevator {
    id: ElevatorId,
}

impl ElevatorUnit for FaultyElevator {
    fn from_scenario(id: ElevatorId, _scenario: &Scenario) -> Self {
        Self { id }
    }

    fn id(&self) -> ElevatorId {
        self.id
    }

    fn passengers(&self) -> &[Call] {
        &[]
    }

    fn is_executable(&self, _calls: &CallQueue, command: &Command) -> Result<(), CommandError> {
        if command.kind() == CommandKind::Up {
            panic!("motor controller offline");
        }
        Ok(())
    }

    fn update_calls(
        &self,
        _calls: &mut CallQueue,
        command: &Command,
        _scope: QueueScope,
    ) -> Result<(), CommandError> {
        if command.kind() == CommandKind::Exit {
            panic!("door sensor jammed");
        }
        Ok(())
    }

    fn execute(&mut self, _calls: &mut CallQueue, command: &Command) -> Result<(), CommandError> {
        if command.kind() == CommandKind::Down {
            return Err(CommandError::NoFloorBeyond {
                command: CommandKind::Down,
                floor: 0,
            });
        }
        Ok(())
    }
}

/// Cannot tell whether anyone is aboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SensorFaultElevator {
    id: ElevatorId,
}

impl ElevatorUnit for SensorFaultElevator {
    fn from_scenario(id: ElevatorId, _scenario: &Scenario) -> Self {
        Self { id }
    }

    fn id(&self) -> ElevatorId {
        self.id
    }

    fn passengers(&self) -> &[Call] {
        &[]
    }

    fn is_carrying(&self) -> bool {
        panic!("load sensor offline");
    }

    fn is_executable(&self, _calls: &CallQueue, _command: &Command) -> Result<(), CommandError> {
        Ok(())
    }

    fn update_calls(
        &self,
        _calls: &mut CallQueue,
        _command: &Command,
        _scope: QueueScope,
    ) -> Result<(), CommandError> {
        Ok(())
    }

    fn execute(&mut self, _calls: &mut CallQueue, _command: &Command) -> Result<(), CommandError> {
        Ok(())
    }
}

// Helpers

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scheduled(id: u32, start: u32, end: u32) -> ScheduledCall {
    ScheduledCall {
        id: CallId(id),
        start,
        end,
    }
}

fn catalog_with(scenario: Scenario) -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    catalog.insert(scenario).unwrap();
    catalog
}

/// One elevator, capacity 1, five floors, a single call at step 0.
fn single_call_catalog() -> InMemoryCatalog {
    catalog_with(Scenario {
        id: ScenarioId::from("single"),
        floor_count: 5,
        capacity: 1,
        elevator_count: 1,
        arrivals: vec![vec![scheduled(0, 0, 3)], vec![], vec![]],
    })
}

/// Two elevators and calls spread over four steps.
fn busy_catalog() -> InMemoryCatalog {
    catalog_with(Scenario {
        id: ScenarioId::from("busy"),
        floor_count: 6,
        capacity: 2,
        elevator_count: 2,
        arrivals: vec![
            vec![scheduled(0, 0, 4), scheduled(1, 0, 2)],
            vec![scheduled(2, 3, 0)],
            vec![],
            vec![scheduled(3, 5, 1), scheduled(4, 2, 4)],
        ],
    })
}

fn build<E: ElevatorUnit>(catalog: &InMemoryCatalog, scenario: &str) -> Simulation<E> {
    SimulationBuilder::<E>::with_units()
        .user_key("tester")
        .scenario(scenario)
        .build(catalog)
        .unwrap()
}

fn idle(count: usize) -> Action {
    (0..count)
        .map(|i| Command::new(ElevatorId(i), CommandKind::Stop))
        .collect()
}

fn serialized<E: ElevatorUnit>(simulation: &Simulation<E>) -> String {
    serde_json::to_string(&simulation.snapshot()).unwrap()
}

// Stepping

#[test]
fn single_call_scenario_runs_to_completion() {
    init_logging();
    let catalog = single_call_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "single");
    let e0 = ElevatorId(0);

    assert!(sim.advance(&Action::new(vec![Command::enter(e0, vec![CallId(0)])])));
    assert!(sim.calls().is_empty());
    assert_eq!(sim.timestamp(), 1);

    let before = serialized(&sim);
    assert!(!sim.advance(&Action::default()));
    assert_eq!(serialized(&sim), before);
    assert_eq!(sim.timestamp(), 1);

    assert!(sim.advance(&Action::new(vec![Command::exit(e0, vec![CallId(0)])])));
    assert_eq!(sim.timestamp(), 2);
    assert!(sim.is_complete());
}

#[test]
fn completion_needs_the_schedule_to_run_out() {
    let catalog = single_call_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "single");
    let e0 = ElevatorId(0);

    sim.advance(&Action::new(vec![Command::enter(e0, vec![CallId(0)])]));
    assert!(!sim.is_complete());

    assert!(sim.advance(&idle(1)));
    // Queue empty and step 2 reached, but the call is still riding.
    assert!(!sim.is_complete());

    assert!(sim.advance(&Action::new(vec![Command::exit(e0, vec![CallId(0)])])));
    assert!(sim.is_complete());
}

#[test]
fn completed_simulation_rejects_further_steps() {
    let catalog = single_call_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "single");
    let e0 = ElevatorId(0);
    sim.advance(&Action::new(vec![Command::enter(e0, vec![CallId(0)])]));
    sim.advance(&Action::new(vec![Command::exit(e0, vec![CallId(0)])]));
    assert!(sim.is_complete());

    let before = serialized(&sim);
    assert_eq!(sim.step(&idle(1)), Err(StepError::Completed { timestamp: 2 }));
    assert!(!sim.advance(&Action::default()));
    assert!(sim.is_complete());
    assert_eq!(serialized(&sim), before);
}

#[test]
fn empty_schedule_is_complete_immediately() {
    let catalog = catalog_with(Scenario {
        id: ScenarioId::from("empty"),
        floor_count: 2,
        capacity: 1,
        elevator_count: 1,
        arrivals: vec![],
    });
    let mut sim: Simulation<StubElevator> = build(&catalog, "empty");

    assert!(sim.is_complete());
    assert!(!sim.advance(&idle(1)));
}

#[test]
fn scheduled_arrivals_are_admitted_per_step() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let ids = |sim: &Simulation<StubElevator>| -> Vec<u32> {
        sim.calls().iter().map(|c| c.id.0).collect()
    };
    assert_eq!(ids(&sim), vec![0, 1]);

    // Board call 0 while call 1 keeps waiting.
    let action = Action::new(vec![
        Command::enter(ElevatorId(0), vec![CallId(0)]),
        Command::new(ElevatorId(1), CommandKind::Stop),
    ]);
    assert!(sim.advance(&action));
    assert_eq!(ids(&sim), vec![1, 2]);
    assert!(sim.calls().iter().all(|c| c.timestamp <= 1));

    assert!(sim.advance(&idle(2)));
    assert_eq!(ids(&sim), vec![1, 2]);

    assert!(sim.advance(&idle(2)));
    assert_eq!(ids(&sim), vec![1, 2, 3, 4]);
    assert_eq!(sim.calls().find(CallId(3)).map(|c| c.timestamp), Some(3));
}

#[test]
fn later_commands_see_earlier_boardings() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");
    let before = serialized(&sim);

    let action = Action::new(vec![
        Command::enter(ElevatorId(0), vec![CallId(0)]),
        Command::enter(ElevatorId(1), vec![CallId(0)]),
    ]);

    assert_eq!(
        sim.step(&action),
        Err(StepError::Rejected {
            elevator_id: ElevatorId(1),
            source: CommandError::NotWaiting(CallId(0)),
        })
    );
    assert_eq!(serialized(&sim), before);
    assert!(sim.calls().contains(CallId(0)));
}

#[test]
fn boarding_different_calls_in_one_step_succeeds() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let action = Action::new(vec![
        Command::enter(ElevatorId(1), vec![CallId(1)]),
        Command::enter(ElevatorId(0), vec![CallId(0)]),
    ]);

    assert!(sim.advance(&action));
    assert_eq!(sim.elevators()[0].passengers().len(), 1);
    assert_eq!(sim.elevators()[1].passengers().len(), 1);
    assert_eq!(sim.history().len(), 1);
}

#[test]
fn validation_only_touches_a_copy_of_the_queue() {
    SCOPES.with(|scopes| scopes.borrow_mut().clear());
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let action = Action::new(vec![
        Command::enter(ElevatorId(0), vec![CallId(0)]),
        Command::enter(ElevatorId(1), vec![CallId(1)]),
    ]);
    assert!(sim.advance(&action));

    let live = sim.calls() as *const CallQueue as usize;
    let scopes = SCOPES.with(|scopes| scopes.borrow().clone());

    let snapshot_targets: Vec<_> = scopes
        .iter()
        .filter(|(scope, _)| *scope == QueueScope::Snapshot)
        .map(|(_, address)| *address)
        .collect();
    let live_targets: Vec<_> = scopes
        .iter()
        .filter(|(scope, _)| *scope == QueueScope::Live)
        .map(|(_, address)| *address)
        .collect();

    assert_eq!(snapshot_targets.len(), 2);
    assert_eq!(live_targets, vec![live, live]);
    assert!(snapshot_targets.iter().all(|&address| address != live));
}

// Structural rejection

#[test]
fn duplicate_elevator_ids_are_rejected() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");
    let before = serialized(&sim);

    let action = Action::new(vec![
        Command::new(ElevatorId(0), CommandKind::Stop),
        Command::new(ElevatorId(0), CommandKind::Stop),
    ]);

    assert_eq!(
        sim.step(&action),
        Err(StepError::Invalid(vec![ActionViolation::DuplicateElevator(
            ElevatorId(0)
        )]))
    );
    assert_eq!(serialized(&sim), before);
}

#[test]
fn out_of_range_elevator_ids_are_rejected() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let action = Action::new(vec![
        Command::new(ElevatorId(0), CommandKind::Stop),
        Command::new(ElevatorId(2), CommandKind::Stop),
    ]);

    assert!(!sim.advance(&action));
    assert_eq!(sim.timestamp(), 0);
}

#[test]
fn missing_commands_are_rejected() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let action = Action::new(vec![Command::new(ElevatorId(1), CommandKind::Stop)]);
    assert!(matches!(sim.step(&action), Err(StepError::Invalid(_))));
    assert_eq!(sim.timestamp(), 0);
}

#[test]
fn custom_rules_reject_actions() {
    let catalog = busy_catalog();
    let rules = ActionRulesBuilder::new()
        .require_pred(
            |ctx| ctx.action.commands().iter().all(|c| c.kind() != CommandKind::Up),
            "Up is closed for maintenance".to_string(),
        )
        .build();
    let mut sim: Simulation<StubElevator> = SimulationBuilder::with_units()
        .user_key("tester")
        .scenario("busy")
        .rules(rules)
        .build(&catalog)
        .unwrap();

    let action = Action::new(vec![
        Command::new(ElevatorId(0), CommandKind::Up),
        Command::new(ElevatorId(1), CommandKind::Stop),
    ]);
    assert!(!sim.advance(&action));
    assert!(sim.advance(&idle(2)));
}

#[test]
fn undecodable_json_is_a_plain_rejection() {
    let catalog = single_call_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "single");
    let before = serialized(&sim);

    assert!(!sim.advance_json("{\"commands\": [{\"elevator_id\": 0}]}"));
    assert!(!sim.advance_json("not even json"));
    assert!(matches!(
        sim.step_json("{}"),
        Err(StepError::Malformed(_))
    ));
    assert_eq!(serialized(&sim), before);

    assert!(sim.advance_json(
        r#"{"commands":[{"elevator_id":0,"command":"ENTER","call_ids":[0]}]}"#
    ));
    assert_eq!(sim.timestamp(), 1);
}

// Collaborator faults

fn faulty_catalog() -> InMemoryCatalog {
    catalog_with(Scenario {
        id: ScenarioId::from("faulty"),
        floor_count: 3,
        capacity: 1,
        elevator_count: 2,
        arrivals: vec![vec![scheduled(0, 0, 1)], vec![]],
    })
}

#[test]
fn panicking_elevator_becomes_a_rejection() {
    let catalog = faulty_catalog();
    let mut sim: Simulation<FaultyElevator> = build(&catalog, "faulty");
    let before = serialized(&sim);

    let action = Action::new(vec![
        Command::new(ElevatorId(0), CommandKind::Stop),
        Command::new(ElevatorId(1), CommandKind::Up),
    ]);

    match sim.step(&action) {
        Err(StepError::CollaboratorFault { message }) => {
            assert!(message.contains("motor controller offline"));
        }
        other => panic!("Expected CollaboratorFault, got {other:?}"),
    }
    assert_eq!(serialized(&sim), before);

    assert!(sim.advance(&idle(2)));
}

fn assert_fault<E: ElevatorUnit>(sim: &mut Simulation<E>, action: &Action, expected: &str) {
    let before = serialized(sim);
    match sim.step(action) {
        Err(StepError::CollaboratorFault { message }) => {
            assert!(message.contains(expected), "unexpected message: {message}");
        }
        other => panic!("Expected CollaboratorFault, got {other:?}"),
    }
    assert_eq!(serialized(sim), before);
    assert!(!sim.advance(action));
    assert_eq!(serialized(sim), before);
}

#[test]
fn panicking_dry_run_update_becomes_a_rejection() {
    let catalog = faulty_catalog();
    let mut sim: Simulation<FaultyElevator> = build(&catalog, "faulty");

    let action = Action::new(vec![
        Command::exit(ElevatorId(0), vec![CallId(0)]),
        Command::new(ElevatorId(1), CommandKind::Stop),
    ]);
    assert_fault(&mut sim, &action, "door sensor jammed");
}

#[test]
fn panicking_completion_check_becomes_a_rejection() {
    let catalog = faulty_catalog();
    let mut sim: Simulation<SensorFaultElevator> = build(&catalog, "faulty");

    assert_fault(&mut sim, &idle(2), "load sensor offline");
    assert_eq!(sim.timestamp(), 0);
    assert!(sim.history().is_empty());
}

#[test]
fn apply_phase_failure_is_a_contract_violation() {
    let catalog = faulty_catalog();
    let mut sim: Simulation<FaultyElevator> = build(&catalog, "faulty");

    let action = Action::new(vec![
        Command::new(ElevatorId(0), CommandKind::Down),
        Command::new(ElevatorId(1), CommandKind::Stop),
    ]);

    let err = sim.step(&action).unwrap_err();
    assert!(matches!(
        err,
        StepError::ContractViolation {
            elevator_id: ElevatorId(0),
            ..
        }
    ));
    assert!(!err.is_clean_rejection());
    assert_eq!(sim.timestamp(), 0);
}

// Snapshots and checkpoints

#[test]
fn snapshot_is_independent() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");

    let snapshot = sim.snapshot();
    let action = Action::new(vec![
        Command::enter(ElevatorId(0), vec![CallId(0)]),
        Command::new(ElevatorId(1), CommandKind::Stop),
    ]);
    assert!(sim.advance(&action));

    assert_eq!(snapshot.timestamp, 0);
    assert!(snapshot.calls.contains(CallId(0)));
    assert!(snapshot.elevators[0].passengers.is_empty());
    assert_eq!(sim.state().elevators[0].passengers.len(), 1);
}

#[test]
fn checkpoint_resumes_where_it_left_off() {
    let catalog = busy_catalog();
    let mut sim: Simulation<StubElevator> = build(&catalog, "busy");
    let action = Action::new(vec![
        Command::enter(ElevatorId(0), vec![CallId(0)]),
        Command::enter(ElevatorId(1), vec![CallId(1)]),
    ]);
    assert!(sim.advance(&action));

    let bytes = sim.checkpoint().to_binary().unwrap();
    let checkpoint: Checkpoint<StubElevator> = Checkpoint::from_binary(&bytes).unwrap();
    let mut resumed = Simulation::resume(checkpoint, &catalog).unwrap();

    assert_eq!(resumed.snapshot(), sim.snapshot());
    assert_eq!(resumed.history().len(), 1);

    assert!(resumed.advance(&idle(2)));
    assert!(sim.advance(&idle(2)));
    assert_eq!(resumed.timestamp(), sim.timestamp());
    assert_eq!(resumed.calls(), sim.calls());
}

#[test]
fn resume_needs_the_scenario() {
    let catalog = busy_catalog();
    let sim: Simulation<StubElevator> = build(&catalog, "busy");
    let checkpoint = sim.checkpoint();

    let other = single_call_catalog();
    assert!(matches!(
        Simulation::resume(checkpoint, &other),
        Err(liftgrid::CheckpointError::UnknownScenario(_))
    ));
}

#[test]
fn elapsed_time_grows() {
    let catalog = single_call_catalog();
    let sim: Simulation<StubElevator> = build(&catalog, "single");
    let first = sim.elapsed();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(sim.elapsed() >= first);
}
