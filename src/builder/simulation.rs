//! Builder for constructing simulations.

use crate::builder::error::BuildError;
use crate::catalog::{ScenarioCatalog, ScenarioId};
use crate::core::{Elevator, ElevatorUnit};
use crate::engine::Simulation;
use crate::validation::ActionRules;
use std::marker::PhantomData;
use uuid::Uuid;

/// Builder for constructing simulations with a fluent API.
///
/// # Example
///
/// ```rust
/// use liftgrid::catalog::{InMemoryCatalog, Scenario, ScenarioId, ScheduledCall};
/// use liftgrid::core::CallId;
/// use liftgrid::SimulationBuilder;
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog
///     .insert(Scenario {
///         id: ScenarioId::from("demo"),
///         floor_count: 5,
///         capacity: 1,
///         elevator_count: 1,
///         arrivals: vec![vec![ScheduledCall { id: CallId(0), start: 0, end: 2 }], vec![]],
///     })
///     .unwrap();
///
/// let simulation = SimulationBuilder::new()
///     .user_key("tester")
///     .scenario("demo")
///     .build(&catalog)
///     .unwrap();
///
/// assert_eq!(simulation.timestamp(), 0);
/// assert_eq!(simulation.calls().len(), 1);
/// assert!(!simulation.is_complete());
/// ```
pub struct SimulationBuilder<E: ElevatorUnit = Elevator> {
    user_key: Option<String>,
    token: Option<String>,
    scenario: Option<ScenarioId>,
    elevator_count: Option<usize>,
    rules: Option<ActionRules>,
    _phantom: PhantomData<E>,
}

impl SimulationBuilder<Elevator> {
    /// Create a builder for simulations driving the reference [`Elevator`].
    pub fn new() -> Self {
        Self::with_units()
    }
}

impl<E: ElevatorUnit> SimulationBuilder<E> {
    /// Create a builder for simulations driving elevator units of type `E`.
    pub fn with_units() -> Self {
        Self {
            user_key: None,
            token: None,
            scenario: None,
            elevator_count: None,
            rules: None,
            _phantom: PhantomData,
        }
    }

    /// Set the caller the simulation belongs to (required).
    pub fn user_key(mut self, key: impl Into<String>) -> Self {
        self.user_key = Some(key.into());
        self
    }

    /// Set the session token. A random UUID is used when omitted.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the scenario to run (required).
    pub fn scenario(mut self, id: impl Into<ScenarioId>) -> Self {
        self.scenario = Some(id.into());
        self
    }

    /// Run fewer elevators than the scenario allows.
    pub fn elevator_count(mut self, count: usize) -> Self {
        self.elevator_count = Some(count);
        self
    }

    /// Hold actions to extra rules on top of the structural ones.
    pub fn rules(mut self, rules: ActionRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Build the simulation, resolving its scenario in `catalog`.
    pub fn build(self, catalog: &dyn ScenarioCatalog) -> Result<Simulation<E>, BuildError> {
        let user_key = self.user_key.ok_or(BuildError::MissingUserKey)?;
        let scenario_id = self.scenario.ok_or(BuildError::MissingScenario)?;
        let scenario = catalog
            .get(&scenario_id)
            .ok_or(BuildError::UnknownScenario(scenario_id))?;

        let elevator_count = self.elevator_count.unwrap_or(scenario.elevator_count);
        if elevator_count == 0 || elevator_count > scenario.elevator_count {
            return Err(BuildError::InvalidElevatorCount {
                requested: elevator_count,
                max: scenario.elevator_count,
            });
        }

        let token = self
            .token
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Simulation::new(
            user_key,
            token,
            scenario,
            elevator_count,
            self.rules.unwrap_or_default(),
        ))
    }
}

impl Default for SimulationBuilder<Elevator> {
    fn default() -> Self {
        Self::new()
    }
}
