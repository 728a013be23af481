//! Scenario definitions and the read-only catalog they are looked up in.
//!
//! A scenario is the static half of a puzzle: building shape, elevator
//! capacity and the script of calls that appear at each time step. Scenarios
//! are written as JSON and validated when they enter a catalog, so the engine
//! can trust every scenario it is handed.
//!
//! # Example
//!
//! ```rust
//! use liftgrid::catalog::{InMemoryCatalog, ScenarioCatalog, ScenarioId};
//!
//! let catalog = InMemoryCatalog::from_json(r#"{
//!     "id": "lobby",
//!     "floor_count": 5,
//!     "capacity": 8,
//!     "elevator_count": 2,
//!     "arrivals": [[{"id": 0, "start": 0, "end": 3}], []]
//! }"#).unwrap();
//!
//! let scenario = catalog.get(&ScenarioId::from("lobby")).unwrap();
//! assert_eq!(scenario.total_calls(), 1);
//! ```

use crate::core::{Call, CallId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub mod error;

pub use error::CatalogError;

/// Identifier a scenario is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl From<&str> for ScenarioId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ScenarioId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A call as written in a scenario's arrival schedule.
///
/// Its creation step is the index of the batch it is listed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCall {
    pub id: CallId,
    pub start: u32,
    pub end: u32,
}

/// Immutable definition of one puzzle instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub floor_count: u32,
    pub capacity: usize,
    /// Maximum number of elevators a simulation of this scenario may run
    pub elevator_count: usize,
    /// `arrivals[t]` holds the calls that become visible at time step `t`
    pub arrivals: Vec<Vec<ScheduledCall>>,
}

impl Scenario {
    /// Calls that become visible at `timestamp`, stamped with that step.
    pub fn arrivals_at(&self, timestamp: u32) -> impl Iterator<Item = Call> + '_ {
        self.arrivals
            .get(timestamp as usize)
            .into_iter()
            .flatten()
            .map(move |scheduled| Call::new(scheduled.id, timestamp, scheduled.start, scheduled.end))
    }

    /// Index of the last arrival batch, `0` for an empty schedule.
    pub fn last_arrival_index(&self) -> u32 {
        u32::try_from(self.arrivals.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    pub fn total_calls(&self) -> usize {
        self.arrivals.iter().map(Vec::len).sum()
    }

    /// Check the scenario is internally consistent.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::Invalid {
            id: self.id.clone(),
            reason,
        };

        if self.floor_count < 2 {
            return Err(invalid(format!(
                "floor_count must be at least 2, got {}",
                self.floor_count
            )));
        }
        if self.capacity == 0 {
            return Err(invalid("capacity must be positive".to_string()));
        }
        if self.elevator_count == 0 {
            return Err(invalid("elevator_count must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for (step, batch) in self.arrivals.iter().enumerate() {
            for call in batch {
                if !seen.insert(call.id) {
                    return Err(CatalogError::DuplicateCall {
                        id: self.id.clone(),
                        call: call.id,
                    });
                }
                if call.start >= self.floor_count || call.end >= self.floor_count {
                    return Err(invalid(format!(
                        "call {} at step {} leaves the {}-floor building",
                        call.id, step, self.floor_count
                    )));
                }
                if call.start == call.end {
                    return Err(invalid(format!(
                        "call {} at step {} starts and ends on floor {}",
                        call.id, step, call.start
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Read-only lookup of scenarios by identifier.
///
/// Lookups must be idempotent and free of side effects.
pub trait ScenarioCatalog: Send + Sync {
    fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioDocument {
    One(Scenario),
    Many(Vec<Scenario>),
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    scenarios: HashMap<ScenarioId, Arc<Scenario>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a scenario.
    pub fn insert(&mut self, scenario: Scenario) -> Result<(), CatalogError> {
        scenario.validate()?;
        if self.scenarios.contains_key(&scenario.id) {
            return Err(CatalogError::DuplicateScenario(scenario.id));
        }
        self.scenarios
            .insert(scenario.id.clone(), Arc::new(scenario));
        Ok(())
    }

    /// Build a catalog from a JSON document holding one scenario or an array of them.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.extend_from_json(raw)?;
        Ok(catalog)
    }

    /// Add every scenario in a JSON document.
    ///
    /// The document is checked as a whole first; on error the catalog is
    /// left as it was.
    pub fn extend_from_json(&mut self, raw: &str) -> Result<(), CatalogError> {
        let document: ScenarioDocument = serde_json::from_str(raw)?;
        let scenarios = match document {
            ScenarioDocument::One(scenario) => vec![scenario],
            ScenarioDocument::Many(scenarios) => scenarios,
        };

        let mut incoming = HashSet::with_capacity(scenarios.len());
        for scenario in &scenarios {
            scenario.validate()?;
            if self.scenarios.contains_key(&scenario.id) || !incoming.insert(&scenario.id) {
                return Err(CatalogError::DuplicateScenario(scenario.id.clone()));
            }
        }

        for scenario in scenarios {
            self.scenarios
                .insert(scenario.id.clone(), Arc::new(scenario));
        }
        Ok(())
    }

    /// Build a catalog from every `*.json` file in `dir`, in file name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let io_error = |path: &Path, source: std::io::Error| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
            let path = entry.map_err(|e| io_error(dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let raw = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            catalog.extend_from_json(&raw)?;
            log::debug!("loaded scenarios from {}", path.display());
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ScenarioId> {
        self.scenarios.keys()
    }
}

impl ScenarioCatalog for InMemoryCatalog {
    fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>> {
        self.scenarios.get(id).cloned()
    }
}
