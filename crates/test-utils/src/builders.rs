#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use taskbraid::errors::Result;
use taskbraid::{PrerequisitesIteration, TaskEvent, TaskUnit, TaskUnitCluster, UnitDefinition};

use crate::{day, epoch};

/// Builder for a single `TaskUnit` to simplify test setup.
///
/// Defaults: scheduled over `day(0)..day(1)`, no prerequisites, no events,
/// reference time `day(0)`.
pub struct UnitBuilder {
    now: DateTime<Utc>,
    definition: UnitDefinition,
}

impl UnitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            now: epoch(),
            definition: UnitDefinition {
                name: name.to_string(),
                anticipated_start_date: day(0),
                anticipated_end_date: day(1),
                prerequisites_iterations: Vec::new(),
                event_history: Vec::new(),
            },
        }
    }

    pub fn scheduled(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.definition.anticipated_start_date = start;
        self.definition.anticipated_end_date = end;
        self
    }

    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Append a prerequisites version.
    pub fn prerequisites(
        mut self,
        approved: Option<DateTime<Utc>>,
        parents: &[&Arc<TaskUnit>],
    ) -> Self {
        let parents = parents.iter().map(|p| Arc::clone(p)).collect();
        self.definition
            .prerequisites_iterations
            .push(PrerequisitesIteration::new(approved, parents));
        self
    }

    /// Append a prerequisites version approved at `epoch()`.
    pub fn after(self, parents: &[&Arc<TaskUnit>]) -> Self {
        self.prerequisites(Some(epoch()), parents)
    }

    pub fn event(mut self, event: TaskEvent) -> Self {
        self.definition.event_history.push(event);
        self
    }

    pub fn definition(self) -> UnitDefinition {
        self.definition
    }

    pub fn try_build(self) -> Result<Arc<TaskUnit>> {
        TaskUnit::new(self.now, self.definition)
    }

    pub fn build(self) -> Arc<TaskUnit> {
        self.try_build().expect("Failed to build valid unit from builder")
    }
}

/// Builds a whole graph of units by name, each scheduled right after its
/// latest-ending dependency, all with no history and reference time `day(0)`.
#[derive(Default)]
pub struct GraphBuilder {
    units: BTreeMap<String, Arc<TaskUnit>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a one-day unit depending on `deps` (which must already exist).
    pub fn unit(self, name: &str, deps: &[&str]) -> Self {
        self.unit_lasting(name, 1, deps)
    }

    /// Add a unit lasting `days` depending on `deps`.
    pub fn unit_lasting(mut self, name: &str, days: i64, deps: &[&str]) -> Self {
        let parents: Vec<Arc<TaskUnit>> = deps.iter().map(|d| self.get(d)).collect();
        let start = parents
            .iter()
            .map(|p| p.apparent_end_date())
            .max()
            .unwrap_or_else(epoch);
        let parent_refs: Vec<&Arc<TaskUnit>> = parents.iter().collect();
        let unit = UnitBuilder::new(name)
            .scheduled(start, start + Duration::days(days))
            .after(&parent_refs)
            .build();
        self.units.insert(name.to_string(), unit);
        self
    }

    pub fn get(&self, name: &str) -> Arc<TaskUnit> {
        self.units
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unit '{name}' not defined in graph"))
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<TaskUnit>> {
        self.units.values()
    }

    pub fn cluster(&self, heads: &[&str]) -> TaskUnitCluster {
        TaskUnitCluster::new(heads.iter().map(|h| self.get(h)).collect())
            .expect("Failed to build cluster from graph")
    }
}
