// src/unit/task_unit.rs

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::errors::{Result, TaskbraidError};
use crate::types::{TimeSpan, UnitId};
use crate::unit::dependencies::{self, ResolvedDependencies};
use crate::unit::history::{self, HistoryContext, LifecycleState};
use crate::unit::projection::{self, ProjectionInput};
use crate::unit::{EventKind, PrerequisitesIteration, TaskEvent};

/// Constructor inputs of a [`TaskUnit`].
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub name: String,
    pub anticipated_start_date: DateTime<Utc>,
    pub anticipated_end_date: DateTime<Utc>,
    /// Ordered prerequisites versions; the last one is current.
    pub prerequisites_iterations: Vec<PrerequisitesIteration>,
    /// Explicit, chronologically ordered event history.
    pub event_history: Vec<TaskEvent>,
}

/// A node of the work DAG.
///
/// A unit holds forward references to its dependencies only. All derived
/// state (dependency sets, dates, path counts) is computed once in
/// [`TaskUnit::new`]; afterwards the unit is immutable.
pub struct TaskUnit {
    id: UnitId,
    name: String,
    now: DateTime<Utc>,
    anticipated_start_date: DateTime<Utc>,
    anticipated_end_date: DateTime<Utc>,
    prerequisites_iterations: Vec<PrerequisitesIteration>,
    explicit_event_history: Vec<TaskEvent>,
    projected_event_history: Vec<TaskEvent>,
    lifecycle: LifecycleState,
    dependencies: ResolvedDependencies,
    apparent_start_date: DateTime<Utc>,
    apparent_end_date: DateTime<Utc>,
}

impl TaskUnit {
    /// Validate and resolve a unit against the reference time `now`.
    ///
    /// Fails with [`TaskbraidError::InvalidSchedule`] if the anticipated end
    /// precedes the anticipated start.
    ///
    /// Every unit referenced by `definition.prerequisites_iterations` must
    /// already be constructed, so callers build dependencies first.
    pub fn new(now: DateTime<Utc>, definition: UnitDefinition) -> Result<Arc<TaskUnit>> {
        let UnitDefinition {
            name,
            anticipated_start_date,
            anticipated_end_date,
            prerequisites_iterations,
            event_history,
        } = definition;

        if anticipated_end_date < anticipated_start_date {
            return Err(TaskbraidError::InvalidSchedule {
                unit: name,
                start: anticipated_start_date,
                end: anticipated_end_date,
            });
        }

        let dependencies = dependencies::resolve(&name, &prerequisites_iterations);

        let replay = history::replay(
            &HistoryContext {
                unit_name: &name,
                now,
                prerequisites: &prerequisites_iterations,
                direct_dependencies: &dependencies.direct,
            },
            &event_history,
        )?;

        let apparent_start_date = match event_history.first() {
            Some(first) => first.date(),
            None => dependencies
                .direct
                .iter()
                .map(|dep| dep.apparent_end_date())
                .fold(now.max(anticipated_start_date), |latest, end| latest.max(end)),
        };

        let projected_event_history = projection::project(&ProjectionInput {
            now,
            explicit: &event_history,
            replay,
            apparent_start: apparent_start_date,
            anticipated_duration: anticipated_end_date - anticipated_start_date,
        });

        let apparent_end_date = projected_event_history
            .last()
            .or(event_history.last())
            .map(TaskEvent::date)
            .unwrap_or(apparent_start_date);

        let unit = TaskUnit {
            id: UnitId::generate(),
            name,
            now,
            anticipated_start_date,
            anticipated_end_date,
            prerequisites_iterations,
            explicit_event_history: event_history,
            projected_event_history,
            lifecycle: replay.state,
            dependencies,
            apparent_start_date,
            apparent_end_date,
        };

        debug!(
            unit = %unit.name,
            id = %unit.id,
            state = ?unit.lifecycle,
            direct = unit.dependencies.direct.len(),
            stale = unit.dependencies.stale.len(),
            apparent_start = %unit.apparent_start_date,
            apparent_end = %unit.apparent_end_date,
            "resolved task unit"
        );

        Ok(Arc::new(unit))
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reference time the unit was constructed against.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn anticipated_start_date(&self) -> DateTime<Utc> {
        self.anticipated_start_date
    }

    pub fn anticipated_end_date(&self) -> DateTime<Utc> {
        self.anticipated_end_date
    }

    pub fn anticipated_duration(&self) -> Duration {
        self.anticipated_end_date - self.anticipated_start_date
    }

    /// Date of the first explicit event, or the earliest the work could begin.
    pub fn apparent_start_date(&self) -> DateTime<Utc> {
        self.apparent_start_date
    }

    /// Date of the last explicit or projected event.
    pub fn apparent_end_date(&self) -> DateTime<Utc> {
        self.apparent_end_date
    }

    pub fn apparent_span(&self) -> TimeSpan {
        TimeSpan::new(self.apparent_start_date, self.apparent_end_date)
    }

    /// Time between the anticipated start and the apparent end.
    pub fn presence_time(&self) -> Duration {
        self.apparent_end_date - self.anticipated_start_date
    }

    /// Minimal, non-redundant dependencies of the latest prerequisites iteration.
    pub fn direct_dependencies(&self) -> &[Arc<TaskUnit>] {
        &self.dependencies.direct
    }

    pub fn direct_dependency_ids(&self) -> Vec<UnitId> {
        self.dependencies.direct.iter().map(|d| d.id).collect()
    }

    /// Dependencies of earlier iterations that are no longer direct.
    pub fn stale_direct_dependencies(&self) -> &[Arc<TaskUnit>] {
        &self.dependencies.stale
    }

    /// Every transitive dependency, ordered by name.
    pub fn get_all_dependencies(&self) -> Vec<Arc<TaskUnit>> {
        let mut all: Vec<Arc<TaskUnit>> = self.dependencies.all.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        all
    }

    pub fn is_dependent_on(&self, unit: &TaskUnit) -> bool {
        self.dependencies.all.contains_key(&unit.id)
    }

    /// Whether the last explicit event is `ReviewedAndAccepted`.
    pub fn is_complete(&self) -> bool {
        self.explicit_event_history
            .last()
            .is_some_and(|e| e.kind() == EventKind::ReviewedAndAccepted)
    }

    /// Number of distinct dependency paths from this unit down to `unit`.
    pub fn get_number_of_paths_to_dependency(&self, unit: &TaskUnit) -> usize {
        self.dependencies
            .attachment
            .get(&unit.id)
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct routes from this unit down to every reachable leaf.
    pub fn attachment_to_dependencies(&self) -> usize {
        self.dependencies.attachment_to_dependencies
    }

    pub fn explicit_event_history(&self) -> &[TaskEvent] {
        &self.explicit_event_history
    }

    pub fn projected_event_history(&self) -> &[TaskEvent] {
        &self.projected_event_history
    }

    /// Explicit events followed by projected ones.
    pub fn all_events(&self) -> impl Iterator<Item = &TaskEvent> {
        self.explicit_event_history
            .iter()
            .chain(self.projected_event_history.iter())
    }

    pub fn latest_event(&self) -> Option<&TaskEvent> {
        self.explicit_event_history.last()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn prerequisites_iterations(&self) -> &[PrerequisitesIteration] {
        &self.prerequisites_iterations
    }

    pub(crate) fn dependency_index(&self) -> &HashMap<UnitId, Arc<TaskUnit>> {
        &self.dependencies.all
    }

    pub(crate) fn attachment_map(&self) -> &HashMap<UnitId, usize> {
        &self.dependencies.attachment
    }
}

impl PartialEq for TaskUnit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskUnit {}

impl Hash for TaskUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Dependencies are printed by name only; a derived impl would print the
// whole upstream graph.
impl fmt::Debug for TaskUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |units: &[Arc<TaskUnit>]| -> Vec<String> {
            units.iter().map(|u| u.name.clone()).collect()
        };
        f.debug_struct("TaskUnit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lifecycle", &self.lifecycle)
            .field("apparent_start_date", &self.apparent_start_date)
            .field("apparent_end_date", &self.apparent_end_date)
            .field("direct_dependencies", &names(&self.dependencies.direct))
            .field("stale_direct_dependencies", &names(&self.dependencies.stale))
            .finish()
    }
}
