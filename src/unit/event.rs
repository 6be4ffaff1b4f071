// src/unit/event.rs

//! Lifecycle events recorded against a task unit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminant of a [`TaskEvent`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskIterationStarted,
    ReviewedAndAccepted,
    ReviewedAndNeedsMinorRevision,
    MinorRevisionComplete,
    ReviewedAndNeedsMajorRevision,
    ReviewedAndNeedsRebuild,
}

impl EventKind {
    /// Terminal kinds are absorbing: nothing may be recorded after them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventKind::ReviewedAndAccepted | EventKind::MinorRevisionComplete
        )
    }

    /// Kinds that record the outcome of a review.
    pub fn is_review_result(self) -> bool {
        matches!(
            self,
            EventKind::ReviewedAndAccepted
                | EventKind::ReviewedAndNeedsMinorRevision
                | EventKind::ReviewedAndNeedsMajorRevision
                | EventKind::ReviewedAndNeedsRebuild
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One entry of a unit's event history.
///
/// In project files this is written as a table with a snake_case `type`
/// field, e.g. `{ type = "reviewed_and_accepted", date = "..." }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    TaskIterationStarted {
        date: DateTime<Utc>,
        /// Index into the unit's prerequisites iterations.
        prerequisites_version: usize,
    },
    ReviewedAndAccepted {
        date: DateTime<Utc>,
    },
    ReviewedAndNeedsMinorRevision {
        date: DateTime<Utc>,
    },
    MinorRevisionComplete {
        date: DateTime<Utc>,
    },
    ReviewedAndNeedsMajorRevision {
        date: DateTime<Utc>,
    },
    ReviewedAndNeedsRebuild {
        date: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn started(date: DateTime<Utc>, prerequisites_version: usize) -> Self {
        TaskEvent::TaskIterationStarted {
            date,
            prerequisites_version,
        }
    }

    pub fn accepted(date: DateTime<Utc>) -> Self {
        TaskEvent::ReviewedAndAccepted { date }
    }

    pub fn needs_minor_revision(date: DateTime<Utc>) -> Self {
        TaskEvent::ReviewedAndNeedsMinorRevision { date }
    }

    pub fn minor_revision_complete(date: DateTime<Utc>) -> Self {
        TaskEvent::MinorRevisionComplete { date }
    }

    pub fn needs_major_revision(date: DateTime<Utc>) -> Self {
        TaskEvent::ReviewedAndNeedsMajorRevision { date }
    }

    pub fn needs_rebuild(date: DateTime<Utc>) -> Self {
        TaskEvent::ReviewedAndNeedsRebuild { date }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match *self {
            TaskEvent::TaskIterationStarted { date, .. }
            | TaskEvent::ReviewedAndAccepted { date }
            | TaskEvent::ReviewedAndNeedsMinorRevision { date }
            | TaskEvent::MinorRevisionComplete { date }
            | TaskEvent::ReviewedAndNeedsMajorRevision { date }
            | TaskEvent::ReviewedAndNeedsRebuild { date } => date,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            TaskEvent::TaskIterationStarted { .. } => EventKind::TaskIterationStarted,
            TaskEvent::ReviewedAndAccepted { .. } => EventKind::ReviewedAndAccepted,
            TaskEvent::ReviewedAndNeedsMinorRevision { .. } => {
                EventKind::ReviewedAndNeedsMinorRevision
            }
            TaskEvent::MinorRevisionComplete { .. } => EventKind::MinorRevisionComplete,
            TaskEvent::ReviewedAndNeedsMajorRevision { .. } => {
                EventKind::ReviewedAndNeedsMajorRevision
            }
            TaskEvent::ReviewedAndNeedsRebuild { .. } => EventKind::ReviewedAndNeedsRebuild,
        }
    }

    /// The prerequisites version used, for `TaskIterationStarted` events.
    pub fn prerequisites_version(&self) -> Option<usize> {
        match self {
            TaskEvent::TaskIterationStarted {
                prerequisites_version,
                ..
            } => Some(*prerequisites_version),
            _ => None,
        }
    }
}
