// src/unit/projection.rs

//! Synthetic continuation of an incomplete history.
//!
//! Projected events are never merged into the explicit history; they only
//! exist so an unfinished unit has a plausible end date.

use chrono::{DateTime, Duration, Utc};

use crate::unit::history::{LifecycleState, Replay};
use crate::unit::TaskEvent;

pub(crate) struct ProjectionInput<'a> {
    pub now: DateTime<Utc>,
    pub explicit: &'a [TaskEvent],
    pub replay: Replay,
    pub apparent_start: DateTime<Utc>,
    pub anticipated_duration: Duration,
}

pub(crate) fn project(input: &ProjectionInput<'_>) -> Vec<TaskEvent> {
    let duration = input.anticipated_duration;
    let now = input.now;

    let Some(last) = input.explicit.last() else {
        let start = input.apparent_start;
        return vec![
            TaskEvent::started(start, input.replay.expected_version),
            TaskEvent::accepted(start + duration),
        ];
    };

    let last_date = last.date();
    match input.replay.state {
        LifecycleState::NotStarted => Vec::new(),
        LifecycleState::NeedsRebuild => {
            let restart = now.max(last_date);
            vec![
                TaskEvent::started(restart, input.replay.expected_version),
                TaskEvent::accepted(restart + duration),
            ]
        }
        LifecycleState::NeedsMajorRevision | LifecycleState::InProgress => {
            vec![TaskEvent::accepted(now.max(last_date + duration))]
        }
        LifecycleState::NeedsMinorRevision => {
            vec![TaskEvent::minor_revision_complete(
                now.max(last_date + duration),
            )]
        }
        LifecycleState::Accepted | LifecycleState::MinorRevisionComplete => Vec::new(),
    }
}
