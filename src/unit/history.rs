// src/unit/history.rs

//! Replay of an explicit event history through the unit lifecycle.
//!
//! The history is scanned front to back. Each event is checked against the
//! [`LifecycleState`] reached so far; the scan never mutates the unit, it only
//! produces the final state (used for projection) or the first violation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::{HistoryRule, PrematureStartReason, Result, TaskbraidError};
use crate::unit::{EventKind, PrerequisitesIteration, TaskEvent, TaskUnit};

/// Where a unit stands after some prefix of its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No events recorded.
    NotStarted,
    /// An iteration is in progress and awaiting review.
    InProgress,
    NeedsMinorRevision,
    NeedsMajorRevision,
    /// The current iteration was thrown away; a new one must start.
    NeedsRebuild,
    Accepted,
    MinorRevisionComplete,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LifecycleState::Accepted | LifecycleState::MinorRevisionComplete
        )
    }

    fn after(kind: EventKind) -> Self {
        match kind {
            EventKind::TaskIterationStarted => LifecycleState::InProgress,
            EventKind::ReviewedAndAccepted => LifecycleState::Accepted,
            EventKind::ReviewedAndNeedsMinorRevision => LifecycleState::NeedsMinorRevision,
            EventKind::MinorRevisionComplete => LifecycleState::MinorRevisionComplete,
            EventKind::ReviewedAndNeedsMajorRevision => LifecycleState::NeedsMajorRevision,
            EventKind::ReviewedAndNeedsRebuild => LifecycleState::NeedsRebuild,
        }
    }
}

/// Result of replaying a valid history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub state: LifecycleState,
    /// Prerequisites version the next `TaskIterationStarted` must use.
    pub expected_version: usize,
}

/// Everything the replay needs to know about the unit under construction.
pub(crate) struct HistoryContext<'a> {
    pub unit_name: &'a str,
    pub now: DateTime<Utc>,
    pub prerequisites: &'a [PrerequisitesIteration],
    pub direct_dependencies: &'a [Arc<TaskUnit>],
}

impl HistoryContext<'_> {
    fn invalid(&self, index: usize, rule: HistoryRule) -> TaskbraidError {
        TaskbraidError::EventHistoryInvalid {
            unit: self.unit_name.to_string(),
            index,
            rule,
        }
    }

    fn premature(&self, index: usize, reason: PrematureStartReason) -> TaskbraidError {
        TaskbraidError::PrematureTaskStart {
            unit: self.unit_name.to_string(),
            index,
            reason,
        }
    }
}

pub(crate) fn replay(ctx: &HistoryContext<'_>, events: &[TaskEvent]) -> Result<Replay> {
    let mut state = LifecycleState::NotStarted;
    let mut expected_version = 0;
    let mut previous: Option<DateTime<Utc>> = None;

    for (index, event) in events.iter().enumerate() {
        let date = event.date();
        if previous.is_some_and(|prev| date <= prev) {
            return Err(ctx.invalid(index, HistoryRule::NotChronological));
        }
        if date > ctx.now {
            return Err(ctx.invalid(index, HistoryRule::InFuture));
        }
        if state.is_terminal() {
            return Err(ctx.invalid(index, HistoryRule::EventAfterTerminal));
        }

        let kind = event.kind();
        if state == LifecycleState::NotStarted && kind != EventKind::TaskIterationStarted {
            return Err(ctx.invalid(index, HistoryRule::FirstEventNotStart));
        }

        match event {
            TaskEvent::TaskIterationStarted {
                prerequisites_version,
                ..
            } => {
                if !matches!(
                    state,
                    LifecycleState::NotStarted | LifecycleState::NeedsRebuild
                ) {
                    return Err(ctx.invalid(index, HistoryRule::StartOutOfPlace));
                }
                if *prerequisites_version >= ctx.prerequisites.len() {
                    return Err(ctx.invalid(index, HistoryRule::UnknownPrerequisitesVersion));
                }
                if *prerequisites_version != expected_version {
                    return Err(ctx.invalid(index, HistoryRule::WrongPrerequisitesVersion));
                }
                check_start_not_premature(ctx, index, date, *prerequisites_version)?;
            }
            TaskEvent::MinorRevisionComplete { .. } => {
                if state != LifecycleState::NeedsMinorRevision {
                    return Err(ctx.invalid(index, HistoryRule::MinorRevisionCompleteOutOfPlace));
                }
            }
            _ => {
                debug_assert!(kind.is_review_result());
                if !matches!(
                    state,
                    LifecycleState::InProgress | LifecycleState::NeedsMajorRevision
                ) {
                    return Err(ctx.invalid(index, HistoryRule::ReviewOutOfPlace));
                }
                if kind == EventKind::ReviewedAndNeedsRebuild {
                    expected_version += 1;
                }
            }
        }

        state = LifecycleState::after(kind);
        previous = Some(date);
    }

    Ok(Replay {
        state,
        expected_version,
    })
}

/// A start must come after its prerequisites were approved and after every
/// current direct dependency has been accepted and has ended.
fn check_start_not_premature(
    ctx: &HistoryContext<'_>,
    index: usize,
    date: DateTime<Utc>,
    version: usize,
) -> Result<()> {
    let iteration = &ctx.prerequisites[version];
    match iteration.approved_date() {
        None => {
            return Err(ctx.premature(
                index,
                PrematureStartReason::PrerequisitesNotApproved { version },
            ));
        }
        Some(approved) if approved > date => {
            return Err(ctx.premature(
                index,
                PrematureStartReason::PrerequisitesApprovedLater { version, approved },
            ));
        }
        Some(_) => {}
    }

    for dep in ctx.direct_dependencies {
        if !dep.is_complete() {
            return Err(ctx.premature(
                index,
                PrematureStartReason::DependencyIncomplete {
                    dependency: dep.name().to_string(),
                },
            ));
        }
    }

    if let Some(latest) = ctx
        .direct_dependencies
        .iter()
        .max_by_key(|dep| dep.apparent_end_date())
    {
        if date < latest.apparent_end_date() {
            return Err(ctx.premature(
                index,
                PrematureStartReason::DependencyEndsLater {
                    dependency: latest.name().to_string(),
                    ends: latest.apparent_end_date(),
                },
            ));
        }
    }

    Ok(())
}
