// tests/unit_lifecycle.rs

use std::sync::Arc;

use taskbraid::errors::{HistoryRule, PrematureStartReason, TaskbraidError};
use taskbraid::unit::LifecycleState;
use taskbraid::{TaskEvent, TaskUnit};
use taskbraid_test_utils::builders::UnitBuilder;
use taskbraid_test_utils::{day, epoch, hour, init_tracing};

/// A unit scheduled over day 0..2 with one approved prerequisites version,
/// evaluated at day 10.
fn approved_unit(name: &str) -> UnitBuilder {
    UnitBuilder::new(name)
        .scheduled(day(0), day(2))
        .now(day(10))
        .after(&[])
}

fn expect_rule(result: Result<Arc<TaskUnit>, TaskbraidError>, expected: HistoryRule) {
    match result {
        Err(TaskbraidError::EventHistoryInvalid { rule, .. }) => assert_eq!(rule, expected),
        Err(e) => panic!("Expected EventHistoryInvalid({expected:?}), got: {e:?}"),
        Ok(u) => panic!("Expected EventHistoryInvalid({expected:?}), got unit {u:?}"),
    }
}

fn expect_premature(result: Result<Arc<TaskUnit>, TaskbraidError>) -> PrematureStartReason {
    match result {
        Err(TaskbraidError::PrematureTaskStart { reason, .. }) => reason,
        Err(e) => panic!("Expected PrematureTaskStart, got: {e:?}"),
        Ok(u) => panic!("Expected PrematureTaskStart, got unit {u:?}"),
    }
}

#[test]
fn empty_history_is_valid() {
    init_tracing();
    let unit = approved_unit("A").build();
    assert!(unit.explicit_event_history().is_empty());
    assert_eq!(unit.lifecycle_state(), LifecycleState::NotStarted);
    assert!(!unit.is_complete());
}

#[test]
fn full_happy_path_is_complete() {
    let unit = approved_unit("A")
        .event(TaskEvent::started(day(0), 0))
        .event(TaskEvent::needs_major_revision(day(1)))
        .event(TaskEvent::needs_major_revision(day(2)))
        .event(TaskEvent::accepted(day(3)))
        .build();
    assert!(unit.is_complete());
    assert_eq!(unit.lifecycle_state(), LifecycleState::Accepted);
    assert!(unit.projected_event_history().is_empty());
    assert_eq!(unit.apparent_end_date(), day(3));
}

#[test]
fn first_event_must_be_a_start() {
    let result = approved_unit("A")
        .event(TaskEvent::accepted(day(1)))
        .try_build();
    expect_rule(result, HistoryRule::FirstEventNotStart);
}

#[test]
fn minor_revision_complete_cannot_open_history() {
    let result = approved_unit("A")
        .event(TaskEvent::minor_revision_complete(day(1)))
        .try_build();
    expect_rule(result, HistoryRule::FirstEventNotStart);
}

#[test]
fn events_must_strictly_increase() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(2), 0))
        .event(TaskEvent::accepted(day(1)))
        .try_build();
    expect_rule(result, HistoryRule::NotChronological);

    let result = approved_unit("A")
        .event(TaskEvent::started(day(2), 0))
        .event(TaskEvent::accepted(day(2)))
        .try_build();
    expect_rule(result, HistoryRule::NotChronological);
}

#[test]
fn events_cannot_be_in_the_future() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(11), 0))
        .try_build();
    expect_rule(result, HistoryRule::InFuture);
}

#[test]
fn event_exactly_at_now_is_allowed() {
    let unit = approved_unit("A")
        .event(TaskEvent::started(day(10), 0))
        .build();
    assert_eq!(unit.lifecycle_state(), LifecycleState::InProgress);
}

#[test]
fn start_cannot_follow_start() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::started(day(2), 0))
        .try_build();
    expect_rule(result, HistoryRule::StartOutOfPlace);
}

#[test]
fn start_cannot_follow_major_revision() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_major_revision(day(2)))
        .event(TaskEvent::started(day(3), 0))
        .try_build();
    expect_rule(result, HistoryRule::StartOutOfPlace);
}

#[test]
fn start_must_reference_existing_version() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 3))
        .try_build();
    expect_rule(result, HistoryRule::UnknownPrerequisitesVersion);

    let result = UnitBuilder::new("A")
        .now(day(10))
        .event(TaskEvent::started(day(1), 0))
        .try_build();
    expect_rule(result, HistoryRule::UnknownPrerequisitesVersion);
}

#[test]
fn first_start_must_use_version_zero() {
    let result = approved_unit("A")
        .after(&[])
        .event(TaskEvent::started(day(1), 1))
        .try_build();
    expect_rule(result, HistoryRule::WrongPrerequisitesVersion);
}

#[test]
fn minor_revision_complete_must_follow_minor_revision() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::minor_revision_complete(day(2)))
        .try_build();
    expect_rule(result, HistoryRule::MinorRevisionCompleteOutOfPlace);

    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_major_revision(day(2)))
        .event(TaskEvent::minor_revision_complete(day(3)))
        .try_build();
    expect_rule(result, HistoryRule::MinorRevisionCompleteOutOfPlace);
}

#[test]
fn review_cannot_follow_minor_revision_request() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_minor_revision(day(2)))
        .event(TaskEvent::accepted(day(3)))
        .try_build();
    expect_rule(result, HistoryRule::ReviewOutOfPlace);
}

#[test]
fn review_cannot_follow_rebuild() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::needs_major_revision(day(3)))
        .try_build();
    expect_rule(result, HistoryRule::ReviewOutOfPlace);
}

#[test]
fn nothing_follows_acceptance() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::accepted(day(2)))
        .event(TaskEvent::needs_major_revision(day(3)))
        .try_build();
    expect_rule(result, HistoryRule::EventAfterTerminal);
}

#[test]
fn nothing_follows_minor_revision_complete() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_minor_revision(day(2)))
        .event(TaskEvent::minor_revision_complete(day(3)))
        .event(TaskEvent::accepted(day(4)))
        .try_build();
    expect_rule(result, HistoryRule::EventAfterTerminal);
}

#[test]
fn minor_revision_complete_is_terminal_but_not_complete() {
    let unit = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_minor_revision(day(2)))
        .event(TaskEvent::minor_revision_complete(day(3)))
        .build();
    assert_eq!(unit.lifecycle_state(), LifecycleState::MinorRevisionComplete);
    assert!(unit.projected_event_history().is_empty());
    assert!(!unit.is_complete());
}

#[test]
fn rebuild_then_start_with_next_version_is_accepted() {
    let unit = approved_unit("A")
        .prerequisites(Some(day(3)), &[])
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(4), 1))
        .build();
    assert_eq!(unit.lifecycle_state(), LifecycleState::InProgress);
    assert_eq!(unit.apparent_start_date(), day(1));
}

#[test]
fn rebuild_then_start_on_approval_instant_is_accepted() {
    let unit = approved_unit("A")
        .prerequisites(Some(day(3)), &[])
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(3), 1))
        .build();
    assert_eq!(unit.explicit_event_history().len(), 3);
}

#[test]
fn rebuild_then_start_with_same_version_is_rejected() {
    let result = approved_unit("A")
        .prerequisites(Some(day(3)), &[])
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(4), 0))
        .try_build();
    expect_rule(result, HistoryRule::WrongPrerequisitesVersion);
}

#[test]
fn rebuild_then_start_with_missing_version_is_rejected() {
    let result = approved_unit("A")
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(4), 1))
        .try_build();
    expect_rule(result, HistoryRule::UnknownPrerequisitesVersion);
}

#[test]
fn rebuild_then_start_with_unapproved_version_is_premature() {
    let result = approved_unit("A")
        .prerequisites(None, &[])
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(4), 1))
        .try_build();
    assert_eq!(
        expect_premature(result),
        PrematureStartReason::PrerequisitesNotApproved { version: 1 }
    );
}

#[test]
fn rebuild_then_start_before_approval_is_premature() {
    let result = approved_unit("A")
        .prerequisites(Some(day(5)), &[])
        .event(TaskEvent::started(day(1), 0))
        .event(TaskEvent::needs_rebuild(day(2)))
        .event(TaskEvent::started(day(4), 1))
        .try_build();
    assert_eq!(
        expect_premature(result),
        PrematureStartReason::PrerequisitesApprovedLater {
            version: 1,
            approved: day(5)
        }
    );
}

#[test]
fn two_rebuilds_require_version_two() {
    let base = || {
        approved_unit("A")
            .prerequisites(Some(day(1)), &[])
            .prerequisites(Some(day(1)), &[])
            .event(TaskEvent::started(day(1), 0))
            .event(TaskEvent::needs_rebuild(day(2)))
            .event(TaskEvent::started(day(3), 1))
            .event(TaskEvent::needs_rebuild(day(4)))
    };

    let unit = base().event(TaskEvent::started(day(5), 2)).build();
    assert_eq!(unit.lifecycle_state(), LifecycleState::InProgress);

    expect_rule(
        base().event(TaskEvent::started(day(5), 1)).try_build(),
        HistoryRule::WrongPrerequisitesVersion,
    );
}

#[test]
fn start_with_unapproved_prerequisites_is_premature() {
    let result = UnitBuilder::new("A")
        .now(day(10))
        .prerequisites(None, &[])
        .event(TaskEvent::started(day(1), 0))
        .try_build();
    assert_eq!(
        expect_premature(result),
        PrematureStartReason::PrerequisitesNotApproved { version: 0 }
    );
}

#[test]
fn start_before_dependency_is_complete_is_premature() {
    let dep = approved_unit("dep")
        .event(TaskEvent::started(day(0), 0))
        .build();
    let result = UnitBuilder::new("B")
        .now(day(10))
        .after(&[&dep])
        .event(TaskEvent::started(day(1), 0))
        .try_build();
    assert_eq!(
        expect_premature(result),
        PrematureStartReason::DependencyIncomplete {
            dependency: "dep".to_string()
        }
    );
}

#[test]
fn start_before_dependency_ends_is_premature() {
    let dep = approved_unit("dep")
        .event(TaskEvent::started(day(0), 0))
        .event(TaskEvent::accepted(day(3)))
        .build();
    let result = UnitBuilder::new("B")
        .now(day(10))
        .after(&[&dep])
        .event(TaskEvent::started(day(2), 0))
        .try_build();
    assert_eq!(
        expect_premature(result),
        PrematureStartReason::DependencyEndsLater {
            dependency: "dep".to_string(),
            ends: day(3)
        }
    );
}

#[test]
fn start_after_dependency_acceptance_is_valid() {
    let dep = approved_unit("dep")
        .event(TaskEvent::started(day(0), 0))
        .event(TaskEvent::accepted(day(3)))
        .build();
    let unit = UnitBuilder::new("B")
        .now(day(10))
        .after(&[&dep])
        .event(TaskEvent::started(day(3) + chrono::Duration::hours(1), 0))
        .event(TaskEvent::accepted(day(5)))
        .build();
    assert!(unit.is_complete());
    assert!(unit.is_dependent_on(&dep));
}

#[test]
fn error_reports_offending_index_and_unit() {
    let result = approved_unit("named")
        .event(TaskEvent::started(hour(1), 0))
        .event(TaskEvent::accepted(hour(2)))
        .event(TaskEvent::accepted(hour(3)))
        .try_build();
    match result {
        Err(err @ TaskbraidError::EventHistoryInvalid { .. }) => {
            assert_eq!(err.history_rule(), Some(HistoryRule::EventAfterTerminal));
            let msg = err.to_string();
            assert!(msg.contains("named"));
            assert!(msg.contains("#2"));
        }
        other => panic!("Expected EventHistoryInvalid, got: {other:?}"),
    }
}

#[test]
fn reference_time_is_recorded() {
    let unit = UnitBuilder::new("A").now(epoch()).build();
    assert_eq!(unit.now(), epoch());
}

#[test]
fn dependency_added_by_rebuild_applies_to_earlier_starts() {
    let x = approved_unit("X")
        .event(TaskEvent::started(day(0), 0))
        .event(TaskEvent::accepted(day(1)))
        .build();
    let y = approved_unit("Y")
        .event(TaskEvent::started(day(0), 0))
        .event(TaskEvent::accepted(day(4)))
        .build();

    // Version 0 only needed X; version 1 adds Y, which ends after the first start.
    let result = UnitBuilder::new("U")
        .now(day(10))
        .prerequisites(Some(day(0)), &[&x])
        .prerequisites(Some(day(3)), &[&x, &y])
        .event(TaskEvent::started(day(2), 0))
        .event(TaskEvent::needs_rebuild(day(3)))
        .try_build();

    match result {
        Err(TaskbraidError::PrematureTaskStart {
            unit,
            index,
            reason,
        }) => {
            assert_eq!(unit, "U");
            assert_eq!(index, 0);
            assert_eq!(
                reason,
                PrematureStartReason::DependencyEndsLater {
                    dependency: "Y".to_string(),
                    ends: day(4)
                }
            );
        }
        other => panic!("Expected PrematureTaskStart, got: {other:?}"),
    }
}
