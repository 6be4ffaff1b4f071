// src/errors.rs

//! Crate-wide error type and result alias.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::ChainId;

/// Which lifecycle rule an explicit event history broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRule {
    /// Events must be strictly increasing in time.
    NotChronological,
    /// No event may be dated after the reference `now`.
    InFuture,
    /// The first event must be a `TaskIterationStarted`.
    FirstEventNotStart,
    /// `TaskIterationStarted` may only open the history or follow a rebuild.
    StartOutOfPlace,
    /// The referenced prerequisites version does not exist.
    UnknownPrerequisitesVersion,
    /// The referenced prerequisites version is not the one currently expected.
    WrongPrerequisitesVersion,
    /// `MinorRevisionComplete` may only follow `ReviewedAndNeedsMinorRevision`.
    MinorRevisionCompleteOutOfPlace,
    /// A review result may only follow a start or a major revision request.
    ReviewOutOfPlace,
    /// Nothing may follow `ReviewedAndAccepted` or `MinorRevisionComplete`.
    EventAfterTerminal,
}

impl fmt::Display for HistoryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HistoryRule::NotChronological => "events are not in strictly increasing chronological order",
            HistoryRule::InFuture => "event is dated in the future",
            HistoryRule::FirstEventNotStart => "first event must be TaskIterationStarted",
            HistoryRule::StartOutOfPlace => {
                "TaskIterationStarted may only be the first event or follow ReviewedAndNeedsRebuild"
            }
            HistoryRule::UnknownPrerequisitesVersion => "prerequisites version does not exist",
            HistoryRule::WrongPrerequisitesVersion => {
                "prerequisites version is not the currently expected one"
            }
            HistoryRule::MinorRevisionCompleteOutOfPlace => {
                "MinorRevisionComplete may only follow ReviewedAndNeedsMinorRevision"
            }
            HistoryRule::ReviewOutOfPlace => {
                "review results may only follow TaskIterationStarted or ReviewedAndNeedsMajorRevision"
            }
            HistoryRule::EventAfterTerminal => {
                "no event may follow ReviewedAndAccepted or MinorRevisionComplete"
            }
        };
        f.write_str(text)
    }
}

/// Why a `TaskIterationStarted` event could not have happened when it says it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrematureStartReason {
    /// The prerequisites iteration used by the start was never approved.
    PrerequisitesNotApproved { version: usize },
    /// The prerequisites iteration was approved only after the start.
    PrerequisitesApprovedLater {
        version: usize,
        approved: DateTime<Utc>,
    },
    /// A direct dependency has not been accepted yet.
    DependencyIncomplete { dependency: String },
    /// The start predates the apparent end of a direct dependency.
    DependencyEndsLater {
        dependency: String,
        ends: DateTime<Utc>,
    },
}

impl fmt::Display for PrematureStartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrematureStartReason::PrerequisitesNotApproved { version } => {
                write!(f, "prerequisites version {version} was never approved")
            }
            PrematureStartReason::PrerequisitesApprovedLater { version, approved } => {
                write!(f, "prerequisites version {version} was only approved at {approved}")
            }
            PrematureStartReason::DependencyIncomplete { dependency } => {
                write!(f, "dependency '{dependency}' is not complete")
            }
            PrematureStartReason::DependencyEndsLater { dependency, ends } => {
                write!(f, "dependency '{dependency}' only ends at {ends}")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum TaskbraidError {
    #[error("Invalid event history for unit '{unit}' at event #{index}: {rule}")]
    EventHistoryInvalid {
        unit: String,
        index: usize,
        rule: HistoryRule,
    },

    #[error("Premature start of unit '{unit}' at event #{index}: {reason}")]
    PrematureTaskStart {
        unit: String,
        index: usize,
        reason: PrematureStartReason,
    },

    #[error("Unit '{unit}' is anticipated to end at {end}, before its start at {start}")]
    InvalidSchedule {
        unit: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Unit name '{0}' is used by more than one unit in the cluster")]
    DuplicateUnitName(String),

    #[error("A cluster needs at least one head unit")]
    EmptyCluster,

    #[error("Chain {0} does not belong to any path of this cluster")]
    NoSuchChainPath(ChainId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("Cycle detected in unit graph: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskbraidError {
    /// The lifecycle rule behind an [`TaskbraidError::EventHistoryInvalid`], if any.
    pub fn history_rule(&self) -> Option<HistoryRule> {
        match self {
            TaskbraidError::EventHistoryInvalid { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskbraidError>;
