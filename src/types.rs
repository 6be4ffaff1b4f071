// src/types.rs

//! Identifiers and small value types shared by units, chains and paths.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Unique identity of a [`TaskUnit`](crate::unit::TaskUnit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(Uuid);

/// Unique identity of an [`IsolatedDependencyChain`](crate::cluster::IsolatedDependencyChain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(Uuid);

/// Unique identity of a [`ChainPath`](crate::cluster::ChainPath).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(Uuid);

/// Unique identity of a [`PrerequisitesIteration`](crate::unit::PrerequisitesIteration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IterationId(Uuid);

macro_rules! impl_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Generate a fresh, random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0.simple())
            }
        }
    };
}

impl_id!(UnitId, "unit");
impl_id!(ChainId, "chain");
impl_id!(PathId, "path");
impl_id!(IterationId, "prereq");

/// A closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(&self, other: &TimeSpan) -> TimeSpan {
        TimeSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether the two spans share any instant beyond a touching edge.
    ///
    /// A span ending exactly where another begins does not overlap it, so
    /// back-to-back work can share a track.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
