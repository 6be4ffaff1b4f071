// src/unit/prerequisites.rs

//! Versioned snapshots of a unit's declared dependencies.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::IterationId;
use crate::unit::TaskUnit;

/// One version of a unit's declared dependency set, plus its approval.
///
/// A unit's iterations are ordered: index `n` is "prerequisites version `n`".
/// Only the latest one defines the unit's current dependencies; earlier ones
/// survive as stale relationships.
#[derive(Debug, Clone)]
pub struct PrerequisitesIteration {
    id: IterationId,
    approved_date: Option<DateTime<Utc>>,
    parent_units: Vec<Arc<TaskUnit>>,
}

impl PrerequisitesIteration {
    pub fn new(approved_date: Option<DateTime<Utc>>, parent_units: Vec<Arc<TaskUnit>>) -> Self {
        Self {
            id: IterationId::generate(),
            approved_date,
            parent_units,
        }
    }

    /// An iteration approved at `date` with the given parents.
    pub fn approved(date: DateTime<Utc>, parent_units: Vec<Arc<TaskUnit>>) -> Self {
        Self::new(Some(date), parent_units)
    }

    /// An iteration still awaiting approval.
    pub fn unapproved(parent_units: Vec<Arc<TaskUnit>>) -> Self {
        Self::new(None, parent_units)
    }

    pub fn id(&self) -> IterationId {
        self.id
    }

    pub fn approved_date(&self) -> Option<DateTime<Utc>> {
        self.approved_date
    }

    pub fn parent_units(&self) -> &[Arc<TaskUnit>] {
        &self.parent_units
    }
}
