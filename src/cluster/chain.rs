// src/cluster/chain.rs

use std::sync::Arc;

use chrono::Duration;

use crate::types::{ChainId, TimeSpan};
use crate::unit::TaskUnit;

/// A maximal run of units connected one-to-one.
///
/// Units are stored upstream first: `units()[i + 1]` depends on `units()[i]`
/// and on nothing else, and nothing else depends on `units()[i]`.
#[derive(Debug, Clone)]
pub struct IsolatedDependencyChain {
    id: ChainId,
    units: Vec<Arc<TaskUnit>>,
}

impl IsolatedDependencyChain {
    /// Start a chain at its most upstream unit.
    pub fn new(root: Arc<TaskUnit>) -> Self {
        Self {
            id: ChainId::generate(),
            units: vec![root],
        }
    }

    /// Append the next unit downstream.
    pub(crate) fn push_dependent(&mut self, unit: Arc<TaskUnit>) {
        debug_assert!(unit.direct_dependencies().len() == 1);
        self.units.push(unit);
    }

    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn units(&self) -> &[Arc<TaskUnit>] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Most upstream unit; its dependencies lead to other chains.
    pub fn root(&self) -> &Arc<TaskUnit> {
        &self.units[0]
    }

    /// Most downstream unit; its dependents belong to other chains.
    pub fn head(&self) -> &Arc<TaskUnit> {
        &self.units[self.units.len() - 1]
    }

    pub fn contains(&self, unit: &TaskUnit) -> bool {
        self.units.iter().any(|u| u.id() == unit.id())
    }

    /// Sum of the member units' presence times.
    pub fn presence_time(&self) -> Duration {
        self.units
            .iter()
            .fold(Duration::zero(), |acc, u| acc + u.presence_time())
    }

    /// Earliest apparent start to latest apparent end of the member units.
    pub fn span(&self) -> TimeSpan {
        self.units[1..]
            .iter()
            .fold(self.units[0].apparent_span(), |span, u| {
                span.union(&u.apparent_span())
            })
    }
}

impl PartialEq for IsolatedDependencyChain {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IsolatedDependencyChain {}
