// src/cluster/graph.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::{Result, TaskbraidError};
use crate::types::UnitId;
use crate::unit::TaskUnit;

/// Internal node structure: the unit plus its dependents inside the cluster.
#[derive(Debug, Clone)]
struct UnitNode {
    unit: Arc<TaskUnit>,
    /// Units of this graph that list this one as a direct dependency.
    dependents: Vec<UnitId>,
}

/// Every unit reachable from a set of heads, with dependents indexed.
///
/// Units themselves only point at their dependencies; this index is the one
/// place where reverse edges exist, and it only lives as long as the cluster
/// that built it.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    nodes: HashMap<UnitId, UnitNode>,
    /// Unit ids ordered by name for deterministic iteration.
    order: Vec<UnitId>,
}

impl UnitGraph {
    /// Walk down from `heads` through true direct dependencies.
    ///
    /// Names are the only stable handle on a unit, so two reachable units
    /// sharing a name are rejected with [`TaskbraidError::DuplicateUnitName`].
    pub fn discover(heads: &[Arc<TaskUnit>]) -> Result<Self> {
        let mut nodes: HashMap<UnitId, UnitNode> = HashMap::new();

        // First pass: collect every reachable unit.
        let mut stack: Vec<Arc<TaskUnit>> = heads.to_vec();
        while let Some(unit) = stack.pop() {
            if nodes.contains_key(&unit.id()) {
                continue;
            }
            stack.extend(unit.direct_dependencies().iter().cloned());
            nodes.insert(
                unit.id(),
                UnitNode {
                    unit,
                    dependents: Vec::new(),
                },
            );
        }

        let mut names: HashSet<&str> = HashSet::new();
        if let Some(dup) = nodes.values().find(|n| !names.insert(n.unit.name())) {
            return Err(TaskbraidError::DuplicateUnitName(dup.unit.name().to_string()));
        }

        let mut order: Vec<UnitId> = nodes.keys().copied().collect();
        order.sort_by(|a, b| nodes[a].unit.name().cmp(nodes[b].unit.name()));

        // Second pass: populate dependents from each unit's dependencies.
        for id in &order {
            let deps: Vec<UnitId> = nodes[id]
                .unit
                .direct_dependencies()
                .iter()
                .map(|d| d.id())
                .collect();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(*id);
                }
            }
        }

        Ok(Self { nodes, order })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All units, ordered by name.
    pub fn units(&self) -> impl Iterator<Item = &Arc<TaskUnit>> {
        self.order.iter().map(|id| &self.nodes[id].unit)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Arc<TaskUnit>> {
        self.nodes.get(&id).map(|n| &n.unit)
    }

    /// Units that depend directly on `id`, ordered by name.
    pub fn dependents_of(&self, id: UnitId) -> &[UnitId] {
        self.nodes
            .get(&id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
