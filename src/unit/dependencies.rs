// src/unit/dependencies.rs

//! Dependency resolution for a unit that is being constructed.
//!
//! Everything here only looks *down* the graph: a unit knows its
//! dependencies, never its dependents.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use crate::types::UnitId;
use crate::unit::{PrerequisitesIteration, TaskUnit};

/// Dependency-derived state of a unit, computed once at construction.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedDependencies {
    /// Minimal non-redundant dependency set of the latest iteration.
    pub direct: Vec<Arc<TaskUnit>>,
    /// Dependencies of earlier iterations that are no longer direct.
    pub stale: Vec<Arc<TaskUnit>>,
    /// Transitive closure of `direct`.
    pub all: HashMap<UnitId, Arc<TaskUnit>>,
    /// Number of distinct paths to each transitive dependency.
    pub attachment: HashMap<UnitId, usize>,
    /// Number of distinct routes from the unit down to every reachable leaf.
    pub attachment_to_dependencies: usize,
}

pub(crate) fn resolve(unit_name: &str, iterations: &[PrerequisitesIteration]) -> ResolvedDependencies {
    let declared = iterations
        .last()
        .map(|it| it.parent_units())
        .unwrap_or(&[]);

    let direct = true_direct_dependencies(unit_name, declared);
    let direct_ids: HashSet<UnitId> = direct.iter().map(|u| u.id()).collect();

    let mut stale = Vec::new();
    let mut stale_ids = HashSet::new();
    let earlier = iterations.len().saturating_sub(1);
    for iteration in &iterations[..earlier] {
        for parent in iteration.parent_units() {
            if !direct_ids.contains(&parent.id()) && stale_ids.insert(parent.id()) {
                stale.push(Arc::clone(parent));
            }
        }
    }

    let mut all = HashMap::new();
    let mut attachment: HashMap<UnitId, usize> = HashMap::new();
    let mut attachment_to_dependencies = 0;

    for dep in &direct {
        all.insert(dep.id(), Arc::clone(dep));
        for (id, unit) in dep.dependency_index() {
            all.insert(*id, Arc::clone(unit));
        }

        *attachment.entry(dep.id()).or_default() += 1;
        for (id, paths) in dep.attachment_map() {
            *attachment.entry(*id).or_default() += paths;
        }

        attachment_to_dependencies += dep.attachment_to_dependencies().max(1);
    }

    ResolvedDependencies {
        direct,
        stale,
        all,
        attachment,
        attachment_to_dependencies,
    }
}

/// Drop duplicates and any declared dependency already implied by a sibling.
fn true_direct_dependencies(unit_name: &str, declared: &[Arc<TaskUnit>]) -> Vec<Arc<TaskUnit>> {
    let mut seen = HashSet::new();
    let unique: Vec<&Arc<TaskUnit>> = declared.iter().filter(|u| seen.insert(u.id())).collect();

    let direct: Vec<Arc<TaskUnit>> = unique
        .iter()
        .filter(|candidate| {
            !unique
                .iter()
                .any(|other| other.id() != candidate.id() && other.is_dependent_on(candidate))
        })
        .map(|u| Arc::clone(u))
        .collect();

    if direct.len() < declared.len() {
        let dropped: Vec<&str> = declared
            .iter()
            .filter(|u| !direct.iter().any(|d| d.id() == u.id()))
            .map(|u| u.name())
            .collect();
        warn!(
            unit = %unit_name,
            ?dropped,
            "declared dependencies are implied by other dependencies; ignoring them"
        );
    }

    direct
}
