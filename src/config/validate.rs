// src/config/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ProjectFile, RawProjectFile, UnitConfig};
use crate::errors::{Result, TaskbraidError};

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = crate::errors::TaskbraidError;

    fn try_from(raw: RawProjectFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_project(&raw)?;
        Ok(ProjectFile::new_unchecked(raw.project, raw.unit))
    }
}

fn validate_raw_project(cfg: &RawProjectFile) -> Result<()> {
    ensure_has_units(cfg)?;
    validate_schedules(cfg)?;
    validate_references(cfg)?;
    dependency_order(&cfg.unit)?;
    Ok(())
}

fn ensure_has_units(cfg: &RawProjectFile) -> Result<()> {
    if cfg.unit.is_empty() {
        return Err(TaskbraidError::ConfigError(
            "project must contain at least one [unit.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedules(cfg: &RawProjectFile) -> Result<()> {
    for (name, unit) in cfg.unit.iter() {
        if unit.anticipated_end < unit.anticipated_start {
            return Err(TaskbraidError::ConfigError(format!(
                "unit '{}' has anticipated_end before anticipated_start",
                name
            )));
        }
    }
    Ok(())
}

fn validate_references(cfg: &RawProjectFile) -> Result<()> {
    for (name, unit) in cfg.unit.iter() {
        for parent in unit.all_parents() {
            if !cfg.unit.contains_key(parent) {
                return Err(TaskbraidError::ConfigError(format!(
                    "unit '{}' has unknown parent '{}' in `prerequisites`",
                    name, parent
                )));
            }
            if parent == name {
                return Err(TaskbraidError::ConfigError(format!(
                    "unit '{}' cannot depend on itself",
                    name
                )));
            }
        }
    }

    for head in cfg.project.heads.iter() {
        if !cfg.unit.contains_key(head) {
            return Err(TaskbraidError::ConfigError(format!(
                "[project].heads names unknown unit '{}'",
                head
            )));
        }
    }
    Ok(())
}

/// Unit names ordered so every parent comes before the units naming it.
///
/// Parents of every prerequisites version count, stale ones included, since
/// a unit keeps references to them.
pub(crate) fn dependency_order(units: &BTreeMap<String, UnitConfig>) -> Result<Vec<String>> {
    // Edge direction: parent -> unit.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in units.keys() {
        graph.add_node(name.as_str());
    }

    for (name, unit) in units.iter() {
        for parent in unit.all_parents() {
            graph.add_edge(parent, name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(TaskbraidError::DagCycle(format!(
                "cycle detected in unit graph involving unit '{}'",
                node
            )))
        }
    }
}
