// src/config/assemble.rs

//! Turn a validated project file into constructed task units.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::model::{ProjectFile, UnitConfig};
use crate::config::validate::dependency_order;
use crate::errors::{Result, TaskbraidError};
use crate::unit::{PrerequisitesIteration, TaskUnit, UnitDefinition};

/// Every unit of a project, built against one reference time.
#[derive(Debug, Clone)]
pub struct Project {
    pub now: DateTime<Utc>,
    /// Units keyed by name.
    pub units: BTreeMap<String, Arc<TaskUnit>>,
    /// Heads to build a cluster from.
    pub heads: Vec<Arc<TaskUnit>>,
}

impl Project {
    pub fn unit(&self, name: &str) -> Result<&Arc<TaskUnit>> {
        self.units
            .get(name)
            .ok_or_else(|| TaskbraidError::UnitNotFound(name.to_string()))
    }
}

/// Construct every unit in dependency order.
///
/// Fails on the first unit whose history is invalid or starts prematurely.
pub fn assemble(cfg: &ProjectFile, now: DateTime<Utc>) -> Result<Project> {
    let order = dependency_order(&cfg.unit)?;
    let mut units: BTreeMap<String, Arc<TaskUnit>> = BTreeMap::new();

    for name in order {
        let unit_cfg = cfg
            .unit
            .get(&name)
            .ok_or_else(|| TaskbraidError::UnitNotFound(name.clone()))?;
        let definition = definition_for(&name, unit_cfg, &units)?;
        let unit = TaskUnit::new(now, definition)?;
        debug!(unit = %name, "assembled unit from project file");
        units.insert(name, unit);
    }

    let heads = if cfg.project.heads.is_empty() {
        units
            .values()
            .filter(|candidate| !units.values().any(|u| u.is_dependent_on(candidate)))
            .cloned()
            .collect()
    } else {
        cfg.project
            .heads
            .iter()
            .map(|name| {
                units
                    .get(name)
                    .cloned()
                    .ok_or_else(|| TaskbraidError::UnitNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?
    };

    info!(
        units = units.len(),
        heads = heads.len(),
        %now,
        "assembled project"
    );

    Ok(Project { now, units, heads })
}

fn definition_for(
    name: &str,
    cfg: &UnitConfig,
    built: &BTreeMap<String, Arc<TaskUnit>>,
) -> Result<UnitDefinition> {
    let prerequisites_iterations = cfg
        .prerequisites
        .iter()
        .map(|p| {
            let parents = p
                .parents
                .iter()
                .map(|parent| {
                    built
                        .get(parent)
                        .cloned()
                        .ok_or_else(|| TaskbraidError::UnitNotFound(parent.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(PrerequisitesIteration::new(p.approved, parents))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UnitDefinition {
        name: name.to_string(),
        anticipated_start_date: cfg.anticipated_start,
        anticipated_end_date: cfg.anticipated_end,
        prerequisites_iterations,
        event_history: cfg.events.clone(),
    })
}
