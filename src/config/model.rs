// src/config/model.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::unit::TaskEvent;

/// Project file exactly as read from TOML, before validation.
///
/// ```toml
/// [project]
/// now = "2024-03-10T09:00:00Z"
/// heads = ["D"]
///
/// [unit.A]
/// anticipated_start = "2024-03-01T09:00:00Z"
/// anticipated_end = "2024-03-03T09:00:00Z"
///
/// [[unit.A.prerequisites]]
/// approved = "2024-03-01T08:00:00Z"
/// parents = []
///
/// [[unit.A.events]]
/// type = "task_iteration_started"
/// date = "2024-03-01T09:00:00Z"
/// prerequisites_version = 0
/// ```
///
/// Dates are RFC 3339 strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProjectFile {
    #[serde(default)]
    pub project: ProjectSection,

    /// All units from `[unit.<name>]`, keyed by unit name.
    #[serde(default)]
    pub unit: BTreeMap<String, UnitConfig>,
}

/// Validated project file. Only produced through `TryFrom<RawProjectFile>`.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub project: ProjectSection,
    pub unit: BTreeMap<String, UnitConfig>,
}

impl ProjectFile {
    pub(crate) fn new_unchecked(
        project: ProjectSection,
        unit: BTreeMap<String, UnitConfig>,
    ) -> Self {
        Self { project, unit }
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectSection {
    /// Reference time for every unit. The CLI falls back to the wall clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,

    /// Head units of the cluster. Empty means "every unit nothing depends on".
    #[serde(default)]
    pub heads: Vec<String>,
}

/// `[unit.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub anticipated_start: DateTime<Utc>,
    pub anticipated_end: DateTime<Utc>,

    /// Prerequisites versions, oldest first.
    #[serde(default)]
    pub prerequisites: Vec<PrerequisitesConfig>,

    /// Explicit event history, oldest first.
    #[serde(default)]
    pub events: Vec<TaskEvent>,
}

impl UnitConfig {
    /// Every unit named by any prerequisites version, current or stale.
    pub fn all_parents(&self) -> impl Iterator<Item = &str> {
        self.prerequisites
            .iter()
            .flat_map(|p| p.parents.iter().map(String::as_str))
    }
}

/// `[[unit.<name>.prerequisites]]` entry.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PrerequisitesConfig {
    #[serde(default)]
    pub approved: Option<DateTime<Utc>>,

    /// Names of the units this version depends on.
    #[serde(default)]
    pub parents: Vec<String>,
}
