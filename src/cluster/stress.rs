// src/cluster/stress.rs

//! Strain bookkeeping between paths.
//!
//! Whenever a chain in one path depends on a chain in another path, both
//! chains carry one unit of strain towards the other path. Paths that many
//! siblings lean on, or that lean on many siblings, are the most entangled
//! and are ranked towards the centre so their connectors stay short.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::cluster::chain_map::ChainMap;
use crate::cluster::path::ChainPath;
use crate::types::{ChainId, PathId};

/// Per chain: how many cross-path edges it has to each foreign path.
#[derive(Debug, Clone, Default)]
pub struct ChainStrainMap {
    strain: HashMap<ChainId, HashMap<PathId, usize>>,
}

impl ChainStrainMap {
    pub fn build(chain_map: &ChainMap, path_of_chain: &HashMap<ChainId, PathId>) -> Self {
        let mut strain: HashMap<ChainId, HashMap<PathId, usize>> = HashMap::new();

        for chain in chain_map.chains() {
            let Some(&own) = path_of_chain.get(&chain.id()) else {
                continue;
            };
            for dep in chain_map.dependencies_of(chain) {
                let Some(&other) = path_of_chain.get(&dep.id()) else {
                    continue;
                };
                if other == own {
                    continue;
                }
                *strain
                    .entry(chain.id())
                    .or_default()
                    .entry(other)
                    .or_default() += 1;
                *strain.entry(dep.id()).or_default().entry(own).or_default() += 1;
            }
        }

        Self { strain }
    }

    /// Total cross-path edges touching `chain`.
    pub fn strain_on_chain(&self, chain: ChainId) -> usize {
        self.strain
            .get(&chain)
            .map(|per_path| per_path.values().sum())
            .unwrap_or(0)
    }
}

/// Accumulated strain of one path.
#[derive(Debug, Clone)]
pub struct StressTracker {
    path: PathId,
    total_strain: usize,
    relies_on: HashSet<PathId>,
    relied_upon_by: HashSet<PathId>,
    unit_count: usize,
    chain_count: usize,
    sort_name: String,
}

impl StressTracker {
    fn new(path: &ChainPath) -> Self {
        Self {
            path: path.id(),
            total_strain: 0,
            relies_on: HashSet::new(),
            relied_upon_by: HashSet::new(),
            unit_count: path.unit_count(),
            chain_count: path.chains().len(),
            sort_name: path.sort_name().to_string(),
        }
    }

    pub fn path(&self) -> PathId {
        self.path
    }

    /// Sum of cross-path edges over every chain of the path.
    pub fn total_strain(&self) -> usize {
        self.total_strain
    }

    /// Number of distinct sibling paths this path is tied to, either way.
    pub fn neighbour_count(&self) -> usize {
        self.relies_on.union(&self.relied_upon_by).count()
    }

    /// Number of sibling paths that depend on this one.
    pub fn relied_upon_by(&self) -> usize {
        self.relied_upon_by.len()
    }

    /// Number of sibling paths this one depends on.
    pub fn relies_on(&self) -> usize {
        self.relies_on.len()
    }
}

/// Owns a tracker per path and produces the centre-out ranking.
#[derive(Debug, Clone)]
pub struct StressManager {
    strain_map: ChainStrainMap,
    trackers: HashMap<PathId, StressTracker>,
}

impl StressManager {
    pub fn new(
        paths: &[Arc<ChainPath>],
        chain_map: &ChainMap,
        path_of_chain: &HashMap<ChainId, PathId>,
    ) -> Self {
        let strain_map = ChainStrainMap::build(chain_map, path_of_chain);
        let mut trackers: HashMap<PathId, StressTracker> = paths
            .iter()
            .map(|p| (p.id(), StressTracker::new(p)))
            .collect();

        for chain in chain_map.chains() {
            let Some(&own) = path_of_chain.get(&chain.id()) else {
                continue;
            };
            if let Some(tracker) = trackers.get_mut(&own) {
                tracker.total_strain += strain_map.strain_on_chain(chain.id());
            }
            for dep in chain_map.dependencies_of(chain) {
                let Some(&other) = path_of_chain.get(&dep.id()) else {
                    continue;
                };
                if other == own {
                    continue;
                }
                if let Some(tracker) = trackers.get_mut(&own) {
                    tracker.relies_on.insert(other);
                }
                if let Some(tracker) = trackers.get_mut(&other) {
                    tracker.relied_upon_by.insert(own);
                }
            }
        }

        Self {
            strain_map,
            trackers,
        }
    }

    pub fn tracker(&self, path: PathId) -> Option<&StressTracker> {
        self.trackers.get(&path)
    }

    pub fn strain_map(&self) -> &ChainStrainMap {
        &self.strain_map
    }

    /// Path ids ordered so the most entangled path sits in the middle and
    /// strain falls off towards both ends.
    pub fn ranking(&self) -> Vec<PathId> {
        let mut sorted: Vec<&StressTracker> = self.trackers.values().collect();
        sorted.sort_by(|a, b| {
            let key = |t: &StressTracker| {
                Reverse((
                    t.neighbour_count(),
                    t.relied_upon_by(),
                    t.total_strain,
                    t.unit_count,
                    t.chain_count,
                ))
            };
            key(*a)
                .cmp(&key(*b))
                .then_with(|| a.sort_name.cmp(&b.sort_name))
        });

        let mut ranked: VecDeque<PathId> = VecDeque::with_capacity(sorted.len());
        for (i, tracker) in sorted.iter().enumerate() {
            debug!(
                path = %tracker.path,
                neighbours = tracker.neighbour_count(),
                relied_upon_by = tracker.relied_upon_by(),
                strain = tracker.total_strain,
                "ranking path"
            );
            if i % 2 == 0 && i > 0 {
                ranked.push_front(tracker.path);
            } else {
                ranked.push_back(tracker.path);
            }
        }
        ranked.into_iter().collect()
    }
}
