// src/cluster/cluster.rs

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cluster::chain::IsolatedDependencyChain;
use crate::cluster::chain_map::ChainMap;
use crate::cluster::graph::UnitGraph;
use crate::cluster::path::ChainPath;
use crate::cluster::stress::{StressManager, StressTracker};
use crate::errors::{Result, TaskbraidError};
use crate::types::{ChainId, PathId};
use crate::unit::TaskUnit;

/// The whole dependency graph below a set of head units, decomposed into
/// chains and paths and ranked for layout.
///
/// Built once from its heads; immutable afterwards.
#[derive(Debug)]
pub struct TaskUnitCluster {
    heads: Vec<Arc<TaskUnit>>,
    graph: UnitGraph,
    chain_map: ChainMap,
    paths: Vec<Arc<ChainPath>>,
    path_of_chain: HashMap<ChainId, PathId>,
    paths_sorted_by_ranking: Vec<Arc<ChainPath>>,
    stress: StressManager,
}

impl TaskUnitCluster {
    /// Discover, partition and rank everything reachable from `heads`.
    ///
    /// Fails with [`TaskbraidError::EmptyCluster`] if `heads` is empty and
    /// with [`TaskbraidError::DuplicateUnitName`] if two reachable units share
    /// a name.
    pub fn new(heads: Vec<Arc<TaskUnit>>) -> Result<Self> {
        if heads.is_empty() {
            return Err(TaskbraidError::EmptyCluster);
        }

        let mut seen = HashSet::new();
        let heads: Vec<Arc<TaskUnit>> = heads.into_iter().filter(|h| seen.insert(h.id())).collect();
        for head in &heads {
            if let Some(other) = heads.iter().find(|o| o.is_dependent_on(head)) {
                warn!(
                    head = %head.name(),
                    dependent = %other.name(),
                    "head unit is a dependency of another head"
                );
            }
        }

        let graph = UnitGraph::discover(&heads)?;
        let chain_map = ChainMap::build(&graph);
        let path_chains = partition_into_paths(&graph, &chain_map);

        let paths: Vec<Arc<ChainPath>> = path_chains
            .into_iter()
            .map(|chains| Arc::new(ChainPath::new(chains)))
            .collect();

        let mut path_of_chain = HashMap::new();
        for path in &paths {
            for chain in path.chains() {
                path_of_chain.insert(chain.id(), path.id());
            }
            debug!(
                path = %path.id(),
                chains = path.chains().len(),
                tracks = path.tracks().len(),
                units = path.unit_count(),
                "formed chain path"
            );
        }

        let stress = StressManager::new(&paths, &chain_map, &path_of_chain);
        let by_id: HashMap<PathId, &Arc<ChainPath>> = paths.iter().map(|p| (p.id(), p)).collect();
        let paths_sorted_by_ranking: Vec<Arc<ChainPath>> = stress
            .ranking()
            .into_iter()
            .filter_map(|id| by_id.get(&id).map(|p| Arc::clone(p)))
            .collect();

        debug!(
            heads = heads.len(),
            units = graph.len(),
            chains = chain_map.len(),
            paths = paths.len(),
            "built task unit cluster"
        );

        Ok(Self {
            heads,
            graph,
            chain_map,
            paths,
            path_of_chain,
            paths_sorted_by_ranking,
            stress,
        })
    }

    /// The most-downstream units the cluster was built from.
    pub fn heads(&self) -> &[Arc<TaskUnit>] {
        &self.heads
    }

    /// Paths in construction order.
    pub fn paths(&self) -> &[Arc<ChainPath>] {
        &self.paths
    }

    /// Paths ordered centre-out by strain: most entangled in the middle.
    pub fn paths_sorted_by_ranking(&self) -> &[Arc<ChainPath>] {
        &self.paths_sorted_by_ranking
    }

    pub fn chain_map(&self) -> &ChainMap {
        &self.chain_map
    }

    /// Path owning `chain`.
    ///
    /// Fails with [`TaskbraidError::NoSuchChainPath`] for chains that were
    /// not produced by this cluster.
    pub fn get_path_of_chain(&self, chain: &IsolatedDependencyChain) -> Result<&Arc<ChainPath>> {
        self.path_of_chain
            .get(&chain.id())
            .and_then(|id| self.paths.iter().find(|p| p.id() == *id))
            .ok_or(TaskbraidError::NoSuchChainPath(chain.id()))
    }

    /// Strain bookkeeping of `path`, if it belongs to this cluster.
    pub fn strain_of_path(&self, path: &ChainPath) -> Option<&StressTracker> {
        self.stress.tracker(path.id())
    }

    pub fn stress(&self) -> &StressManager {
        &self.stress
    }

    /// Number of distinct units reachable from the heads.
    pub fn unit_count(&self) -> usize {
        self.graph.len()
    }

    pub fn contains_unit(&self, unit: &TaskUnit) -> bool {
        self.graph.contains(unit.id())
    }
}

/// Greedy downward walk over the chain graph.
///
/// Each unassigned chain, most downstream first, opens a path. The path keeps
/// swallowing an unassigned dependency chain as long as every chain relying on
/// that dependency also feeds the path's opening chain; a dependency shared
/// with a braid that never reconverges here is left to open a path of its own.
/// Only graph shape is consulted, never dates.
fn partition_into_paths(
    graph: &UnitGraph,
    chain_map: &ChainMap,
) -> Vec<Vec<Arc<IsolatedDependencyChain>>> {
    let levels = downstream_levels(graph, chain_map);

    let mut order: Vec<&Arc<IsolatedDependencyChain>> = chain_map.chains().iter().collect();
    order.sort_by_key(|c| {
        (
            levels.get(&c.id()).copied().unwrap_or(0),
            Reverse(c.head().attachment_to_dependencies()),
            Reverse(c.len()),
            c.head().name().to_string(),
        )
    });

    let mut assigned: HashSet<ChainId> = HashSet::new();
    let mut paths = Vec::new();

    for start in order {
        if assigned.contains(&start.id()) {
            continue;
        }

        let mut members = Vec::new();
        let mut current = Arc::clone(start);
        loop {
            assigned.insert(current.id());
            members.push(Arc::clone(&current));

            let next = chain_map
                .dependencies_of(&current)
                .into_iter()
                .filter(|c| !assigned.contains(&c.id()))
                .filter(|c| feeds_only(graph, chain_map, c, start))
                .min_by_key(|c| {
                    (
                        Reverse(c.head().attachment_to_dependencies()),
                        Reverse(c.len()),
                        c.head().name().to_string(),
                    )
                })
                .cloned();

            match next {
                Some(chain) => current = chain,
                None => break,
            }
        }
        paths.push(members);
    }

    paths
}

/// Whether every chain relying on `candidate` is `start` or upstream of it.
fn feeds_only(
    graph: &UnitGraph,
    chain_map: &ChainMap,
    candidate: &IsolatedDependencyChain,
    start: &IsolatedDependencyChain,
) -> bool {
    chain_map
        .dependents_of(graph, candidate)
        .into_iter()
        .all(|dependent| {
            dependent.id() == start.id() || start.head().is_dependent_on(dependent.head())
        })
}

/// Distance of every chain from the most downstream chains (level 0 =
/// nothing in the cluster depends on it).
fn downstream_levels(graph: &UnitGraph, chain_map: &ChainMap) -> HashMap<ChainId, usize> {
    fn level_of(
        chain: &IsolatedDependencyChain,
        graph: &UnitGraph,
        chain_map: &ChainMap,
        memo: &mut HashMap<ChainId, usize>,
    ) -> usize {
        if let Some(level) = memo.get(&chain.id()) {
            return *level;
        }
        let level = chain_map
            .dependents_of(graph, chain)
            .into_iter()
            .map(|dependent| level_of(dependent, graph, chain_map, memo) + 1)
            .max()
            .unwrap_or(0);
        memo.insert(chain.id(), level);
        level
    }

    let mut memo = HashMap::new();
    for chain in chain_map.chains() {
        level_of(chain, graph, chain_map, &mut memo);
    }
    memo
}
