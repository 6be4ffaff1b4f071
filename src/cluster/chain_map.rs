// src/cluster/chain_map.rs

//! Partition of a [`UnitGraph`] into isolated dependency chains.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cluster::chain::IsolatedDependencyChain;
use crate::cluster::graph::UnitGraph;
use crate::types::{ChainId, UnitId};
use crate::unit::TaskUnit;

/// Every chain of a cluster, indexed by member unit.
#[derive(Debug, Clone)]
pub struct ChainMap {
    chains: Vec<Arc<IsolatedDependencyChain>>,
    by_id: HashMap<ChainId, usize>,
    by_unit: HashMap<UnitId, usize>,
}

impl ChainMap {
    /// Split every unit of `graph` into exactly one chain.
    pub fn build(graph: &UnitGraph) -> Self {
        let mut chains = Vec::new();

        for unit in graph.units() {
            if linked_dependency(graph, unit).is_some() {
                // Not the upstream end of its chain; picked up by the walk below.
                continue;
            }

            let mut chain = IsolatedDependencyChain::new(Arc::clone(unit));
            let mut current = Arc::clone(unit);
            while let Some(next) = linked_dependent(graph, &current) {
                chain.push_dependent(Arc::clone(&next));
                current = next;
            }

            debug!(
                chain = %chain.id(),
                root = %chain.root().name(),
                head = %chain.head().name(),
                len = chain.len(),
                "formed dependency chain"
            );
            chains.push(Arc::new(chain));
        }

        let mut by_id = HashMap::new();
        let mut by_unit = HashMap::new();
        for (idx, chain) in chains.iter().enumerate() {
            by_id.insert(chain.id(), idx);
            for unit in chain.units() {
                by_unit.insert(unit.id(), idx);
            }
        }

        Self {
            chains,
            by_id,
            by_unit,
        }
    }

    /// Chain holding `unit`, if the unit belongs to this map.
    pub fn get_chain_of_unit(&self, unit: &TaskUnit) -> Option<&Arc<IsolatedDependencyChain>> {
        self.by_unit.get(&unit.id()).map(|idx| &self.chains[*idx])
    }

    pub fn get(&self, id: ChainId) -> Option<&Arc<IsolatedDependencyChain>> {
        self.by_id.get(&id).map(|idx| &self.chains[*idx])
    }

    pub fn contains(&self, chain: &IsolatedDependencyChain) -> bool {
        self.by_id.contains_key(&chain.id())
    }

    /// All chains, ordered by the name of their root unit.
    pub fn chains(&self) -> &[Arc<IsolatedDependencyChain>] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Chains that `chain`'s root unit depends on.
    pub fn dependencies_of(
        &self,
        chain: &IsolatedDependencyChain,
    ) -> Vec<&Arc<IsolatedDependencyChain>> {
        let mut out: Vec<&Arc<IsolatedDependencyChain>> = Vec::new();
        for dep in chain.root().direct_dependencies() {
            if let Some(c) = self.get_chain_of_unit(dep) {
                if !out.iter().any(|o| o.id() == c.id()) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Chains whose root unit depends on `chain`'s head unit.
    pub fn dependents_of(
        &self,
        graph: &UnitGraph,
        chain: &IsolatedDependencyChain,
    ) -> Vec<&Arc<IsolatedDependencyChain>> {
        let mut out: Vec<&Arc<IsolatedDependencyChain>> = Vec::new();
        for id in graph.dependents_of(chain.head().id()) {
            if let Some(idx) = self.by_unit.get(id) {
                let c = &self.chains[*idx];
                if !out.iter().any(|o| o.id() == c.id()) {
                    out.push(c);
                }
            }
        }
        out
    }
}

/// The dependency `unit` is welded to, if `unit` depends on exactly one unit
/// and is that unit's only dependent.
fn linked_dependency(graph: &UnitGraph, unit: &TaskUnit) -> Option<Arc<TaskUnit>> {
    match unit.direct_dependencies() {
        [only] if graph.dependents_of(only.id()) == [unit.id()] => Some(Arc::clone(only)),
        _ => None,
    }
}

/// The dependent `unit` is welded to, mirror of [`linked_dependency`].
fn linked_dependent(graph: &UnitGraph, unit: &TaskUnit) -> Option<Arc<TaskUnit>> {
    match graph.dependents_of(unit.id()) {
        [only] => {
            let next = graph.unit(*only)?;
            (next.direct_dependencies().len() == 1).then(|| Arc::clone(next))
        }
        _ => None,
    }
}
