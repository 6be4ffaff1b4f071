// src/cluster/mod.rs

//! Decomposition of a unit DAG for layout.
//!
//! - [`graph`] discovers every unit below the heads and indexes dependents.
//! - [`chain`] / [`chain_map`] split the graph into unbranched chains.
//! - [`path`] groups chains that must be drawn together.
//! - [`stress`] measures how entangled paths are and ranks them.
//! - [`cluster`] is the entry point tying it all together.

pub mod chain;
pub mod chain_map;
#[allow(clippy::module_inception)]
pub mod cluster;
pub mod graph;
pub mod path;
pub mod stress;

pub use chain::IsolatedDependencyChain;
pub use chain_map::ChainMap;
pub use cluster::TaskUnitCluster;
pub use graph::UnitGraph;
pub use path::ChainPath;
pub use stress::{ChainStrainMap, StressManager, StressTracker};
