// src/cluster/path.rs

use std::sync::Arc;

use chrono::Duration;

use crate::cluster::chain::IsolatedDependencyChain;
use crate::types::{ChainId, PathId, TimeSpan};

/// Chains that have to be laid out together.
///
/// `chains` is in the order the path was walked: downstream first. `tracks`
/// groups the same chains into sub-lanes so that no two chains in one track
/// overlap in time.
#[derive(Debug, Clone)]
pub struct ChainPath {
    id: PathId,
    chains: Vec<Arc<IsolatedDependencyChain>>,
    tracks: Vec<Vec<Arc<IsolatedDependencyChain>>>,
}

impl ChainPath {
    pub fn new(chains: Vec<Arc<IsolatedDependencyChain>>) -> Self {
        let tracks = arrange_tracks(&chains);
        Self {
            id: PathId::generate(),
            chains,
            tracks,
        }
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn chains(&self) -> &[Arc<IsolatedDependencyChain>] {
        &self.chains
    }

    pub fn tracks(&self) -> &[Vec<Arc<IsolatedDependencyChain>>] {
        &self.tracks
    }

    pub fn contains_chain(&self, id: ChainId) -> bool {
        self.chains.iter().any(|c| c.id() == id)
    }

    pub fn unit_count(&self) -> usize {
        self.chains.iter().map(|c| c.len()).sum()
    }

    /// Sum of the member chains' presence times.
    pub fn presence_time(&self) -> Duration {
        self.chains
            .iter()
            .fold(Duration::zero(), |acc, c| acc + c.presence_time())
    }

    /// Earliest start to latest end over all member chains.
    pub fn span(&self) -> Option<TimeSpan> {
        self.chains
            .iter()
            .map(|c| c.span())
            .reduce(|a, b| a.union(&b))
    }

    /// Whether the two paths need distinct rows because their time spans
    /// intersect.
    pub fn overlaps_with_path(&self, other: &ChainPath) -> bool {
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Name used to order otherwise equivalent paths.
    pub(crate) fn sort_name(&self) -> &str {
        self.chains
            .first()
            .map(|c| c.head().name())
            .unwrap_or_default()
    }
}

/// First-fit assignment of chains to tracks, earliest start first.
fn arrange_tracks(
    chains: &[Arc<IsolatedDependencyChain>],
) -> Vec<Vec<Arc<IsolatedDependencyChain>>> {
    let mut ordered: Vec<&Arc<IsolatedDependencyChain>> = chains.iter().collect();
    ordered.sort_by(|a, b| {
        a.span()
            .start
            .cmp(&b.span().start)
            .then_with(|| a.root().name().cmp(b.root().name()))
    });

    let mut tracks: Vec<Vec<Arc<IsolatedDependencyChain>>> = Vec::new();
    for chain in ordered {
        let span = chain.span();
        let free = tracks
            .iter_mut()
            .find(|track| track.iter().all(|placed| !placed.span().overlaps(&span)));
        match free {
            Some(track) => track.push(Arc::clone(chain)),
            None => tracks.push(vec![Arc::clone(chain)]),
        }
    }
    tracks
}

impl PartialEq for ChainPath {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChainPath {}
