//! Per-node neighbor vectors.
//!
//! A neighbor vector is the ascending, duplicate-free list of nodes adjacent
//! to a node along the configured direction, self loops excluded. Only nodes
//! whose vector length passes the [`DegreeFilter`] get a vector; those are
//! the candidates of the comparison.
//!
//! Weighted builds also keep, per candidate, the weight of each neighbor in
//! a slice parallel to the vector. When a neighbor is reached over several
//! relationships the first one visited supplies the weight.

use neighborsim_core::NodeId;
use rayon::prelude::*;
use tracing::info;

use super::progress::{CancellationToken, ProgressTracker};
use super::WorkerPool;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Direction, Graph, DEFAULT_RELATIONSHIP_WEIGHT};

/// Inclusive bounds on the number of distinct neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeFilter {
    /// Minimum number of distinct neighbors.
    pub lower: usize,
    /// Maximum number of distinct neighbors, if bounded.
    pub upper: Option<usize>,
}

impl DegreeFilter {
    /// A filter with only a lower bound.
    #[must_use]
    pub const fn at_least(lower: usize) -> Self {
        Self { lower, upper: None }
    }

    /// A filter with both bounds.
    #[must_use]
    pub const fn between(lower: usize, upper: usize) -> Self {
        Self { lower, upper: Some(upper) }
    }

    /// Returns true if a node with `degree` distinct neighbors passes.
    #[inline]
    #[must_use]
    pub fn accepts(&self, degree: usize) -> bool {
        degree >= self.lower && self.upper.map_or(true, |upper| degree <= upper)
    }
}

impl Default for DegreeFilter {
    fn default() -> Self {
        Self::at_least(1)
    }
}

/// A candidate's neighbors and, for weighted builds, their weights.
type Collected = Option<(Vec<NodeId>, Option<Vec<f64>>)>;

/// Neighbor vectors of every candidate node.
#[derive(Debug, Clone)]
pub struct NeighborVectors {
    vectors: Vec<Option<Vec<NodeId>>>,
    weights: Vec<Option<Vec<f64>>>,
    candidates: Vec<NodeId>,
    weighted: bool,
}

impl NeighborVectors {
    /// Collect neighbor vectors from `graph`.
    ///
    /// Nodes are split into batches of `batch_size` and spread over `pool`.
    /// With `weighted` set, neighbor weights are read through
    /// [`Graph::for_each_weighted_relationship`]. Fails with [`GraphError::UnsupportedDirection`] for
    /// [`Direction::Both`] and with [`GraphError::Cancelled`] if `token`
    /// fires.
    pub fn build<G: Graph + ?Sized>(
        graph: &G,
        direction: Direction,
        filter: DegreeFilter,
        weighted: bool,
        pool: &WorkerPool,
        batch_size: usize,
        token: &CancellationToken,
    ) -> GraphResult<Self> {
        if direction == Direction::Both {
            return Err(GraphError::UnsupportedDirection(direction));
        }

        let node_count = graph.node_count();
        let progress = ProgressTracker::new("neighbor vectors", node_count, token.clone());
        let sorted = graph.has_sorted_adjacency();
        let vector_of = |index: usize| -> GraphResult<Collected> {
            let node = NodeId::from_index(index).ok_or(GraphError::TooManyNodes(node_count))?;
            progress.check(node)?;
            Ok(if sorted {
                collect_sorted(graph, node, direction, filter, weighted)
            } else {
                collect_unsorted(graph, node, direction, filter, weighted)
            })
        };

        let collected = if pool.is_parallel() {
            pool.install(|| {
                (0..node_count)
                    .into_par_iter()
                    .with_min_len(batch_size.max(1))
                    .map(vector_of)
                    .collect::<GraphResult<Vec<_>>>()
            })?
        } else {
            (0..node_count).map(vector_of).collect::<GraphResult<Vec<_>>>()?
        };
        let (vectors, weights): (Vec<_>, Vec<_>) = collected
            .into_iter()
            .map(|entry| match entry {
                Some((vector, weights)) => (Some(vector), weights),
                None => (None, None),
            })
            .unzip();

        let candidates: Vec<NodeId> = vectors
            .iter()
            .enumerate()
            .filter(|(_, vector)| vector.is_some())
            .map(|(index, _)| NodeId::new(index as u32))
            .collect();

        info!(
            nodes = node_count,
            candidates = candidates.len(),
            ?direction,
            weighted,
            elapsed_ms = progress.elapsed().as_millis() as u64,
            "built neighbor vectors"
        );

        Ok(Self { vectors, weights, candidates, weighted })
    }

    /// The neighbor vector of `node`, if it is a candidate.
    #[inline]
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&[NodeId]> {
        self.vectors.get(node.index()).and_then(|vector| vector.as_deref())
    }

    /// The neighbor vector of `node`, or an empty slice for non-candidates.
    #[inline]
    pub(crate) fn vector(&self, node: NodeId) -> &[NodeId] {
        self.get(node).unwrap_or(&[])
    }

    /// The neighbor weights of `node`, parallel to [`NeighborVectors::get`],
    /// if the build was weighted and `node` is a candidate.
    #[inline]
    #[must_use]
    pub fn weights(&self, node: NodeId) -> Option<&[f64]> {
        self.weights.get(node.index()).and_then(|weights| weights.as_deref())
    }

    /// Returns true if neighbor weights were collected.
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Returns true if `node` passed the degree filter.
    #[inline]
    #[must_use]
    pub fn is_candidate(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// Candidate nodes in ascending order.
    #[must_use]
    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    /// Number of candidate nodes.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Participation mask indexed by node id.
    #[must_use]
    pub fn participants(&self) -> Vec<bool> {
        self.vectors.iter().map(Option::is_some).collect()
    }

    /// Number of nodes in the source graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.vectors.len()
    }
}

/// Visit relationships, reading weights only when they are needed.
fn visit<G: Graph + ?Sized>(
    graph: &G,
    node: NodeId,
    direction: Direction,
    weighted: bool,
    consumer: &mut dyn FnMut(NodeId, NodeId, f64) -> bool,
) {
    if weighted {
        graph.for_each_weighted_relationship(node, direction, consumer);
    } else {
        graph.for_each_relationship(node, direction, &mut |source, target| {
            consumer(source, target, DEFAULT_RELATIONSHIP_WEIGHT)
        });
    }
}

/// Two passes over ascending adjacency: count, then fill an exactly sized
/// vector. Self loops and repeats of the previous target are skipped.
fn collect_sorted<G: Graph + ?Sized>(
    graph: &G,
    node: NodeId,
    direction: Direction,
    filter: DegreeFilter,
    weighted: bool,
) -> Collected {
    let mut count = 0usize;
    let mut last = None;
    graph.for_each_relationship(node, direction, &mut |source, target| {
        if source != target && last != Some(target) {
            count += 1;
        }
        last = Some(target);
        true
    });
    if !filter.accepts(count) {
        return None;
    }

    let mut vector = Vec::with_capacity(count);
    let mut weights = Vec::with_capacity(if weighted { count } else { 0 });
    let mut last = None;
    visit(graph, node, direction, weighted, &mut |source, target, weight| {
        if source != target && last != Some(target) {
            vector.push(target);
            if weighted {
                weights.push(weight);
            }
        }
        last = Some(target);
        true
    });
    Some((vector, weighted.then_some(weights)))
}

/// Single pass for adjacency in arbitrary order; sorts and deduplicates
/// before filtering.
fn collect_unsorted<G: Graph + ?Sized>(
    graph: &G,
    node: NodeId,
    direction: Direction,
    filter: DegreeFilter,
    weighted: bool,
) -> Collected {
    let mut entries = Vec::with_capacity(graph.degree(node, direction));
    visit(graph, node, direction, weighted, &mut |source, target, weight| {
        if source != target {
            entries.push((target, weight));
        }
        true
    });
    // Stable, so the first relationship to a neighbor keeps its weight
    entries.sort_by_key(|&(target, _)| target);
    entries.dedup_by_key(|&mut (target, _)| target);
    if !filter.accepts(entries.len()) {
        return None;
    }

    let (vector, weights): (Vec<NodeId>, Vec<f64>) = entries.into_iter().unzip();
    Some((vector, weighted.then_some(weights)))
}
