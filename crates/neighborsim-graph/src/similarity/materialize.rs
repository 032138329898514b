//! Materialization of similarity results as a weighted graph.
//!
//! The result graph shares the input graph's node space and [`IdMap`]: a
//! result `(source, target, similarity)` becomes a relationship from
//! `source` to `target` weighted by the similarity. Relationships are
//! recorded exactly as reported, so mirrored pairs appear only if the
//! producing mode emitted both orientations.

use std::sync::Arc;

use neighborsim_core::{EntityId, NodeId, SimilarityResult};
use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Adjacency, Direction, Graph, IdMap};

/// Output of [`NodeSimilarity::compute_to_graph`](super::NodeSimilarity::compute_to_graph).
#[derive(Debug, Clone)]
pub struct SimilarityGraphResult {
    /// The weighted similarity graph.
    pub graph: SimilarityGraph,
    /// Number of candidate nodes that took part in the comparison.
    pub nodes_compared: usize,
    /// Whether the graph was built straight from a top-k table.
    pub top_k_graph: bool,
}

/// Builds a [`SimilarityGraph`] over an input graph's node space.
#[derive(Debug, Clone)]
pub struct SimilarityGraphBuilder {
    id_map: Arc<IdMap>,
}

impl SimilarityGraphBuilder {
    /// Create a builder for results computed on `graph`.
    ///
    /// Fails with [`GraphError::IncompatibleGraph`] if `graph` does not
    /// expose an id mapping.
    pub fn new<G: Graph + ?Sized>(graph: &G) -> GraphResult<Self> {
        let id_map = graph.id_map().ok_or(GraphError::IncompatibleGraph {
            representation: graph.representation(),
            operation: "similarity graph construction",
        })?;
        Ok(Self { id_map: Arc::clone(id_map) })
    }

    /// Build from a result stream, failing on the first error it yields.
    pub fn build<I>(&self, stream: I) -> GraphResult<SimilarityGraph>
    where
        I: IntoIterator<Item = GraphResult<SimilarityResult>>,
    {
        let mut buckets = self.buckets();
        for result in stream {
            self.push(&mut buckets, result?)?;
        }
        Ok(self.compact(buckets))
    }

    /// Build from already computed results.
    pub fn build_from_results<I>(&self, results: I) -> GraphResult<SimilarityGraph>
    where
        I: IntoIterator<Item = SimilarityResult>,
    {
        let mut buckets = self.buckets();
        for result in results {
            self.push(&mut buckets, result)?;
        }
        Ok(self.compact(buckets))
    }

    fn buckets(&self) -> Vec<Vec<(NodeId, f64)>> {
        vec![Vec::new(); self.id_map.len()]
    }

    fn push(
        &self,
        buckets: &mut [Vec<(NodeId, f64)>],
        result: SimilarityResult,
    ) -> GraphResult<()> {
        let node_count = buckets.len();
        if result.target.index() >= node_count {
            return Err(GraphError::NodeOutOfRange { node: result.target, node_count });
        }
        let bucket = buckets
            .get_mut(result.source.index())
            .ok_or(GraphError::NodeOutOfRange { node: result.source, node_count })?;
        bucket.push((result.target, result.similarity));
        Ok(())
    }

    fn compact(&self, buckets: Vec<Vec<(NodeId, f64)>>) -> SimilarityGraph {
        let node_count = buckets.len();
        let entries = buckets.iter().enumerate().flat_map(|(source, bucket)| {
            let source = NodeId::new(source as u32);
            bucket.iter().map(move |&(target, similarity)| (source, target, similarity))
        });
        let outgoing = Adjacency::compress(node_count, entries.clone());
        let incoming = Adjacency::compress(
            node_count,
            entries.map(|(source, target, similarity)| (target, source, similarity)),
        );

        info!(nodes = node_count, relationships = outgoing.len(), "built similarity graph");

        SimilarityGraph { id_map: Arc::clone(&self.id_map), outgoing, incoming }
    }
}

/// Weighted, directed graph of similarity results.
///
/// The similarity of each relationship is exposed as its weight, under the
/// [`SIMILARITY_PROPERTY`] name.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    id_map: Arc<IdMap>,
    outgoing: Adjacency,
    incoming: Adjacency,
}

/// Relationship property name of a [`SimilarityGraph`]'s weights.
pub const SIMILARITY_PROPERTY: &str = "similarity";

impl SimilarityGraph {
    /// Number of relationships.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.outgoing.len()
    }

    /// The similarity recorded from `source` to `target`, if any.
    #[must_use]
    pub fn weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.outgoing.weight(source, target)
    }

    /// Every relationship as a result, in source order.
    pub fn results(&self) -> impl Iterator<Item = SimilarityResult> + '_ {
        (0..self.id_map.len()).flat_map(move |index| {
            let source = NodeId::new(index as u32);
            self.outgoing
                .neighbors(source)
                .iter()
                .zip(self.outgoing.weights(source))
                .map(move |(&target, &similarity)| SimilarityResult::new(source, target, similarity))
        })
    }
}

impl Graph for SimilarityGraph {
    fn node_count(&self) -> usize {
        self.id_map.len()
    }

    fn degree(&self, node: NodeId, direction: Direction) -> usize {
        let mut degree = 0;
        if direction.includes_outgoing() {
            degree += self.outgoing.neighbors(node).len();
        }
        if direction.includes_incoming() {
            degree += self.incoming.neighbors(node).len();
        }
        degree
    }

    fn for_each_node(&self, visitor: &mut dyn FnMut(NodeId) -> bool) {
        for index in 0..self.id_map.len() {
            if !visitor(NodeId::new(index as u32)) {
                return;
            }
        }
    }

    fn for_each_relationship(
        &self,
        node: NodeId,
        direction: Direction,
        consumer: &mut dyn FnMut(NodeId, NodeId) -> bool,
    ) {
        self.for_each_weighted_relationship(node, direction, &mut |source, target, _| {
            consumer(source, target)
        });
    }

    fn for_each_weighted_relationship(
        &self,
        node: NodeId,
        direction: Direction,
        consumer: &mut dyn FnMut(NodeId, NodeId, f64) -> bool,
    ) {
        if direction.includes_outgoing() && !self.outgoing.visit(node, consumer) {
            return;
        }
        if direction.includes_incoming() {
            self.incoming.visit(node, consumer);
        }
    }

    fn relationship_weight_property(&self) -> Option<&str> {
        Some(SIMILARITY_PROPERTY)
    }

    /// Shares the input graph's id map, with the same fallback for
    /// foreign ids.
    fn to_original_node_id(&self, node: NodeId) -> EntityId {
        self.id_map.to_original_or_dense(node)
    }

    fn id_map(&self) -> Option<&Arc<IdMap>> {
        Some(&self.id_map)
    }

    fn representation(&self) -> &'static str {
        "similarity"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use crate::graph::{CsrGraph, CsrGraphBuilder};

    fn nodes(count: u64) -> CsrGraph {
        let mut builder = CsrGraphBuilder::new();
        for id in 0..count {
            builder.add_node(EntityId::new(id * 10)).expect("add node");
        }
        builder.build().expect("build")
    }

    fn result(source: u32, target: u32, similarity: f64) -> SimilarityResult {
        SimilarityResult::new(NodeId::new(source), NodeId::new(target), similarity)
    }

    #[test]
    fn records_edges_as_reported() {
        let input = nodes(4);
        let builder = SimilarityGraphBuilder::new(&input).expect("builder");
        let graph = builder
            .build_from_results([result(2, 0, 0.5), result(0, 3, 1.0), result(0, 1, 0.25)])
            .expect("graph");

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.relationship_count(), 3);
        assert_eq!(graph.weight(NodeId::new(0), NodeId::new(3)), Some(1.0));
        assert_eq!(graph.weight(NodeId::new(3), NodeId::new(0)), None);
        assert_eq!(graph.degree(NodeId::new(0), Direction::Outgoing), 2);
        assert_eq!(graph.degree(NodeId::new(0), Direction::Incoming), 1);
        assert_eq!(graph.to_original_node_id(NodeId::new(2)), EntityId::new(20));

        let mut seen = Vec::new();
        graph.for_each_weighted_relationship(
            NodeId::new(0),
            Direction::Both,
            &mut |_, other, weight| {
                seen.push((other.as_u32(), weight));
                true
            },
        );
        assert_eq!(seen, vec![(1, 0.25), (3, 1.0), (2, 0.5)]);
        assert_eq!(graph.relationship_weight_property(), Some(SIMILARITY_PROPERTY));
        assert_eq!(graph.results().count(), 3);
    }

    #[test]
    fn stream_errors_propagate() {
        let input = nodes(2);
        let builder = SimilarityGraphBuilder::new(&input).expect("builder");
        let stream = vec![Ok(result(0, 1, 0.5)), Err(GraphError::Cancelled)];
        assert!(matches!(builder.build(stream), Err(GraphError::Cancelled)));
    }

    #[test]
    fn out_of_range_results_fail() {
        let input = nodes(2);
        let builder = SimilarityGraphBuilder::new(&input).expect("builder");
        assert!(matches!(
            builder.build_from_results([result(0, 5, 0.5)]),
            Err(GraphError::NodeOutOfRange { node_count: 2, .. })
        ));
    }

    /// A graph without an id mapping.
    struct Unmapped;

    impl Graph for Unmapped {
        fn node_count(&self) -> usize {
            0
        }

        fn degree(&self, _: NodeId, _: Direction) -> usize {
            0
        }

        fn for_each_node(&self, _: &mut dyn FnMut(NodeId) -> bool) {}

        fn for_each_relationship(
            &self,
            _: NodeId,
            _: Direction,
            _: &mut dyn FnMut(NodeId, NodeId) -> bool,
        ) {
        }

        fn to_original_node_id(&self, node: NodeId) -> EntityId {
            EntityId::new(u64::from(node.as_u32()))
        }

        fn representation(&self) -> &'static str {
            "unmapped"
        }
    }

    #[test]
    fn requires_id_mapping() {
        assert!(matches!(
            SimilarityGraphBuilder::new(&Unmapped),
            Err(GraphError::IncompatibleGraph { representation: "unmapped", .. })
        ));
    }
}
