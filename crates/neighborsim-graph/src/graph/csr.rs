//! In-memory compressed sparse row graph.
//!
//! Relationships are stored twice, once grouped by source and once grouped
//! by target, so both directions are contiguous slices. Each slice is sorted
//! ascending by the other endpoint; parallel edges are kept. Every
//! relationship carries a weight, [`DEFAULT_RELATIONSHIP_WEIGHT`] unless
//! added with [`CsrGraphBuilder::add_weighted_edge`].

use std::sync::Arc;

use neighborsim_core::{EntityId, NodeId};

use super::{Direction, Graph, IdMap, DEFAULT_RELATIONSHIP_WEIGHT};
use crate::error::{GraphError, GraphResult};

/// Adjacency of one direction: `targets[offsets[n]..offsets[n + 1]]` are the
/// neighbors of node `n`, and `weights` runs parallel to `targets`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    offsets: Vec<usize>,
    targets: Vec<NodeId>,
    weights: Vec<f64>,
}

impl Adjacency {
    /// Compress weighted `(node, neighbor, weight)` triples for `node_count`
    /// nodes. Each slice ends up sorted by neighbor; parallel edges keep
    /// their insertion order.
    pub(crate) fn compress(
        node_count: usize,
        entries: impl Iterator<Item = (NodeId, NodeId, f64)> + Clone,
    ) -> Self {
        let mut offsets = vec![0usize; node_count + 1];
        for (node, _, _) in entries.clone() {
            offsets[node.index() + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut slots = vec![(NodeId::new(0), 0.0); offsets[node_count]];
        for (node, neighbor, weight) in entries {
            let slot = &mut cursor[node.index()];
            slots[*slot] = (neighbor, weight);
            *slot += 1;
        }

        for node in 0..node_count {
            slots[offsets[node]..offsets[node + 1]].sort_by_key(|&(neighbor, _)| neighbor);
        }

        let (targets, weights) = slots.into_iter().unzip();
        Self { offsets, targets, weights }
    }

    #[inline]
    fn range(&self, node: NodeId) -> std::ops::Range<usize> {
        let index = node.index();
        match (self.offsets.get(index), self.offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        }
    }

    #[inline]
    pub(crate) fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.targets[self.range(node)]
    }

    #[inline]
    pub(crate) fn weights(&self, node: NodeId) -> &[f64] {
        &self.weights[self.range(node)]
    }

    /// Weight of the first relationship from `node` to `neighbor`.
    pub(crate) fn weight(&self, node: NodeId, neighbor: NodeId) -> Option<f64> {
        let range = self.range(node);
        let targets = &self.targets[range.clone()];
        let offset = targets.partition_point(|&target| target < neighbor);
        (targets.get(offset) == Some(&neighbor)).then(|| self.weights[range.start + offset])
    }

    /// Total number of relationships.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }

    /// Visit the relationships of `node` until `consumer` returns `false`.
    /// Returns `false` if the consumer stopped the walk.
    pub(crate) fn visit(
        &self,
        node: NodeId,
        consumer: &mut dyn FnMut(NodeId, NodeId, f64) -> bool,
    ) -> bool {
        let range = self.range(node);
        self.targets[range.clone()]
            .iter()
            .zip(&self.weights[range])
            .all(|(&other, &weight)| consumer(node, other, weight))
    }
}

/// Immutable graph with compressed adjacency in both directions.
///
/// Built with [`CsrGraphBuilder`]. Keeps an [`IdMap`] so results can be
/// translated back to the original entity ids and materialized.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    id_map: Arc<IdMap>,
    weight_property: Option<String>,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl CsrGraph {
    /// Number of relationships in the graph.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.outgoing.len()
    }

    /// The sorted neighbors of `node` along a single direction.
    ///
    /// [`Direction::Both`] returns the outgoing slice; use
    /// [`Graph::for_each_relationship`] to visit both.
    #[must_use]
    pub fn neighbors(&self, node: NodeId, direction: Direction) -> &[NodeId] {
        match direction {
            Direction::Incoming => self.incoming.neighbors(node),
            Direction::Outgoing | Direction::Both => self.outgoing.neighbors(node),
        }
    }

    /// The weights parallel to [`CsrGraph::neighbors`].
    #[must_use]
    pub fn weights(&self, node: NodeId, direction: Direction) -> &[f64] {
        match direction {
            Direction::Incoming => self.incoming.weights(node),
            Direction::Outgoing | Direction::Both => self.outgoing.weights(node),
        }
    }

    /// Weight of the first relationship from `source` to `target`.
    #[must_use]
    pub fn weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.outgoing.weight(source, target)
    }

    /// The dense id of an original entity.
    #[must_use]
    pub fn to_internal_node_id(&self, entity: EntityId) -> Option<NodeId> {
        self.id_map.to_internal(entity)
    }
}

impl Graph for CsrGraph {
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
        if direction.includes_outgoing() {
            for &other in self.outgoing.neighbors(node) {
                if !consumer(node, other) {
                    return;
                }
            }
        }
        if direction.includes_incoming() {
            for &other in self.incoming.neighbors(node) {
                if !consumer(node, other) {
                    return;
                }
            }
        }
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
        self.weight_property.as_deref()
    }

    /// Ids not produced by this graph have no original; they are reported
    /// as their dense value, and debug builds assert.
    fn to_original_node_id(&self, node: NodeId) -> EntityId {
        self.id_map.to_original_or_dense(node)
    }

    fn id_map(&self) -> Option<&Arc<IdMap>> {
        Some(&self.id_map)
    }

    fn representation(&self) -> &'static str {
        "csr"
    }
}

/// Builder for [`CsrGraph`].
///
/// # Example
///
/// ```
/// use neighborsim_core::EntityId;
/// use neighborsim_graph::graph::{CsrGraphBuilder, Direction, Graph};
///
/// let mut builder = CsrGraphBuilder::new();
/// let a = builder.add_node(EntityId::new(10))?;
/// builder.add_node(EntityId::new(20))?;
/// builder.add_edge(EntityId::new(10), EntityId::new(20))?;
///
/// let graph = builder.build()?;
/// assert_eq!(graph.degree(a, Direction::Outgoing), 1);
///
/// // Relationships can carry a named weight property
/// let mut builder = CsrGraphBuilder::new().with_weight_property("rating");
/// builder.add_node(EntityId::new(10))?;
/// builder.add_node(EntityId::new(20))?;
/// builder.add_weighted_edge(EntityId::new(10), EntityId::new(20), 4.5)?;
///
/// let graph = builder.build()?;
/// assert_eq!(graph.relationship_weight_property(), Some("rating"));
/// # Ok::<(), neighborsim_graph::GraphError>(())
/// ```
#[derive(Debug, Default)]
pub struct CsrGraphBuilder {
    id_map: IdMap,
    weight_property: Option<String>,
    edges: Vec<(NodeId, NodeId, f64)>,
}

impl CsrGraphBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the relationship property the edge weights stand for.
    ///
    /// The built graph reports it through
    /// [`Graph::relationship_weight_property`], which is what a weighted
    /// similarity run looks up.
    #[must_use]
    pub fn with_weight_property(mut self, name: impl Into<String>) -> Self {
        self.weight_property = Some(name.into());
        self
    }

    /// Register a node. Fails if the entity was already added.
    pub fn add_node(&mut self, entity: EntityId) -> GraphResult<NodeId> {
        self.id_map.insert(entity)
    }

    /// Register a node if it is not known yet, returning its dense id.
    pub fn get_or_add_node(&mut self, entity: EntityId) -> GraphResult<NodeId> {
        match self.id_map.to_internal(entity) {
            Some(node) => Ok(node),
            None => self.id_map.insert(entity),
        }
    }

    /// Add a relationship between two registered nodes.
    pub fn add_edge(&mut self, source: EntityId, target: EntityId) -> GraphResult<()> {
        self.add_weighted_edge(source, target, DEFAULT_RELATIONSHIP_WEIGHT)
    }

    /// Add a weighted relationship between two registered nodes.
    ///
    /// Weights must be finite and non-negative.
    pub fn add_weighted_edge(
        &mut self,
        source: EntityId,
        target: EntityId,
        weight: f64,
    ) -> GraphResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight(weight));
        }
        let source =
            self.id_map.to_internal(source).ok_or(GraphError::InvalidEntityReference(source))?;
        let target =
            self.id_map.to_internal(target).ok_or(GraphError::InvalidEntityReference(target))?;
        self.edges.push((source, target, weight));
        Ok(())
    }

    /// Number of nodes registered so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.id_map.len()
    }

    /// Compress the registered nodes and edges into a [`CsrGraph`].
    pub fn build(self) -> GraphResult<CsrGraph> {
        let node_count = self.id_map.len();
        if NodeId::from_index(node_count.saturating_sub(1)).is_none() {
            return Err(GraphError::TooManyNodes(node_count));
        }

        let outgoing = Adjacency::compress(node_count, self.edges.iter().copied());
        let incoming = Adjacency::compress(
            node_count,
            self.edges.iter().map(|&(source, target, weight)| (target, source, weight)),
        );

        Ok(CsrGraph {
            id_map: Arc::new(self.id_map),
            weight_property: self.weight_property,
            outgoing,
            incoming,
        })
    }
}
