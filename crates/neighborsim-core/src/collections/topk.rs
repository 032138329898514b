//! Per-node top-k table.
//!
//! The table holds one [`RankedBuffer`] per participating node, so small k
//! gets a sorted array and very large k a heap. Writing
//! into it is single-writer per node: sequential callers use
//! [`PerEntityTopKTable::accept`] on the whole table, parallel callers split
//! it with [`PerEntityTopKTable::shards_mut`] so each worker owns a disjoint
//! range of source nodes. Because every result is routed by its source node,
//! partitioning by source means no two workers ever touch the same list.

use std::ops::Range;

use crate::error::{CoreError, CoreResult};
use crate::types::{NodeId, RankOrder, SimilarityResult};

use super::RankedBuffer;

type Slot = Option<RankedBuffer<NodeId>>;

/// One bounded ranked buffer of neighbors per node.
///
/// # Example
///
/// ```
/// use neighborsim_core::{NodeId, PerEntityTopKTable, SimilarityResult};
///
/// // Node 1 does not participate
/// let mut table = PerEntityTopKTable::new(1, &[true, false, true])?;
/// table.accept(SimilarityResult::new(NodeId::new(0), NodeId::new(2), 0.4));
/// table.accept(SimilarityResult::new(NodeId::new(0), NodeId::new(1), 0.9));
/// table.accept(SimilarityResult::new(NodeId::new(1), NodeId::new(0), 0.9));
///
/// let results = table.into_results();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].target, NodeId::new(1));
/// # Ok::<(), neighborsim_core::CoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PerEntityTopKTable {
    k: usize,
    order: RankOrder,
    lists: Vec<Slot>,
}

impl PerEntityTopKTable {
    /// Create a table for `participants.len()` nodes.
    ///
    /// `top_k` is signed: its magnitude is the per-node capacity and its sign
    /// selects [`RankOrder::Descending`] (positive) or
    /// [`RankOrder::Ascending`] (negative). Nodes whose mask entry is false
    /// get no list and never produce results.
    pub fn new(top_k: i64, participants: &[bool]) -> CoreResult<Self> {
        if top_k == 0 {
            return Err(CoreError::validation("top-k table requires a non-zero k"));
        }
        if NodeId::from_index(participants.len().saturating_sub(1)).is_none() {
            return Err(CoreError::validation(format!(
                "top-k table cannot address {} nodes",
                participants.len()
            )));
        }

        let k = usize::try_from(top_k.unsigned_abs()).unwrap_or(usize::MAX);
        let order = RankOrder::from_signed(top_k);
        let lists = participants
            .iter()
            .map(|&participates| participates.then(|| RankedBuffer::new(k, order)))
            .collect();

        Ok(Self { k, order, lists })
    }

    /// Per-node capacity.
    #[inline]
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// The order every list ranks by.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> RankOrder {
        self.order
    }

    /// Number of nodes the table was sized for.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.lists.len()
    }

    /// Route a result into its source node's list.
    ///
    /// Results for non-participating or out-of-range sources are ignored.
    /// Returns `true` if the result is now held.
    #[inline]
    pub fn accept(&mut self, result: SimilarityResult) -> bool {
        self.put(result.source, result.target, result.similarity)
    }

    /// Offer `target` with `similarity` to `source`'s list.
    #[inline]
    pub fn put(&mut self, source: NodeId, target: NodeId, similarity: f64) -> bool {
        match self.lists.get_mut(source.index()) {
            Some(Some(list)) => list.offer(target, similarity),
            _ => false,
        }
    }

    /// The buffer held for `node`, if it participates.
    #[must_use]
    pub fn list(&self, node: NodeId) -> Option<&RankedBuffer<NodeId>> {
        self.lists.get(node.index()).and_then(Option::as_ref)
    }

    /// Split the table into disjoint shards of `batch_size` consecutive
    /// nodes each.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn shards_mut(&mut self, batch_size: usize) -> Vec<TopKShard<'_>> {
        self.lists
            .chunks_mut(batch_size)
            .enumerate()
            .map(|(batch, lists)| {
                // Table construction guarantees every index fits in u32
                let start = (batch * batch_size) as u32;
                TopKShard { start, lists }
            })
            .collect()
    }

    /// Total number of results held across all lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.iter().flatten().map(RankedBuffer::len).sum()
    }

    /// Returns true if no list holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.iter().flatten().all(RankedBuffer::is_empty)
    }

    /// Held results in node id order, best first within each node.
    pub fn iter(&self) -> impl Iterator<Item = SimilarityResult> + '_ {
        self.lists.iter().enumerate().flat_map(|(index, slot)| {
            let source = NodeId::new(index as u32);
            slot.iter().flat_map(move |list| {
                list.iter().map(move |(target, similarity)| {
                    SimilarityResult::new(source, target, similarity)
                })
            })
        })
    }

    /// Consume the table, returning its results in node id order.
    #[must_use]
    pub fn into_results(self) -> Vec<SimilarityResult> {
        let mut results = Vec::with_capacity(self.len());
        for (index, slot) in self.lists.into_iter().enumerate() {
            let source = NodeId::new(index as u32);
            for (target, similarity) in slot.into_iter().flat_map(RankedBuffer::into_vec) {
                results.push(SimilarityResult::new(source, target, similarity));
            }
        }
        results
    }
}

/// Exclusive view over a contiguous range of a [`PerEntityTopKTable`].
#[derive(Debug)]
pub struct TopKShard<'a> {
    start: u32,
    lists: &'a mut [Slot],
}

impl TopKShard<'_> {
    /// The node range this shard owns.
    #[must_use]
    pub fn nodes(&self) -> Range<u32> {
        self.start..self.end()
    }

    fn end(&self) -> u32 {
        self.start + self.lists.len() as u32
    }

    /// Route a result into its source's list.
    ///
    /// Fails if the source lies outside this shard; results for
    /// non-participating sources are ignored.
    pub fn accept(&mut self, result: SimilarityResult) -> CoreResult<bool> {
        let node = result.source.as_u32();
        if !self.nodes().contains(&node) {
            return Err(CoreError::ShardOutOfRange { node, start: self.start, end: self.end() });
        }
        Ok(match &mut self.lists[(node - self.start) as usize] {
            Some(list) => list.offer(result.target, result.similarity),
            None => false,
        })
    }

    /// Participating nodes of this shard with their lists, in id order.
    pub fn sources_mut(
        &mut self,
    ) -> impl Iterator<Item = (NodeId, &mut RankedBuffer<NodeId>)> + '_ {
        let start = self.start;
        self.lists.iter_mut().enumerate().filter_map(move |(offset, slot)| {
            slot.as_mut().map(|list| (NodeId::new(start + offset as u32), list))
        })
    }
}
