//! Capacity-driven choice between the sorted list and the heap.

use crate::types::{NodeId, RankOrder, SimilarityResult};

use super::{BoundedRankedHeap, BoundedRankedList};

/// Capacities above this use [`BoundedRankedHeap`].
pub const HEAP_CAPACITY_THRESHOLD: usize = 1024;

/// A bounded ranked collection backed by whichever container suits its
/// capacity.
#[derive(Debug, Clone)]
pub enum RankedBuffer<K> {
    /// Sorted array, for capacities up to [`HEAP_CAPACITY_THRESHOLD`].
    Sorted(BoundedRankedList<K>),
    /// Binary heap, for larger capacities.
    Heap(BoundedRankedHeap<K>),
}

impl<K: Copy> RankedBuffer<K> {
    /// Create an empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, order: RankOrder) -> Self {
        if capacity > HEAP_CAPACITY_THRESHOLD {
            Self::Heap(BoundedRankedHeap::new(capacity, order))
        } else {
            Self::Sorted(BoundedRankedList::new(capacity, order))
        }
    }

    /// Offer a candidate. Returns `true` if it is now held.
    #[inline]
    pub fn offer(&mut self, key: K, priority: f64) -> bool {
        match self {
            Self::Sorted(list) => list.offer(key, priority),
            Self::Heap(heap) => heap.offer(key, priority),
        }
    }

    /// Maximum number of entries held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::Sorted(list) => list.capacity(),
            Self::Heap(heap) => heap.capacity(),
        }
    }

    /// The order entries are ranked by.
    #[must_use]
    pub fn order(&self) -> RankOrder {
        match self {
            Self::Sorted(list) => list.order(),
            Self::Heap(heap) => heap.order(),
        }
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Sorted(list) => list.len(),
            Self::Heap(heap) => heap.len(),
        }
    }

    /// Returns true if nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Priority of the worst held entry.
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        match self {
            Self::Sorted(list) => list.worst(),
            Self::Heap(heap) => heap.worst(),
        }
    }

    /// Held entries, best first. The heap variant sorts a copy.
    pub fn iter(&self) -> RankedIter<'_, K> {
        match self {
            Self::Sorted(list) => RankedIter::Sorted(list.as_slice().iter()),
            Self::Heap(heap) => RankedIter::Heap(heap.to_sorted_vec().into_iter()),
        }
    }

    /// Consume the buffer, returning its entries best first.
    #[must_use]
    pub fn into_vec(self) -> Vec<(K, f64)> {
        match self {
            Self::Sorted(list) => list.into_vec(),
            Self::Heap(heap) => heap.into_vec(),
        }
    }
}

/// Iterator over a [`RankedBuffer`]'s entries, best first.
#[derive(Debug, Clone)]
pub enum RankedIter<'a, K> {
    /// Borrowed from a sorted list.
    Sorted(std::slice::Iter<'a, (K, f64)>),
    /// Sorted copy of a heap.
    Heap(std::vec::IntoIter<(K, f64)>),
}

impl<K: Copy> Iterator for RankedIter<'_, K> {
    type Item = (K, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sorted(entries) => entries.next().copied(),
            Self::Heap(entries) => entries.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Sorted(entries) => entries.size_hint(),
            Self::Heap(entries) => entries.size_hint(),
        }
    }
}

impl<K: Copy> ExactSizeIterator for RankedIter<'_, K> {}

impl RankedBuffer<(NodeId, NodeId)> {
    /// Offer a scored pair.
    #[inline]
    pub fn offer_pair(&mut self, source: NodeId, target: NodeId, similarity: f64) -> bool {
        self.offer((source, target), similarity)
    }

    /// Consume the buffer, returning similarity results best first.
    #[must_use]
    pub fn into_results(self) -> Vec<SimilarityResult> {
        self.into_vec()
            .into_iter()
            .map(|((source, target), similarity)| SimilarityResult::new(source, target, similarity))
            .collect()
    }
}
