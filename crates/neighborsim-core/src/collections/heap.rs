//! Heap-backed fixed-capacity collection for large capacities.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{CoreError, CoreResult};
use crate::types::RankOrder;

use super::MAX_PREALLOCATED_ENTRIES;

/// Heap entry ordered so that the worst entry sits on top of the max-heap.
#[derive(Debug, Clone, Copy)]
struct HeapEntry<K> {
    key: K,
    priority: f64,
    order: RankOrder,
}

impl<K> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for HeapEntry<K> {}

impl<K> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for HeapEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Worse ranks compare greater, so the heap's top is the eviction candidate
        self.order.compare(self.priority, other.priority)
    }
}

/// A binary heap that keeps the best `capacity` entries offered to it.
///
/// Same contract as [`BoundedRankedList`](super::BoundedRankedList) with
/// O(log C) offers; entries are only sorted on read-back.
#[derive(Debug, Clone)]
pub struct BoundedRankedHeap<K> {
    capacity: usize,
    order: RankOrder,
    heap: BinaryHeap<HeapEntry<K>>,
}

impl<K: Copy> BoundedRankedHeap<K> {
    /// Create an empty heap.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, order: RankOrder) -> Self {
        assert!(capacity > 0, "bounded ranked heap capacity must be at least 1");
        Self {
            capacity,
            order,
            heap: BinaryHeap::with_capacity(capacity.min(MAX_PREALLOCATED_ENTRIES)),
        }
    }

    /// Create an empty heap, rejecting a zero capacity.
    pub fn try_new(capacity: usize, order: RankOrder) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::validation("bounded ranked heap capacity must be at least 1"));
        }
        Ok(Self::new(capacity, order))
    }

    /// Offer a candidate.
    ///
    /// Returns `true` if the candidate is now held.
    pub fn offer(&mut self, key: K, priority: f64) -> bool {
        if priority.is_nan() {
            return false;
        }

        let entry = HeapEntry { key, priority, order: self.order };
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            return true;
        }

        match self.heap.peek() {
            Some(worst) if self.order.is_better(priority, worst.priority) => {
                self.heap.pop();
                self.heap.push(entry);
                true
            }
            _ => false,
        }
    }

    /// Maximum number of entries held.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The order entries are ranked by.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> RankOrder {
        self.order
    }

    /// Number of entries currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing has been accepted yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Priority of the worst held entry.
    #[inline]
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.priority)
    }

    /// Copy the held entries out, best first.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<(K, f64)> {
        self.clone().into_vec()
    }

    /// Consume the heap, returning its entries best first.
    #[must_use]
    pub fn into_vec(self) -> Vec<(K, f64)> {
        self.heap.into_sorted_vec().into_iter().map(|entry| (entry.key, entry.priority)).collect()
    }
}
