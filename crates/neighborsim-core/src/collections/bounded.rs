//! Sorted fixed-capacity list.

use std::cmp::Ordering;

use crate::error::{CoreError, CoreResult};
use crate::types::{NodeId, RankOrder, SimilarityResult};

use super::MAX_PREALLOCATED_ENTRIES;

/// A sorted list that keeps the best `capacity` entries offered to it.
///
/// Entries are kept best-first under the list's [`RankOrder`]. An offer
/// binary-searches for its insertion point; if that point lies beyond the
/// capacity the candidate is not competitive and is dropped, otherwise the
/// tail shifts right by one and the worst entry falls off when the list is
/// full.
///
/// NaN priorities are rejected. A candidate whose priority equals held
/// entries is placed after them, so it never displaces an equal entry from
/// a full list.
///
/// # Example
///
/// ```
/// use neighborsim_core::{BoundedRankedList, RankOrder};
///
/// let mut lowest = BoundedRankedList::new(2, RankOrder::Ascending);
/// for (key, priority) in [('a', 0.4), ('b', 0.1), ('c', 0.3)] {
///     lowest.offer(key, priority);
/// }
///
/// assert_eq!(lowest.into_vec(), vec![('b', 0.1), ('c', 0.3)]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedRankedList<K> {
    capacity: usize,
    order: RankOrder,
    entries: Vec<(K, f64)>,
}

impl<K: Copy> BoundedRankedList<K> {
    /// Create an empty list.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`BoundedRankedList::try_new`] for
    /// capacities that come from user input.
    #[must_use]
    pub fn new(capacity: usize, order: RankOrder) -> Self {
        assert!(capacity > 0, "bounded ranked list capacity must be at least 1");
        Self {
            capacity,
            order,
            entries: Vec::with_capacity(capacity.min(MAX_PREALLOCATED_ENTRIES)),
        }
    }

    /// Create an empty list, rejecting a zero capacity.
    pub fn try_new(capacity: usize, order: RankOrder) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::validation("bounded ranked list capacity must be at least 1"));
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

        let order = self.order;
        if self.is_full() && !self.worst().map_or(true, |worst| order.is_better(priority, worst)) {
            return false;
        }

        let index = self
            .entries
            .partition_point(|&(_, held)| order.compare(held, priority) != Ordering::Greater);
        if index >= self.capacity {
            return false;
        }

        if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(index, (key, priority));
        true
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
        self.entries.len()
    }

    /// Returns true if nothing has been accepted yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the list holds `capacity` entries.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Priority of the worst held entry, the bar a new candidate must beat
    /// once the list is full.
    #[inline]
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        self.entries.last().map(|&(_, priority)| priority)
    }

    /// Priority of the best held entry.
    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<f64> {
        self.entries.first().map(|&(_, priority)| priority)
    }

    /// Held keys, best first.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = K> + '_ {
        self.entries.iter().map(|&(key, _)| key)
    }

    /// Held priorities, best first.
    pub fn priorities(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, priority)| priority)
    }

    /// Held `(key, priority)` entries as a slice, best first.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[(K, f64)] {
        &self.entries
    }

    /// Held `(key, priority)` entries, best first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (K, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Consume the list, returning its entries best first.
    #[must_use]
    pub fn into_vec(self) -> Vec<(K, f64)> {
        self.entries
    }
}

/// Dual-key list holding node pairs, used for global top-n.
pub type BoundedPairList = BoundedRankedList<(NodeId, NodeId)>;

impl BoundedRankedList<(NodeId, NodeId)> {
    /// Offer a scored pair.
    #[inline]
    pub fn offer_pair(&mut self, source: NodeId, target: NodeId, similarity: f64) -> bool {
        self.offer((source, target), similarity)
    }

    /// Held pairs as similarity results, best first.
    pub fn results(&self) -> impl ExactSizeIterator<Item = SimilarityResult> + '_ {
        self.entries.iter().map(|&((source, target), similarity)| {
            SimilarityResult::new(source, target, similarity)
        })
    }

    /// Consume the list, returning similarity results best first.
    #[must_use]
    pub fn into_results(self) -> Vec<SimilarityResult> {
        self.entries
            .into_iter()
            .map(|((source, target), similarity)| SimilarityResult::new(source, target, similarity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_highest_in_descending_order() {
        let mut list = BoundedRankedList::new(3, RankOrder::Descending);
        for (key, priority) in [(1, 0.5), (2, 0.1), (3, 0.9), (4, 0.7), (5, 0.3)] {
            list.offer(key, priority);
        }

        assert_eq!(list.len(), 3);
        assert_eq!(list.keys().collect::<Vec<_>>(), vec![3, 4, 1]);
        assert_eq!(list.priorities().collect::<Vec<_>>(), vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn keeps_lowest_in_ascending_order() {
        let mut list = BoundedRankedList::new(2, RankOrder::Ascending);
        for (key, priority) in [(1, 0.5), (2, 0.1), (3, 0.9), (4, 0.0)] {
            list.offer(key, priority);
        }

        assert_eq!(list.into_vec(), vec![(4, 0.0), (2, 0.1)]);
    }

    #[test]
    fn rejects_uncompetitive_when_full() {
        let mut list = BoundedRankedList::new(2, RankOrder::Descending);
        assert!(list.offer('a', 0.8));
        assert!(list.offer('b', 0.6));
        assert!(!list.offer('c', 0.2));
        assert!(list.is_full());
        assert_eq!(list.worst(), Some(0.6));
        assert_eq!(list.best(), Some(0.8));
    }

    #[test]
    fn equal_priority_does_not_displace_when_full() {
        let mut list = BoundedRankedList::new(2, RankOrder::Descending);
        list.offer('a', 0.5);
        list.offer('b', 0.5);
        assert!(!list.offer('c', 0.5));
        assert_eq!(list.keys().collect::<Vec<_>>(), vec!['a', 'b']);
    }

    #[test]
    fn equal_priority_is_accepted_with_room() {
        let mut list = BoundedRankedList::new(3, RankOrder::Descending);
        list.offer('a', 0.5);
        assert!(list.offer('b', 0.5));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn nan_is_rejected() {
        let mut list = BoundedRankedList::new(2, RankOrder::Descending);
        assert!(!list.offer(1, f64::NAN));
        assert!(list.is_empty());
        list.offer(2, 0.1);
        assert!(!list.offer(3, f64::NAN));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn capacity_one() {
        let mut list = BoundedRankedList::new(1, RankOrder::Descending);
        list.offer(1, 0.2);
        list.offer(2, 0.4);
        list.offer(3, 0.3);
        assert_eq!(list.into_vec(), vec![(2, 0.4)]);
    }

    #[test]
    fn try_new_rejects_zero_capacity() {
        let result = BoundedRankedList::<u32>::try_new(0, RankOrder::Descending);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn new_panics_on_zero_capacity() {
        let _ = BoundedRankedList::<u32>::new(0, RankOrder::Descending);
    }

    #[test]
    fn pair_list_results() {
        let mut pairs = BoundedPairList::new(2, RankOrder::Descending);
        pairs.offer_pair(NodeId::new(0), NodeId::new(1), 0.25);
        pairs.offer_pair(NodeId::new(0), NodeId::new(2), 0.75);
        pairs.offer_pair(NodeId::new(1), NodeId::new(2), 0.5);

        let results = pairs.into_results();
        assert_eq!(
            results,
            vec![
                SimilarityResult::new(NodeId::new(0), NodeId::new(2), 0.75),
                SimilarityResult::new(NodeId::new(1), NodeId::new(2), 0.5),
            ]
        );
    }
}
