//! Fixed-capacity ranked collections.
//!
//! These containers retain only the best `C` entries offered so far, which
//! lets the similarity engine report top-k and top-n results without ever
//! holding the full pairwise result set.
//!
//! # Containers
//!
//! - [`BoundedRankedList`] - Sorted array, binary search plus shift on insert
//! - [`BoundedRankedHeap`] - Binary heap with the worst entry on top
//! - [`RankedBuffer`] - Picks one of the two based on capacity
//! - [`PerEntityTopKTable`] - One [`RankedBuffer`] per node
//!
//! # Complexity
//!
//! | Container | Offer | Read-back |
//! |-----------|-------|-----------|
//! | `BoundedRankedList` | O(log C + C) | O(C), already sorted |
//! | `BoundedRankedHeap` | O(log C) | O(C log C) |
//!
//! The sorted array wins for the small capacities typical of top-k, the
//! heap for large top-k and top-n values.

mod bounded;
mod buffer;
mod heap;
mod topk;


pub use bounded::{BoundedPairList, BoundedRankedList};
pub use buffer::{RankedBuffer, RankedIter, HEAP_CAPACITY_THRESHOLD};
pub use heap::BoundedRankedHeap;
pub use topk::{PerEntityTopKTable, TopKShard};

/// Upper bound on the number of slots reserved up front by a collection.
///
/// Capacities come from user configuration and may be far larger than the
/// number of candidates ever offered.
pub(crate) const MAX_PREALLOCATED_ENTRIES: usize = 1024;
