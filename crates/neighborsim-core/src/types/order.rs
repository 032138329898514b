//! Rank orders for bounded collections.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Which end of the priority range a bounded collection retains.
///
/// Both orders share one insertion algorithm: [`RankOrder::compare`] returns
/// [`Ordering::Less`] when the first priority ranks ahead of the second, so
/// "best first" is simply ascending order under this comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RankOrder {
    /// Keep the highest priorities (top-k).
    #[default]
    Descending,
    /// Keep the lowest priorities (bottom-k).
    Ascending,
}

impl RankOrder {
    /// Select the order from a signed limit such as `topK` or `topN`.
    ///
    /// Negative values select [`RankOrder::Ascending`]; zero and positive
    /// values select [`RankOrder::Descending`].
    #[inline]
    #[must_use]
    pub const fn from_signed(limit: i64) -> Self {
        if limit < 0 {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// Compare two priorities by rank.
    ///
    /// `Less` means `a` ranks ahead of `b`. Uses a total order on `f64`;
    /// callers are expected to filter out NaN before comparing.
    #[inline]
    #[must_use]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Descending => b.total_cmp(&a),
            Self::Ascending => a.total_cmp(&b),
        }
    }

    /// Returns true if `a` ranks strictly ahead of `b`.
    #[inline]
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// The opposite order.
    #[inline]
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Descending => Self::Ascending,
            Self::Ascending => Self::Descending,
        }
    }
}
