//! Identifiers for graph nodes.
//!
//! Two id spaces exist side by side. [`NodeId`] is the dense internal id in
//! `[0, N)` that every computation uses; [`EntityId`] is whatever id the host
//! graph knows the node by, and only appears at output boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Original identifier of a node in the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new `EntityId` from a raw u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense internal node identifier in `[0, node_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new `NodeId` from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Get the id as an index into per-node arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Create a `NodeId` from an array index.
    ///
    /// Returns `None` if the index does not fit the dense id space.
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_roundtrip() {
        let id = EntityId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn node_id_index() {
        let id = NodeId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(NodeId::from_index(7), Some(id));
    }

    #[test]
    fn node_id_from_oversized_index() {
        assert_eq!(NodeId::from_index(u32::MAX as usize), Some(NodeId::new(u32::MAX)));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(NodeId::from_index(u32::MAX as usize + 1), None);
    }

    #[test]
    fn ids_are_ordered() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert!(EntityId::new(1) < EntityId::new(2));
    }
}
