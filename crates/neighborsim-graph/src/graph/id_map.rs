//! Mapping between dense node ids and original entity ids.

use std::collections::HashMap;

use neighborsim_core::{EntityId, NodeId};

use crate::error::{GraphError, GraphResult};

/// Bijection between the dense [`NodeId`] space and host [`EntityId`]s.
///
/// Dense ids are handed out in insertion order.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    originals: Vec<EntityId>,
    internal: HashMap<EntityId, NodeId>,
}

impl IdMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` ids.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { originals: Vec::with_capacity(capacity), internal: HashMap::with_capacity(capacity) }
    }

    /// Register an entity and return its dense id.
    pub fn insert(&mut self, entity: EntityId) -> GraphResult<NodeId> {
        if self.internal.contains_key(&entity) {
            return Err(GraphError::EntityAlreadyExists(entity));
        }
        let node = NodeId::from_index(self.originals.len())
            .ok_or(GraphError::TooManyNodes(self.originals.len() + 1))?;
        self.originals.push(entity);
        self.internal.insert(entity, node);
        Ok(node)
    }

    /// The original id of a dense node.
    #[must_use]
    pub fn to_original(&self, node: NodeId) -> Option<EntityId> {
        self.originals.get(node.index()).copied()
    }

    /// The original id of a dense node handed out by this map.
    ///
    /// A foreign id has no original; debug builds panic on it, release
    /// builds report the dense value unchanged.
    #[must_use]
    pub fn to_original_or_dense(&self, node: NodeId) -> EntityId {
        let original = self.to_original(node);
        debug_assert!(
            original.is_some(),
            "node {node} is not mapped by this id map of {} nodes",
            self.len()
        );
        original.unwrap_or_else(|| EntityId::new(u64::from(node.as_u32())))
    }

    /// The dense id of an original entity.
    #[must_use]
    pub fn to_internal(&self, entity: EntityId) -> Option<NodeId> {
        self.internal.get(&entity).copied()
    }

    /// Number of mapped nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Returns true if no nodes are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_dense_ids_in_order() {
        let mut map = IdMap::new();
        assert_eq!(map.insert(EntityId::new(100)).expect("insert"), NodeId::new(0));
        assert_eq!(map.insert(EntityId::new(7)).expect("insert"), NodeId::new(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.to_original(NodeId::new(1)), Some(EntityId::new(7)));
        assert_eq!(map.to_internal(EntityId::new(100)), Some(NodeId::new(0)));
        assert_eq!(map.to_original(NodeId::new(2)), None);
    }

    #[test]
    fn rejects_duplicates() {
        let mut map = IdMap::new();
        map.insert(EntityId::new(1)).expect("insert");
        assert!(matches!(
            map.insert(EntityId::new(1)),
            Err(GraphError::EntityAlreadyExists(id)) if id == EntityId::new(1)
        ));
    }

    #[test]
    fn maps_known_ids_to_originals() {
        let mut map = IdMap::new();
        map.insert(EntityId::new(42)).expect("insert");
        assert_eq!(map.to_original_or_dense(NodeId::new(0)), EntityId::new(42));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not mapped")]
    fn foreign_ids_assert_in_debug_builds() {
        let map = IdMap::new();
        let _ = map.to_original_or_dense(NodeId::new(3));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn foreign_ids_fall_back_to_dense_value() {
        let map = IdMap::new();
        assert_eq!(map.to_original_or_dense(NodeId::new(3)), EntityId::new(3));
    }
}
