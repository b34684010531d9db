//! # Entity Store
//!
//! In-memory keyed collections of nodes and relationships. This is the source
//! of truth for the lifetime of a session; persistence is a separate,
//! explicit step (see `formats::persistence`).
//!
//! Each collection is a `Vec` in insertion order plus a `BTreeMap` index from
//! identity to position. Replacing an entity keeps its original position, so
//! persisted output is deterministic.

use crate::{Node, NodeId, Relationship, RelationshipId};
use std::collections::BTreeMap;

// =============================================================================
// ENTITY STORE
// =============================================================================

/// The two keyed collections backing a session.
///
/// No schema validation happens here beyond the shape of `Node` and
/// `Relationship`. Creation rules live in the matching engine.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    /// Nodes in insertion order.
    nodes: Vec<Node>,
    /// Identity -> position in `nodes`.
    node_index: BTreeMap<NodeId, usize>,
    /// Relationships in insertion order.
    relationships: Vec<Relationship>,
    /// Identity -> position in `relationships`.
    relationship_index: BTreeMap<RelationshipId, usize>,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted collections.
    ///
    /// A later entry with an identity already seen replaces the earlier one.
    /// Relationship endpoints are not re-validated.
    #[must_use]
    pub fn from_parts(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        let mut store = Self::new();
        for node in nodes {
            store.put_node(node);
        }
        for relationship in relationships {
            store.put_relationship(relationship);
        }
        store
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Get a node by identity.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).and_then(|&pos| self.nodes.get(pos))
    }

    /// Get a mutable node by identity.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let pos = *self.node_index.get(id)?;
        self.nodes.get_mut(pos)
    }

    /// Check whether a node exists.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Insert a node, or replace the node with the same identity in place.
    pub fn put_node(&mut self, node: Node) {
        if let Some(&pos) = self.node_index.get(&node.id) {
            if let Some(slot) = self.nodes.get_mut(pos) {
                *slot = node;
                return;
            }
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // RELATIONSHIPS
    // =========================================================================

    /// Get a mutable relationship by identity.
    pub fn relationship_mut(&mut self, id: &RelationshipId) -> Option<&mut Relationship> {
        let pos = *self.relationship_index.get(id)?;
        self.relationships.get_mut(pos)
    }

    /// All relationships in insertion order.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Insert a relationship, or replace the one with the same identity in place.
    pub fn put_relationship(&mut self, relationship: Relationship) {
        if let Some(&pos) = self.relationship_index.get(&relationship.id) {
            if let Some(slot) = self.relationships.get_mut(pos) {
                *slot = relationship;
                return;
            }
        }
        self.relationship_index
            .insert(relationship.id.clone(), self.relationships.len());
        self.relationships.push(relationship);
    }

    /// Relationships starting at the given node, in insertion order.
    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| &r.start_id == id)
    }

    /// Total number of relationships.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Check whether the store holds no entities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
