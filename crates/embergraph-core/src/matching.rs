//! # Matching Engine
//!
//! Find-or-create (merge/upsert) semantics over the entity store.
//!
//! A node matches an upsert when:
//! - its label set equals the requested label set, and
//! - every key property (`primitives::KEY_PROPERTIES`) present on BOTH sides
//!   holds the same value.
//!
//! A key present on only one side does not block the match. When neither side
//! carries any key, any node with the same label set matches; this is
//! ambiguous and logged at debug level.

use crate::graph::EntityStore;
use crate::primitives::KEY_PROPERTIES;
use crate::{GraphError, Labels, Node, NodeId, Properties, Relationship, RelationshipId};

/// Stateless merge rules applied to an `EntityStore`.
pub struct MatchingEngine;

impl MatchingEngine {
    /// Find the first node matching `labels` + key properties, merge the
    /// incoming properties into it, or create a new node if none matches.
    ///
    /// Returns the identity of the matched or created node.
    pub fn find_or_create(
        store: &mut EntityStore,
        labels: &Labels,
        properties: Properties,
    ) -> Result<NodeId, GraphError> {
        if labels.is_empty() {
            return Err(GraphError::EmptyLabels);
        }

        let existing = Self::find(store, labels, &properties).map(|node| node.id.clone());

        if let Some(id) = existing {
            if let Some(node) = store.node_mut(&id) {
                node.merge_properties(properties);
            }
            tracing::debug!(node = %id, ?labels, "merged into existing node");
            return Ok(id);
        }

        let id = NodeId::generate();
        store.put_node(Node::new(id.clone(), labels.clone(), properties));
        tracing::debug!(node = %id, ?labels, "created node");
        Ok(id)
    }

    /// Read-only half of `find_or_create`: the first node that would be merged into.
    #[must_use]
    pub fn find<'a>(
        store: &'a EntityStore,
        labels: &Labels,
        properties: &Properties,
    ) -> Option<&'a Node> {
        let found = store
            .nodes()
            .iter()
            .find(|node| &node.labels == labels && Self::keys_agree(&node.properties, properties));

        if let Some(node) = found {
            if !Self::shares_key(&node.properties, properties) {
                tracing::debug!(
                    node = %node.id,
                    ?labels,
                    "matched on label set alone, no key property on both sides"
                );
            }
        }

        found
    }

    /// Create a relationship between two existing nodes.
    ///
    /// Returns `None` (and logs) when either endpoint is absent; the store is
    /// left untouched in that case.
    pub fn create_relationship(
        store: &mut EntityStore,
        start: &NodeId,
        end: &NodeId,
        rel_type: &str,
        properties: Properties,
    ) -> Option<RelationshipId> {
        if !store.contains_node(start) || !store.contains_node(end) {
            tracing::warn!(
                %start,
                %end,
                rel_type,
                start_exists = store.contains_node(start),
                end_exists = store.contains_node(end),
                "cannot create relationship: endpoint not found"
            );
            return None;
        }

        let id = RelationshipId::generate();
        store.put_relationship(Relationship::new(
            id.clone(),
            rel_type,
            start.clone(),
            end.clone(),
            properties,
        ));
        tracing::debug!(relationship = %id, %start, %end, rel_type, "created relationship");
        Some(id)
    }

    /// Reuse the relationship with the same endpoints and type, merging
    /// properties into it, or create one.
    pub fn merge_relationship(
        store: &mut EntityStore,
        start: &NodeId,
        end: &NodeId,
        rel_type: &str,
        properties: Properties,
    ) -> Option<RelationshipId> {
        let existing = store
            .outgoing(start)
            .find(|r| &r.end_id == end && r.rel_type == rel_type)
            .map(|r| r.id.clone());

        match existing {
            Some(id) => {
                if let Some(rel) = store.relationship_mut(&id) {
                    rel.properties.extend(properties);
                }
                Some(id)
            }
            None => Self::create_relationship(store, start, end, rel_type, properties),
        }
    }

    /// Every key present on both sides must be equal.
    fn keys_agree(existing: &Properties, incoming: &Properties) -> bool {
        KEY_PROPERTIES
            .iter()
            .all(|key| match (existing.get(*key), incoming.get(*key)) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
    }

    fn shares_key(existing: &Properties, incoming: &Properties) -> bool {
        KEY_PROPERTIES
            .iter()
            .any(|key| existing.contains_key(*key) && incoming.contains_key(*key))
    }
}

// =============================================================================
// TESTS
// =============================================================================
