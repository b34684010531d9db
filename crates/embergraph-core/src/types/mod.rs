//! # Core Type Definitions
//!
//! This module contains the data model shared by every component:
//! - Entity identifiers (`NodeId`, `RelationshipId`)
//! - Graph entities (`Node`, `Relationship`)
//! - Property maps (`Properties`, `PropertyValue`, `Params`)
//! - Error types (`GraphError`)
//!
//! ## Ordering Guarantees
//!
//! Labels and properties live in `BTreeSet`/`BTreeMap`, so label-set equality
//! is order-irrelevant and serialized output is stable across runs.

use crate::ident;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

// =============================================================================
// PROPERTY MAPS
// =============================================================================

/// A single property value: a JSON scalar or array.
pub type PropertyValue = serde_json::Value;

/// Open, string-keyed property mapping carried by nodes and relationships.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Parameter mapping supplied alongside a query template.
pub type Params = BTreeMap<String, PropertyValue>;

/// Set of labels carried by a node.
pub type Labels = BTreeSet<String>;

/// Build a label set from anything string-like.
pub fn labels<I, S>(items: I) -> Labels
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identity of a node. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ident::new_identifier())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identity of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub String);

impl RelationshipId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ident::new_identifier())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A labeled, property-bearing vertex.
///
/// Labels are fixed at creation. Properties only ever grow or change through
/// [`Node::merge_properties`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub labels: Labels,
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(id: NodeId, labels: Labels, properties: Properties) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// Check whether the node carries the given label.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Look up a single property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check whether a property holds the given string.
    #[must_use]
    pub fn property_is(&self, key: &str, expected: &str) -> bool {
        self.property(key).and_then(PropertyValue::as_str) == Some(expected)
    }

    /// Merge incoming properties. Incoming values overwrite same-named
    /// existing ones; everything else is preserved.
    pub fn merge_properties(&mut self, incoming: Properties) {
        self.properties.extend(incoming);
    }
}

// =============================================================================
// RELATIONSHIP
// =============================================================================

/// A typed, directed, property-bearing edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_id: NodeId,
    pub end_id: NodeId,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Create a new relationship.
    #[must_use]
    pub fn new(
        id: RelationshipId,
        rel_type: impl Into<String>,
        start_id: NodeId,
        end_id: NodeId,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            start_id,
            end_id,
            properties,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Embergraph store.
///
/// Relationship creation against a missing endpoint is NOT an error: it is
/// reported as `None` and logged, matching the remote driver's behaviour.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node must carry at least one label.
    #[error("Node label set must not be empty")]
    EmptyLabels,

    /// The requested node was not found.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The query template does not match any supported shape.
    #[error("Unrecognized query shape: {0}")]
    UnrecognizedQuery(String),

    /// A parameter required by the recognized shape was not supplied.
    #[error("Missing parameter '{name}' for {shape} query")]
    MissingParameter { shape: &'static str, name: String },

    /// A parameter was supplied with the wrong type.
    #[error("Invalid parameter '{name}': expected {expected}")]
    InvalidParameter { name: String, expected: &'static str },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
