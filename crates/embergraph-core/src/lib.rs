//! # embergraph-core
//!
//! Embedded property-graph store for code-structure graphs.
//!
//! This crate stands in for a remote graph database. It keeps files,
//! functions, classes and their relationships in memory, answers a closed set
//! of lookup/upsert query shapes, and persists everything to two JSON files.
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Single owner: all mutation goes through `&mut Session`
//! - Closed query surface: unrecognized templates are rejected, never guessed
//! - Nodes and relationships are never deleted

// =============================================================================
// MODULES
// =============================================================================

pub mod executor;
pub mod formats;
pub mod graph;
pub mod ident;
pub mod matching;
pub mod primitives;
pub mod query;
pub mod record;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    GraphError, Labels, Node, NodeId, Params, Properties, PropertyValue, Relationship,
    RelationshipId, labels,
};

// =============================================================================
// RE-EXPORTS: Store and Queries
// =============================================================================

pub use executor::QueryExecutor;
pub use graph::EntityStore;
pub use matching::MatchingEngine;
pub use query::{Request, SymbolKind};
pub use record::{DriverInteger, QueryResult, Record, RecordValue};
pub use session::Session;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{Persistence, collection_from_bytes, collection_to_bytes};
