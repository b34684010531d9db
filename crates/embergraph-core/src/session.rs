//! # Session Module
//!
//! The request/response façade callers talk to in place of a remote graph
//! database client.
//!
//! A `Session` owns the entity store and its persistence manager. There is
//! no uninitialized session value: `Session::open` loads the store and
//! returns a ready handle. Every successful query is followed by a full
//! flush to disk.
//!
//! ## Transactions
//!
//! `write_transaction` and `read_transaction` hand the session to a closure
//! by exclusive borrow, so no other writer can interleave with the composite
//! operation. There is no rollback: queries that succeeded before a later
//! failure inside the closure stay applied and flushed.

use crate::executor::QueryExecutor;
use crate::formats::Persistence;
use crate::graph::EntityStore;
use crate::query::Request;
use crate::record::QueryResult;
use crate::{GraphError, Node, NodeId, Params};
use std::path::{Path, PathBuf};

/// A ready session over one data directory.
#[derive(Debug)]
pub struct Session {
    store: EntityStore,
    persistence: Persistence,
}

impl Session {
    /// Open a session on `dir`, creating the directory if needed and loading
    /// whatever was persisted there.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, GraphError> {
        let persistence = Persistence::new(dir);
        let store = persistence.initialize()?;
        Ok(Self { store, persistence })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Recognize a query template and run it.
    ///
    /// An unrecognized template fails with `UnrecognizedQuery` before anything
    /// is touched, in memory or on disk.
    pub fn run(&mut self, template: &str, params: &Params) -> Result<QueryResult, GraphError> {
        let request = Request::from_template(template, params)?;
        self.execute(&request)
    }

    /// Run a typed request, then flush.
    ///
    /// A flush failure is returned to the caller; the in-memory change has
    /// already been applied at that point.
    pub fn execute(&mut self, request: &Request) -> Result<QueryResult, GraphError> {
        let records = QueryExecutor::execute(&mut self.store, request)?;
        tracing::debug!(
            shape = request.name(),
            write = request.is_write(),
            "flushing after query"
        );
        self.persistence.flush(&self.store)?;
        Ok(QueryResult::new(records))
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Run a composite write under exclusive access.
    pub fn write_transaction<T, F>(&mut self, work: F) -> Result<T, GraphError>
    where
        F: FnOnce(&mut Self) -> Result<T, GraphError>,
    {
        tracing::debug!("write transaction begin");
        let result = work(self);
        tracing::debug!(ok = result.is_ok(), "write transaction end");
        result
    }

    /// Run a composite read. Same exclusion as a write; reads still flush.
    pub fn read_transaction<T, F>(&mut self, work: F) -> Result<T, GraphError>
    where
        F: FnOnce(&mut Self) -> Result<T, GraphError>,
    {
        tracing::debug!("read transaction begin");
        let result = work(self);
        tracing::debug!(ok = result.is_ok(), "read transaction end");
        result
    }

    /// Release the session. Nothing is held open between queries, so this
    /// only logs; the session stays usable.
    pub fn close(&mut self) {
        tracing::debug!(dir = %self.persistence.dir().display(), "session closed");
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Read access to the entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The data directory backing this session.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.persistence.dir()
    }

    /// Look up a node by identity.
    pub fn node(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.store
            .node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
