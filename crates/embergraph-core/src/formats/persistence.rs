//! # Persistence Format
//!
//! JSON persistence for the entity store.
//!
//! Layout inside the data directory:
//! - `nodes.json`: pretty-printed array of nodes
//! - `relationships.json`: pretty-printed array of relationships
//!
//! Both files are rewritten in full on every flush. There is no write-ahead
//! log and no atomic swap, so a crash between the two writes can leave them
//! mutually inconsistent.
//!
//! ## Size limit
//!
//! Files larger than `MAX_COLLECTION_FILE_SIZE` are rejected from their
//! metadata, before they are read. The pure byte functions repeat the check
//! before any deserialization is attempted.

use crate::graph::EntityStore;
use crate::primitives::{MAX_COLLECTION_FILE_SIZE, NODES_FILE, RELATIONSHIPS_FILE};
use crate::{GraphError, Node, Relationship};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize one collection to pretty-printed JSON bytes.
///
/// This is a pure transformation - no file I/O.
pub fn collection_to_bytes<T: Serialize>(items: &[T]) -> Result<Vec<u8>, GraphError> {
    serde_json::to_vec_pretty(items).map_err(|e| GraphError::SerializationError(e.to_string()))
}

/// Deserialize one collection from JSON bytes.
///
/// This is a pure transformation - no file I/O. The size limit is checked
/// before parsing.
pub fn collection_from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, GraphError> {
    ensure_within_limit(bytes.len())?;
    serde_json::from_slice(bytes).map_err(|e| GraphError::DeserializationError(e.to_string()))
}

fn ensure_within_limit(len: usize) -> Result<(), GraphError> {
    if len > MAX_COLLECTION_FILE_SIZE {
        return Err(GraphError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            len, MAX_COLLECTION_FILE_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// PERSISTENCE MANAGER
// =============================================================================

/// Reads and writes the two collection files of one data directory.
#[derive(Debug, Clone)]
pub struct Persistence {
    dir: PathBuf,
}

impl Persistence {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn nodes_path(&self) -> PathBuf {
        self.dir.join(NODES_FILE)
    }

    #[must_use]
    pub fn relationships_path(&self) -> PathBuf {
        self.dir.join(RELATIONSHIPS_FILE)
    }

    /// Ensure the data directory exists and load the persisted store.
    ///
    /// Failing to create the directory is an error. Any failure to load either
    /// collection is not: the whole store starts empty and the cause is logged.
    pub fn initialize(&self) -> Result<EntityStore, GraphError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            GraphError::IoError(format!(
                "Failed to create data directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let nodes = self.load_collection::<Node>(&self.nodes_path());
        let relationships = self.load_collection::<Relationship>(&self.relationships_path());

        match (nodes, relationships) {
            (Ok(nodes), Ok(relationships)) => {
                let store = EntityStore::from_parts(nodes, relationships);
                tracing::info!(
                    dir = %self.dir.display(),
                    nodes = store.node_count(),
                    relationships = store.relationship_count(),
                    "loaded graph store"
                );
                Ok(store)
            }
            (Err(LoadError::Missing(_)), Err(LoadError::Missing(_))) => {
                tracing::info!(dir = %self.dir.display(), "no persisted data, starting empty");
                Ok(EntityStore::new())
            }
            (Err(LoadError::Missing(path)), _) | (_, Err(LoadError::Missing(path))) => {
                // the other collection is present and gets overwritten on the next flush
                tracing::warn!(
                    path = %path.display(),
                    "collection file missing, discarding the other collection and starting empty"
                );
                Ok(EntityStore::new())
            }
            (Err(LoadError::Corrupt(path, error)), _)
            | (_, Err(LoadError::Corrupt(path, error))) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "persisted data unreadable, starting empty"
                );
                Ok(EntityStore::new())
            }
        }
    }

    /// Write both collections, overwriting prior contents.
    pub fn flush(&self, store: &EntityStore) -> Result<(), GraphError> {
        let nodes = collection_to_bytes(store.nodes())?;
        let relationships = collection_to_bytes(store.relationships())?;

        write_file(&self.nodes_path(), &nodes)?;
        write_file(&self.relationships_path(), &relationships)?;

        tracing::debug!(
            nodes = store.node_count(),
            relationships = store.relationship_count(),
            "flushed graph store"
        );
        Ok(())
    }

    /// Read one collection file. The size limit is checked against file
    /// metadata before anything is read.
    fn load_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, LoadError> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::Missing(path.to_path_buf()));
            }
            Err(e) => {
                return Err(LoadError::Corrupt(
                    path.to_path_buf(),
                    GraphError::IoError(e.to_string()),
                ));
            }
        };
        let len = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        ensure_within_limit(len).map_err(|e| LoadError::Corrupt(path.to_path_buf(), e))?;

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::Missing(path.to_path_buf()));
            }
            Err(e) => {
                return Err(LoadError::Corrupt(
                    path.to_path_buf(),
                    GraphError::IoError(e.to_string()),
                ));
            }
        };

        collection_from_bytes(&bytes).map_err(|e| LoadError::Corrupt(path.to_path_buf(), e))
    }
}

/// Why a collection could not be loaded. Both cases recover to an empty store.
enum LoadError {
    Missing(PathBuf),
    Corrupt(PathBuf, GraphError),
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), GraphError> {
    std::fs::write(path, bytes)
        .map_err(|e| GraphError::IoError(format!("Failed to write {}: {}", path.display(), e)))
}

// =============================================================================
// TESTS
// =============================================================================
