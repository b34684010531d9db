//! # Store Primitives
//!
//! Fixed constants compiled into the store: key properties used by the
//! merge rule, well-known labels and relationship types, the persisted file
//! layout, and the demo fixture.

/// Property names compared when deciding whether two nodes are the same
/// entity. A key present on only one side never blocks a match.
pub const KEY_PROPERTIES: [&str; 4] = ["path", "name", "uniqueId", "projectId"];

/// Property holding the owning project of a node.
pub const PROJECT_ID: &str = "projectId";

/// Property holding a file path.
pub const PATH: &str = "path";

/// Property holding a symbol name.
pub const NAME: &str = "name";

/// Property recording which file a symbol was found in.
pub const FILE_PATH: &str = "filePath";

// =============================================================================
// LABELS & RELATIONSHIP TYPES
// =============================================================================

pub const FILE_LABEL: &str = "File";
pub const FUNCTION_LABEL: &str = "Function";
pub const CLASS_LABEL: &str = "Class";

pub const CONTAINS: &str = "CONTAINS";
pub const IMPORTS: &str = "IMPORTS";

// =============================================================================
// PERSISTED LAYOUT
// =============================================================================

/// Data directory used when nothing else is configured, relative to the
/// working directory at startup.
pub const DEFAULT_DATA_DIR: &str = ".embergraph";

/// File holding the node collection.
pub const NODES_FILE: &str = "nodes.json";

/// File holding the relationship collection.
pub const RELATIONSHIPS_FILE: &str = "relationships.json";

/// Maximum size of a persisted collection file.
///
/// Checked against file metadata before reading; larger files are treated as
/// unreadable.
pub const MAX_COLLECTION_FILE_SIZE: usize = 256 * 1024 * 1024; // 256 MB

// =============================================================================
// DEMO FIXTURE
// =============================================================================

pub const DEMO_PROJECT_ID: &str = "demo";
pub const DEMO_ENTRY_PATH: &str = "/demo/src/index.ts";
pub const DEMO_DEPENDENCY_PATH: &str = "/demo/src/util.ts";
pub const DEMO_CLASS_NAME: &str = "DemoService";
