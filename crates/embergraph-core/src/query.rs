//! # Query Module
//!
//! The closed set of query shapes the store answers.
//!
//! `Request` is the typed contract: one variant per shape, each carrying its
//! own parameters. `Request::from_template` is the compatibility layer for
//! callers that still send a query string plus a parameter map, as they
//! would to a remote graph database. Recognition is structural (a fixed
//! pattern per shape), not a general parser. A template that matches no
//! shape is rejected with `GraphError::UnrecognizedQuery`.

use crate::primitives::{
    CLASS_LABEL, DEMO_CLASS_NAME, DEMO_DEPENDENCY_PATH, DEMO_ENTRY_PATH, DEMO_PROJECT_ID,
    FILE_PATH, FUNCTION_LABEL, NAME, PATH, PROJECT_ID,
};
use crate::{GraphError, Params, Properties, PropertyValue};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// =============================================================================
// OUTPUT FIELDS
// =============================================================================

pub const NODE_FIELDS: &[&str] = &["n"];
pub const EXPAND_FIELDS: &[&str] = &["n", "r", "m"];
pub const ID_FIELDS: &[&str] = &["id"];
pub const SYMBOL_FIELDS: &[&str] = &["id", "relId"];
pub const PING_FIELDS: &[&str] = &["ok"];
pub const COUNT_FIELDS: &[&str] = &["count"];
pub const SEED_FIELDS: &[&str] = &["file", "dependency", "class"];

// =============================================================================
// SYMBOL KIND
// =============================================================================

/// Kind of code symbol that can be upserted under a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Class,
}

impl SymbolKind {
    /// The node label for this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Function => FUNCTION_LABEL,
            Self::Class => CLASS_LABEL,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SymbolKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(FUNCTION_LABEL) {
            Ok(Self::Function)
        } else if s.eq_ignore_ascii_case(CLASS_LABEL) {
            Ok(Self::Class)
        } else {
            Err(GraphError::InvalidParameter {
                name: "kind".to_string(),
                expected: "Function or Class",
            })
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// One request per supported query shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// Nodes carrying `label`, optionally restricted to one project.
    MatchNodes {
        label: String,
        #[serde(default)]
        project_id: Option<String>,
    },

    /// Like `MatchNodes`, plus one row per outgoing relationship.
    ExpandNodes {
        label: String,
        #[serde(default)]
        project_id: Option<String>,
    },

    /// Upsert a `File` keyed by path and project.
    UpsertFile {
        path: String,
        project_id: String,
        #[serde(default)]
        properties: Properties,
    },

    /// Upsert a `Function` or `Class` and link it from its `File` via `CONTAINS`.
    UpsertSymbol {
        kind: SymbolKind,
        name: String,
        project_id: String,
        file_path: String,
        #[serde(default)]
        properties: Properties,
    },

    /// Connectivity probe.
    Ping,

    /// Number of nodes belonging to a project.
    CountProject { project_id: String },

    /// Populate the demo fixture.
    SeedDemo,
}

impl Request {
    /// Shape name, as used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MatchNodes { .. } => "matchNodes",
            Self::ExpandNodes { .. } => "expandNodes",
            Self::UpsertFile { .. } => "upsertFile",
            Self::UpsertSymbol { .. } => "upsertSymbol",
            Self::Ping => "ping",
            Self::CountProject { .. } => "countProject",
            Self::SeedDemo => "seedDemo",
        }
    }

    /// Fixed output field names for this shape.
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::MatchNodes { .. } => NODE_FIELDS,
            Self::ExpandNodes { .. } => EXPAND_FIELDS,
            Self::UpsertFile { .. } => ID_FIELDS,
            Self::UpsertSymbol { .. } => SYMBOL_FIELDS,
            Self::Ping => PING_FIELDS,
            Self::CountProject { .. } => COUNT_FIELDS,
            Self::SeedDemo => SEED_FIELDS,
        }
    }

    /// Whether the shape can mutate the store.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::UpsertFile { .. } | Self::UpsertSymbol { .. } | Self::SeedDemo
        )
    }

    /// Canonical template for this shape. Feeding it back through
    /// `from_template` with the matching parameters yields the same request.
    #[must_use]
    pub fn template(&self) -> String {
        const FILTER: &str = " WHERE n.projectId = $projectId";
        match self {
            Self::MatchNodes { label, project_id } => {
                let filter = if project_id.is_some() { FILTER } else { "" };
                format!("MATCH (n:{label}){filter} RETURN n")
            }
            Self::ExpandNodes { label, project_id } => {
                let filter = if project_id.is_some() { FILTER } else { "" };
                format!("MATCH (n:{label}){filter} OPTIONAL MATCH (n)-[r]->(m) RETURN n, r, m")
            }
            Self::UpsertFile { .. } => {
                "MERGE (f:File {path: $path, projectId: $projectId}) \
                 SET f += $properties RETURN f.id AS id"
                    .to_string()
            }
            Self::UpsertSymbol { kind, .. } => format!(
                "MATCH (f:File {{path: $filePath, projectId: $projectId}}) \
                 MERGE (s:{kind} {{name: $name, projectId: $projectId}}) \
                 SET s += $properties \
                 MERGE (f)-[r:CONTAINS]->(s) RETURN s.id AS id, r.id AS relId"
            ),
            Self::Ping => "RETURN 1 AS ok".to_string(),
            Self::CountProject { .. } => {
                "MATCH (n {projectId: $projectId}) RETURN count(n) AS count".to_string()
            }
            Self::SeedDemo => format!(
                "CREATE (f:File {{path: '{DEMO_ENTRY_PATH}', projectId: '{DEMO_PROJECT_ID}'}})\
                 -[:IMPORTS]->(d:File {{path: '{DEMO_DEPENDENCY_PATH}', projectId: '{DEMO_PROJECT_ID}'}}), \
                 (f)-[:CONTAINS]->(c:Class {{name: '{DEMO_CLASS_NAME}', projectId: '{DEMO_PROJECT_ID}'}}) \
                 RETURN f.id AS file, d.id AS dependency, c.id AS class"
            ),
        }
    }

    /// Parameters that accompany `template()` for this request.
    #[must_use]
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::MatchNodes { project_id, .. } | Self::ExpandNodes { project_id, .. } => {
                if let Some(project_id) = project_id {
                    put_string(&mut params, PROJECT_ID, project_id);
                }
            }
            Self::UpsertFile {
                path,
                project_id,
                properties,
            } => {
                put_string(&mut params, PATH, path);
                put_string(&mut params, PROJECT_ID, project_id);
                params.insert(PROPERTIES_PARAM.to_string(), properties_value(properties));
            }
            Self::UpsertSymbol {
                name,
                project_id,
                file_path,
                properties,
                ..
            } => {
                put_string(&mut params, NAME, name);
                put_string(&mut params, PROJECT_ID, project_id);
                put_string(&mut params, FILE_PATH, file_path);
                params.insert(PROPERTIES_PARAM.to_string(), properties_value(properties));
            }
            Self::CountProject { project_id } => {
                put_string(&mut params, PROJECT_ID, project_id);
            }
            Self::Ping | Self::SeedDemo => {}
        }
        params
    }

    /// Recognize a query template and bind its parameters.
    pub fn from_template(template: &str, params: &Params) -> Result<Self, GraphError> {
        let normalized = normalize(template);

        let Some((shape, caps)) = SHAPES
            .iter()
            .find_map(|(shape, re)| re.captures(&normalized).map(|caps| (*shape, caps)))
        else {
            tracing::warn!(template = %normalized, "unrecognized query shape");
            return Err(GraphError::UnrecognizedQuery(normalized.clone()));
        };

        let request = match shape {
            Shape::Ping => Self::Ping,
            Shape::Count => Self::CountProject {
                project_id: required_string(params, "countProject", PROJECT_ID)?,
            },
            Shape::Seed => Self::SeedDemo,
            Shape::UpsertSymbol => Self::UpsertSymbol {
                kind: capture(&caps, "kind").parse()?,
                name: required_string(params, "upsertSymbol", NAME)?,
                project_id: required_string(params, "upsertSymbol", PROJECT_ID)?,
                file_path: required_string(params, "upsertSymbol", FILE_PATH)?,
                properties: optional_properties(params)?,
            },
            Shape::UpsertFile => Self::UpsertFile {
                path: required_string(params, "upsertFile", PATH)?,
                project_id: required_string(params, "upsertFile", PROJECT_ID)?,
                properties: optional_properties(params)?,
            },
            Shape::Expand => Self::ExpandNodes {
                label: capture(&caps, "label").to_string(),
                project_id: project_filter(&caps, params, "expandNodes")?,
            },
            Shape::Match => Self::MatchNodes {
                label: capture(&caps, "label").to_string(),
                project_id: project_filter(&caps, params, "matchNodes")?,
            },
        };

        tracing::trace!(shape = request.name(), "recognized query template");
        Ok(request)
    }
}

// =============================================================================
// TEMPLATE RECOGNITION
// =============================================================================

/// Parameter carrying extra properties for the upsert shapes.
const PROPERTIES_PARAM: &str = "properties";

#[derive(Debug, Clone, Copy)]
enum Shape {
    Ping,
    Count,
    Seed,
    UpsertSymbol,
    UpsertFile,
    Expand,
    Match,
}

/// Patterns in evaluation order. Keywords are case-insensitive; labels and
/// property names are not.
const SHAPE_PATTERNS: &[(Shape, &str)] = &[
    (Shape::Ping, r"^(?i:RETURN) 1(?: (?i:AS) \w+)? ?;?$"),
    (
        Shape::Count,
        r"^(?i:MATCH) ?\( ?\w+ ?\{ ?projectId ?: ?\$projectId ?\} ?\) ?(?i:RETURN) (?i:count) ?\( ?\w+ ?\)",
    ),
    (
        Shape::Seed,
        r"^(?i:CREATE) .*-\[ ?:IMPORTS ?\]->.*-\[ ?:CONTAINS ?\]->",
    ),
    (
        Shape::UpsertSymbol,
        r"(?i:MERGE) ?\( ?\w+ ?: ?(?P<kind>Function|Class)\b.*\[ ?\w* ?:CONTAINS ?\]",
    ),
    (
        Shape::UpsertFile,
        r"^(?i:MERGE) ?\( ?\w+ ?: ?File ?\{ ?path ?: ?\$path ?, ?projectId ?: ?\$projectId ?\} ?\)",
    ),
    (
        Shape::Expand,
        r"^(?i:MATCH) ?\( ?\w+ ?: ?(?P<label>\w+) ?\)(?P<filter> (?i:WHERE) \w+\.projectId ?= ?\$projectId)? (?i:OPTIONAL MATCH) ?\( ?\w+ ?\) ?- ?\[ ?\w+ ?\] ?-> ?\( ?\w+ ?\) (?i:RETURN) ",
    ),
    (
        Shape::Match,
        r"^(?i:MATCH) ?\( ?\w+ ?: ?(?P<label>\w+) ?\)(?P<filter> (?i:WHERE) \w+\.projectId ?= ?\$projectId)? (?i:RETURN) \w+ ?;?$",
    ),
];

static SHAPES: LazyLock<Vec<(Shape, Regex)>> = LazyLock::new(|| {
    SHAPE_PATTERNS
        .iter()
        .filter_map(|(shape, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((*shape, re)),
            Err(e) => {
                tracing::error!(?shape, error = %e, "invalid shape pattern");
                None
            }
        })
        .collect()
});

/// Collapse all whitespace runs to single spaces.
fn normalize(template: &str) -> String {
    template.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capture<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn project_filter(
    caps: &Captures<'_>,
    params: &Params,
    shape: &'static str,
) -> Result<Option<String>, GraphError> {
    if caps.name("filter").is_some() {
        required_string(params, shape, PROJECT_ID).map(Some)
    } else {
        Ok(None)
    }
}

fn required_string(params: &Params, shape: &'static str, name: &str) -> Result<String, GraphError> {
    match params.get(name) {
        None | Some(PropertyValue::Null) => Err(GraphError::MissingParameter {
            shape,
            name: name.to_string(),
        }),
        Some(PropertyValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(GraphError::InvalidParameter {
            name: name.to_string(),
            expected: "string",
        }),
    }
}

fn optional_properties(params: &Params) -> Result<Properties, GraphError> {
    match params.get(PROPERTIES_PARAM) {
        None | Some(PropertyValue::Null) => Ok(Properties::new()),
        Some(PropertyValue::Object(map)) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        Some(_) => Err(GraphError::InvalidParameter {
            name: PROPERTIES_PARAM.to_string(),
            expected: "object",
        }),
    }
}

fn put_string(params: &mut Params, key: &str, value: &str) {
    params.insert(key.to_string(), PropertyValue::String(value.to_string()));
}

fn properties_value(properties: &Properties) -> PropertyValue {
    PropertyValue::Object(
        properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

// =============================================================================
// TESTS
// =============================================================================
