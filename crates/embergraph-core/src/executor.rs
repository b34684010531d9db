//! # Query Executor
//!
//! Dispatches a `Request` against the entity store and produces ordered
//! result records. Purely in-memory: flushing is the session's job.

use crate::graph::EntityStore;
use crate::matching::MatchingEngine;
use crate::primitives::{
    CONTAINS, DEMO_CLASS_NAME, DEMO_DEPENDENCY_PATH, DEMO_ENTRY_PATH, DEMO_PROJECT_ID, FILE_LABEL,
    FILE_PATH, IMPORTS, NAME, PATH, PROJECT_ID,
};
use crate::query::{Request, SymbolKind};
use crate::record::{DriverInteger, Record, RecordValue};
use crate::{GraphError, Node, NodeId, Properties, PropertyValue, RelationshipId, labels};

/// Executes the closed set of query shapes.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Run one request and return its records in output order.
    pub fn execute(store: &mut EntityStore, request: &Request) -> Result<Vec<Record>, GraphError> {
        let fields = request.fields();
        let records: Vec<Record> = match request {
            Request::MatchNodes { label, project_id } => {
                Self::matching_nodes(store, label, project_id.as_deref())
                    .map(|node| Record::new(fields, vec![RecordValue::Node(node.clone())]))
                    .collect()
            }
            Request::ExpandNodes { label, project_id } => {
                Self::expand(store, label, project_id.as_deref(), fields)
            }
            Request::UpsertFile {
                path,
                project_id,
                properties,
            } => {
                let id = Self::upsert_file(store, path, project_id, properties.clone())?;
                vec![Record::new(fields, vec![id_value(&id)])]
            }
            Request::UpsertSymbol {
                kind,
                name,
                project_id,
                file_path,
                properties,
            } => {
                let (id, rel) = Self::upsert_symbol(
                    store,
                    *kind,
                    name,
                    project_id,
                    file_path,
                    properties.clone(),
                )?;
                vec![Record::new(
                    fields,
                    vec![id_value(&id), RecordValue::from(rel.map(|r| r.0))],
                )]
            }
            Request::Ping => vec![Record::new(fields, vec![RecordValue::Value(1.into())])],
            Request::CountProject { project_id } => {
                let count = store
                    .nodes()
                    .iter()
                    .filter(|node| node.property_is(PROJECT_ID, project_id))
                    .count();
                vec![Record::new(
                    fields,
                    vec![RecordValue::Integer(DriverInteger::from(count))],
                )]
            }
            Request::SeedDemo => {
                let [file, dependency, class] = Self::seed_demo(store)?;
                vec![Record::new(
                    fields,
                    vec![id_value(&file), id_value(&dependency), id_value(&class)],
                )]
            }
        };

        tracing::debug!(shape = request.name(), rows = records.len(), "executed query");
        Ok(records)
    }

    /// Nodes whose label set contains `label`, restricted to `project_id` when given.
    fn matching_nodes<'a>(
        store: &'a EntityStore,
        label: &'a str,
        project_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        store.nodes().iter().filter(move |node| {
            node.has_label(label) && project_id.is_none_or(|p| node.property_is(PROJECT_ID, p))
        })
    }

    /// One `(n, null, null)` row per matched node, followed by one
    /// `(n, r, target)` row per outgoing relationship.
    fn expand(
        store: &EntityStore,
        label: &str,
        project_id: Option<&str>,
        fields: &'static [&'static str],
    ) -> Vec<Record> {
        let mut records = Vec::new();
        for node in Self::matching_nodes(store, label, project_id) {
            records.push(Record::new(
                fields,
                vec![RecordValue::Node(node.clone()), RecordValue::Null, RecordValue::Null],
            ));
            for rel in store.outgoing(&node.id) {
                let target = store
                    .node(&rel.end_id)
                    .map_or(RecordValue::Null, |m| RecordValue::Node(m.clone()));
                records.push(Record::new(
                    fields,
                    vec![
                        RecordValue::Node(node.clone()),
                        RecordValue::Relationship(rel.clone()),
                        target,
                    ],
                ));
            }
        }
        records
    }

    fn upsert_file(
        store: &mut EntityStore,
        path: &str,
        project_id: &str,
        mut properties: Properties,
    ) -> Result<NodeId, GraphError> {
        properties.insert(PATH.to_string(), PropertyValue::from(path));
        properties.insert(PROJECT_ID.to_string(), PropertyValue::from(project_id));
        MatchingEngine::find_or_create(store, &labels([FILE_LABEL]), properties)
    }

    /// Upsert the symbol, then merge a `CONTAINS` edge from its file.
    ///
    /// The file must already exist with exactly this path and project; when it
    /// does not, the symbol is still upserted and the edge is reported as absent.
    fn upsert_symbol(
        store: &mut EntityStore,
        kind: SymbolKind,
        name: &str,
        project_id: &str,
        file_path: &str,
        mut properties: Properties,
    ) -> Result<(NodeId, Option<RelationshipId>), GraphError> {
        properties.insert(NAME.to_string(), PropertyValue::from(name));
        properties.insert(PROJECT_ID.to_string(), PropertyValue::from(project_id));
        properties.insert(FILE_PATH.to_string(), PropertyValue::from(file_path));
        let symbol = MatchingEngine::find_or_create(store, &labels([kind.label()]), properties)?;

        let file = store
            .nodes()
            .iter()
            .find(|n| {
                n.has_label(FILE_LABEL)
                    && n.property_is(PATH, file_path)
                    && n.property_is(PROJECT_ID, project_id)
            })
            .map(|n| n.id.clone());

        let Some(file) = file else {
            tracing::warn!(file_path, project_id, symbol = %symbol, "containing file not found");
            return Ok((symbol, None));
        };

        let rel =
            MatchingEngine::merge_relationship(store, &file, &symbol, CONTAINS, Properties::new());
        Ok((symbol, rel))
    }

    /// One File importing a second File and containing one Class.
    fn seed_demo(store: &mut EntityStore) -> Result<[NodeId; 3], GraphError> {
        let file_props = |path: &str| {
            Properties::from([
                (PATH.to_string(), PropertyValue::from(path)),
                (PROJECT_ID.to_string(), PropertyValue::from(DEMO_PROJECT_ID)),
                ("language".to_string(), PropertyValue::from("typescript")),
            ])
        };
        let file_labels = labels([FILE_LABEL]);

        let file =
            MatchingEngine::find_or_create(store, &file_labels, file_props(DEMO_ENTRY_PATH))?;
        let dependency =
            MatchingEngine::find_or_create(store, &file_labels, file_props(DEMO_DEPENDENCY_PATH))?;
        let class = MatchingEngine::find_or_create(
            store,
            &labels([SymbolKind::Class.label()]),
            Properties::from([
                (NAME.to_string(), PropertyValue::from(DEMO_CLASS_NAME)),
                (PROJECT_ID.to_string(), PropertyValue::from(DEMO_PROJECT_ID)),
                (FILE_PATH.to_string(), PropertyValue::from(DEMO_ENTRY_PATH)),
            ]),
        )?;

        MatchingEngine::merge_relationship(store, &file, &dependency, IMPORTS, Properties::new());
        MatchingEngine::merge_relationship(store, &file, &class, CONTAINS, Properties::new());

        Ok([file, dependency, class])
    }
}

fn id_value(id: &NodeId) -> RecordValue {
    RecordValue::Value(PropertyValue::from(id.as_str()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(store: &mut EntityStore, request: Request) -> Vec<Record> {
        QueryExecutor::execute(store, &request).expect("execute")
    }

    fn upsert_file(store: &mut EntityStore, path: &str, project: &str) -> String {
        let records = run(
            store,
            Request::UpsertFile {
                path: path.to_string(),
                project_id: project.to_string(),
                properties: Properties::new(),
            },
        );
        records[0]
            .get("id")
            .and_then(RecordValue::as_str)
            .expect("id")
            .to_string()
    }

    fn count(store: &mut EntityStore, project: &str) -> i64 {
        let records = run(
            store,
            Request::CountProject {
                project_id: project.to_string(),
            },
        );
        records[0]
            .get("count")
            .and_then(RecordValue::as_integer)
            .expect("count")
            .to_i64()
    }

    #[test]
    fn ping_returns_constant() {
        let mut store = EntityStore::new();
        let records = run(&mut store, Request::Ping);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("ok").and_then(RecordValue::as_i64), Some(1));
    }

    #[test]
    fn upsert_file_is_idempotent() {
        let mut store = EntityStore::new();
        let a = upsert_file(&mut store, "/a.ts", "p1");
        let b = upsert_file(&mut store, "/a.ts", "p1");
        let c = upsert_file(&mut store, "/a.ts", "p2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn upsert_symbol_links_file() {
        let mut store = EntityStore::new();
        let file = upsert_file(&mut store, "/a.ts", "p1");

        let records = run(
            &mut store,
            Request::UpsertSymbol {
                kind: SymbolKind::Function,
                name: "foo".to_string(),
                project_id: "p1".to_string(),
                file_path: "/a.ts".to_string(),
                properties: Properties::from([("line".to_string(), json!(3))]),
            },
        );

        let rel_id = records[0].get("relId").and_then(RecordValue::as_str).expect("relId");
        let rel = store
            .relationships()
            .iter()
            .find(|r| r.id.as_str() == rel_id)
            .expect("relationship");
        assert_eq!(rel.rel_type, CONTAINS);
        assert_eq!(rel.start_id.as_str(), file);
        assert_eq!(count(&mut store, "p1"), 2);
        assert_eq!(count(&mut store, "p2"), 0);
    }

    #[test]
    fn upsert_symbol_without_file_reports_null_relationship() {
        let mut store = EntityStore::new();
        let records = run(
            &mut store,
            Request::UpsertSymbol {
                kind: SymbolKind::Class,
                name: "Widget".to_string(),
                project_id: "p1".to_string(),
                file_path: "/missing.ts".to_string(),
                properties: Properties::new(),
            },
        );

        assert!(records[0].get("relId").is_some_and(RecordValue::is_null));
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.relationship_count(), 0);
    }

    #[test]
    fn repeated_symbol_upsert_keeps_one_contains_edge() {
        let mut store = EntityStore::new();
        upsert_file(&mut store, "/a.ts", "p1");
        let request = Request::UpsertSymbol {
            kind: SymbolKind::Function,
            name: "foo".to_string(),
            project_id: "p1".to_string(),
            file_path: "/a.ts".to_string(),
            properties: Properties::new(),
        };

        let first = run(&mut store, request.clone());
        let second = run(&mut store, request);

        assert_eq!(first, second);
        assert_eq!(store.relationship_count(), 1);
    }

    #[test]
    fn match_filters_by_label_and_project() {
        let mut store = EntityStore::new();
        upsert_file(&mut store, "/a.ts", "p1");
        upsert_file(&mut store, "/b.ts", "p2");
        run(&mut store, Request::SeedDemo);

        let all = run(
            &mut store,
            Request::MatchNodes {
                label: FILE_LABEL.to_string(),
                project_id: None,
            },
        );
        assert_eq!(all.len(), 4);

        let p1 = run(
            &mut store,
            Request::MatchNodes {
                label: FILE_LABEL.to_string(),
                project_id: Some("p1".to_string()),
            },
        );
        assert_eq!(p1.len(), 1);
        let node = p1[0].get("n").and_then(RecordValue::as_node).expect("node");
        assert!(node.property_is(PATH, "/a.ts"));
    }

    #[test]
    fn expand_yields_one_plus_k_rows() {
        let mut store = EntityStore::new();
        run(&mut store, Request::SeedDemo);

        let records = run(
            &mut store,
            Request::ExpandNodes {
                label: FILE_LABEL.to_string(),
                project_id: Some(DEMO_PROJECT_ID.to_string()),
            },
        );

        // entry file: 1 + 2 outgoing, dependency: 1 + 0
        assert_eq!(records.len(), 4);
        assert!(records[0].get("r").is_some_and(RecordValue::is_null));
        assert!(records[0].get("m").is_some_and(RecordValue::is_null));
        let rel = records[1].get("r").and_then(RecordValue::as_relationship).expect("rel");
        assert_eq!(rel.rel_type, IMPORTS);
        let target = records[1].get("m").and_then(RecordValue::as_node).expect("target");
        assert!(target.property_is(PATH, DEMO_DEPENDENCY_PATH));
    }

    #[test]
    fn seed_is_idempotent() {
        let mut store = EntityStore::new();
        let first = run(&mut store, Request::SeedDemo);
        let second = run(&mut store, Request::SeedDemo);

        assert_eq!(first, second);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.relationship_count(), 2);
    }
}
