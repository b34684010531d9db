//! # Scenario Tests (S0-S3)
//!
//! End-to-end behaviour through the public session API.
//!
//! ## Tiers
//! - S0: Identity and Merge
//! - S1: Relationships and Counting
//! - S2: Pattern Queries
//! - S3: Durability and Failure Isolation

use embergraph_core::{
    EntityStore, GraphError, MatchingEngine, NodeId, Params, Properties, QueryResult, RecordValue,
    Request, Session, labels,
};
use serde_json::json;
use tempfile::TempDir;

fn params(value: serde_json::Value) -> Params {
    serde_json::from_value(value).expect("params")
}

fn first_str(result: &QueryResult, field: &str) -> String {
    result
        .first()
        .and_then(|r| r.get(field))
        .and_then(RecordValue::as_str)
        .expect("string field")
        .to_string()
}

fn count(session: &mut Session, project: &str) -> i64 {
    let result = session
        .run(
            "MATCH (n {projectId: $projectId}) RETURN count(n) AS count",
            &params(json!({ "projectId": project })),
        )
        .expect("count");
    result
        .first()
        .and_then(|r| r.get("count"))
        .and_then(RecordValue::as_i64)
        .expect("count value")
}

fn upsert_file(session: &mut Session, path: &str, project: &str) -> String {
    let result = session
        .run(
            "MERGE (f:File {path: $path, projectId: $projectId}) SET f += $properties RETURN f.id AS id",
            &params(json!({ "path": path, "projectId": project, "properties": {} })),
        )
        .expect("upsert file");
    first_str(&result, "id")
}

// =============================================================================
// TIER S0: IDENTITY AND MERGE
// =============================================================================

mod s0_identity_and_merge {
    use super::*;

    /// S0.1: Two sequential upserts of the same file yield one identity.
    #[test]
    fn same_file_twice_same_identity() {
        let mut store = EntityStore::new();
        let file = labels(["File"]);
        let props = Properties::from([("path".to_string(), json!("/a.ts"))]);

        let first =
            MatchingEngine::find_or_create(&mut store, &file, props.clone()).expect("first");
        let second = MatchingEngine::find_or_create(&mut store, &file, props).expect("second");

        assert_eq!(first, second);
        assert_eq!(store.node_count(), 1);
    }

    /// S0.2: Identifiers are canonical lowercase UUIDs.
    #[test]
    fn identifiers_are_uuids() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");

        let id = upsert_file(&mut session, "/a.ts", "p1");

        assert_eq!(id.len(), 36);
        assert_eq!(id, id.to_lowercase());
        assert_eq!(id.matches('-').count(), 4);
    }

    /// S0.3: Upserting with a property superset merges, newer values winning.
    #[test]
    fn superset_upsert_merges() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        let template =
            "MERGE (f:File {path: $path, projectId: $projectId}) SET f += $properties RETURN f.id AS id";

        let first = session
            .run(
                template,
                &params(json!({
                    "path": "/a.ts",
                    "projectId": "p1",
                    "properties": { "lines": 10 }
                })),
            )
            .expect("first");
        let second = session
            .run(
                template,
                &params(json!({
                    "path": "/a.ts",
                    "projectId": "p1",
                    "properties": { "lines": 20, "language": "ts" }
                })),
            )
            .expect("second");

        let id = first_str(&first, "id");
        assert_eq!(id, first_str(&second, "id"));
        let node = session.node(&NodeId::new(id)).expect("node");
        assert_eq!(node.property("lines"), Some(&json!(20)));
        assert_eq!(node.property("language"), Some(&json!("ts")));
    }
}

// =============================================================================
// TIER S1: RELATIONSHIPS AND COUNTING
// =============================================================================

mod s1_relationships_and_counting {
    use super::*;

    /// S1.1: File + contained Function count as two nodes in their project only.
    #[test]
    fn project_count_scenario() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");

        upsert_file(&mut session, "/a.ts", "p1");
        let result = session
            .run(
                "MATCH (f:File {path: $filePath, projectId: $projectId}) \
                 MERGE (s:Function {name: $name, projectId: $projectId}) \
                 SET s += $properties \
                 MERGE (f)-[r:CONTAINS]->(s) RETURN s.id AS id, r.id AS relId",
                &params(json!({
                    "filePath": "/a.ts",
                    "name": "foo",
                    "projectId": "p1",
                    "properties": {}
                })),
            )
            .expect("upsert symbol");

        assert!(result.first().and_then(|r| r.get("relId")).is_some_and(|v| !v.is_null()));
        assert_eq!(count(&mut session, "p1"), 2);
        assert_eq!(count(&mut session, "p2"), 0);
    }

    /// S1.2: A relationship to a missing node is not created and changes nothing.
    #[test]
    fn missing_endpoint_does_not_mutate() {
        let mut store = EntityStore::new();
        let a = MatchingEngine::find_or_create(
            &mut store,
            &labels(["File"]),
            Properties::from([("path".to_string(), json!("/a.ts"))]),
        )
        .expect("a");
        let before_nodes = store.nodes().to_vec();

        let rel = MatchingEngine::create_relationship(
            &mut store,
            &NodeId::new("ghost"),
            &a,
            "IMPORTS",
            Properties::new(),
        );

        assert!(rel.is_none());
        assert_eq!(store.nodes(), before_nodes.as_slice());
        assert_eq!(store.relationship_count(), 0);
    }

    /// S1.3: Counts come back as driver integers.
    #[test]
    fn count_is_driver_integer() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        upsert_file(&mut session, "/a.ts", "p1");

        let result = session
            .run(
                "MATCH (n {projectId: $projectId}) RETURN count(n) AS count",
                &params(json!({ "projectId": "p1" })),
            )
            .expect("count");
        let value =
            serde_json::to_value(result.first().and_then(|r| r.get("count"))).expect("json");

        assert_eq!(value, json!({ "low": 1, "high": 0 }));
    }
}

// =============================================================================
// TIER S2: PATTERN QUERIES
// =============================================================================

mod s2_pattern_queries {
    use super::*;

    /// S2.1: Label match returns exactly the matching nodes.
    #[test]
    fn match_returns_exact_set() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        let a = upsert_file(&mut session, "/a.ts", "p1");
        let b = upsert_file(&mut session, "/b.ts", "p1");
        upsert_file(&mut session, "/c.ts", "p2");

        let result = session
            .run(
                "MATCH (n:File) WHERE n.projectId = $projectId RETURN n",
                &params(json!({ "projectId": "p1" })),
            )
            .expect("match");

        let ids: Vec<String> = result
            .records
            .iter()
            .filter_map(|r| r.get("n").and_then(RecordValue::as_node))
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    /// S2.2: Expansion yields one bare row plus one row per outgoing edge.
    #[test]
    fn expansion_rows() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        session.execute(&Request::SeedDemo).expect("seed");

        let result = session
            .run(
                "MATCH (n:File) WHERE n.projectId = $projectId \
                 OPTIONAL MATCH (n)-[r]->(m) RETURN n, r, m",
                &params(json!({ "projectId": "demo" })),
            )
            .expect("expand");

        // index.ts has two outgoing edges, util.ts none
        assert_eq!(result.len(), 4);
        let nulls = result
            .records
            .iter()
            .filter(|r| r.get("r").is_some_and(RecordValue::is_null))
            .count();
        assert_eq!(nulls, 2);
        assert!(result.records.iter().all(|r| r.keys() == ["n", "r", "m"]));
    }

    /// S2.3: Ping answers the constant 1.
    #[test]
    fn ping() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");

        let result = session.run("RETURN 1 AS ok", &Params::new()).expect("ping");
        assert_eq!(
            result.first().and_then(|r| r.get("ok")).and_then(RecordValue::as_i64),
            Some(1)
        );
    }
}

// =============================================================================
// TIER S3: DURABILITY AND FAILURE ISOLATION
// =============================================================================

mod s3_durability {
    use super::*;

    /// S3.1: State written in one session is visible after reopening.
    #[test]
    fn reload_after_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let (nodes, relationships) = {
            let mut session = Session::open(dir.path()).expect("open");
            session.execute(&Request::SeedDemo).expect("seed");
            (
                session.store().nodes().to_vec(),
                session.store().relationships().to_vec(),
            )
        };

        let session = Session::open(dir.path()).expect("reopen");
        assert_eq!(session.store().nodes(), nodes.as_slice());
        assert_eq!(session.store().relationships(), relationships.as_slice());
    }

    /// S3.2: An unrecognized template leaves memory and files untouched.
    #[test]
    fn unrecognized_template_is_isolated() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        upsert_file(&mut session, "/a.ts", "p1");
        let nodes_file = dir.path().join("nodes.json");
        let before = std::fs::read(&nodes_file).expect("read");

        let result = session.run("MATCH (a)-[*1..3]->(b) RETURN b", &Params::new());

        assert!(matches!(result, Err(GraphError::UnrecognizedQuery(_))));
        assert_eq!(session.store().node_count(), 1);
        assert_eq!(std::fs::read(&nodes_file).expect("read"), before);
    }

    /// S3.3: A corrupt data file falls back to an empty store.
    #[test]
    fn corrupt_file_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        {
            let mut session = Session::open(dir.path()).expect("open");
            upsert_file(&mut session, "/a.ts", "p1");
        }
        std::fs::write(dir.path().join("nodes.json"), b"garbage").expect("corrupt");

        let session = Session::open(dir.path()).expect("reopen");
        assert!(session.store().is_empty());
    }

    /// S3.4: A failed flush reaches the caller after the in-memory change is applied.
    #[test]
    fn flush_failure_is_reported_after_mutation() {
        let dir = TempDir::new().expect("tempdir");
        let mut session = Session::open(dir.path()).expect("open");
        // a directory where the nodes file should be makes the write fail
        std::fs::create_dir(dir.path().join("nodes.json")).expect("block nodes file");

        let result = session.execute(&Request::UpsertFile {
            path: "/a.ts".to_string(),
            project_id: "p1".to_string(),
            properties: Properties::new(),
        });

        assert!(matches!(result, Err(GraphError::IoError(_))));
        assert_eq!(session.store().node_count(), 1);
    }
}
