//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands. Each
//! command opens its own session on the data directory, runs one or more
//! requests, prints the result and closes the session.

use embergraph_core::{
    GraphError, NodeId, Params, Properties, QueryResult, Request, Session, SymbolKind,
};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create the data directory and write both collection files.
pub fn cmd_init(data_dir: &Path, json_mode: bool) -> Result<(), GraphError> {
    let mut session = Session::open(data_dir)?;
    // any successful query flushes, which writes both files
    session.execute(&Request::Ping)?;
    session.close();

    if json_mode {
        print_json(&serde_json::json!({
            "data_dir": data_dir.to_string_lossy(),
            "nodes": session.store().node_count(),
            "relationships": session.store().relationship_count(),
        }));
        return Ok(());
    }

    println!("Initialized data directory at {}", data_dir.display());
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(data_dir: &Path, json_mode: bool) -> Result<(), GraphError> {
    let session = Session::open(data_dir)?;
    let store = session.store();

    let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
    for node in store.nodes() {
        for label in &node.labels {
            *labels.entry(label.as_str()).or_default() += 1;
        }
    }

    if json_mode {
        print_json(&serde_json::json!({
            "data_dir": data_dir.to_string_lossy(),
            "node_count": store.node_count(),
            "relationship_count": store.relationship_count(),
            "labels": labels,
        }));
        return Ok(());
    }

    println!("Embergraph Store Status");
    println!("=======================");
    println!("Data dir:      {}", data_dir.display());
    println!();
    println!("Nodes:         {}", store.node_count());
    println!("Relationships: {}", store.relationship_count());
    for (label, count) in &labels {
        println!("  {:<12} {}", label, count);
    }

    Ok(())
}

// =============================================================================
// QUERY COMMANDS
// =============================================================================

/// Run the connectivity check.
pub fn cmd_ping(data_dir: &Path, json_mode: bool) -> Result<(), GraphError> {
    run_request(data_dir, json_mode, &Request::Ping)
}

/// Populate the demo project.
pub fn cmd_seed(data_dir: &Path, json_mode: bool) -> Result<(), GraphError> {
    run_request(data_dir, json_mode, &Request::SeedDemo)
}

/// List nodes by label, optionally expanded with outgoing relationships.
pub fn cmd_nodes(
    data_dir: &Path,
    json_mode: bool,
    label: String,
    project: Option<String>,
    expand: bool,
) -> Result<(), GraphError> {
    let request = if expand {
        Request::ExpandNodes {
            label,
            project_id: project,
        }
    } else {
        Request::MatchNodes {
            label,
            project_id: project,
        }
    };
    run_request(data_dir, json_mode, &request)
}

/// Count nodes in a project.
pub fn cmd_count(data_dir: &Path, json_mode: bool, project: String) -> Result<(), GraphError> {
    run_request(
        data_dir,
        json_mode,
        &Request::CountProject {
            project_id: project,
        },
    )
}

/// Upsert a File node.
pub fn cmd_upsert_file(
    data_dir: &Path,
    json_mode: bool,
    path: String,
    project: String,
    props: Option<&str>,
) -> Result<(), GraphError> {
    let request = Request::UpsertFile {
        path,
        project_id: project,
        properties: parse_object(props, "props")?,
    };
    run_request(data_dir, json_mode, &request)
}

/// Upsert a symbol and link it from its File.
pub fn cmd_upsert_symbol(
    data_dir: &Path,
    json_mode: bool,
    kind: SymbolKind,
    name: String,
    project: String,
    file: String,
    props: Option<&str>,
) -> Result<(), GraphError> {
    let request = Request::UpsertSymbol {
        kind,
        name,
        project_id: project,
        file_path: file,
        properties: parse_object(props, "props")?,
    };
    run_request(data_dir, json_mode, &request)
}

/// Show a single node.
pub fn cmd_show(data_dir: &Path, json_mode: bool, id: &str) -> Result<(), GraphError> {
    let session = Session::open(data_dir)?;
    let node = session.node(&NodeId::new(id))?;

    if json_mode {
        print_json(node);
        return Ok(());
    }

    let labels: Vec<&str> = node.labels.iter().map(String::as_str).collect();
    println!("Node {}", node.id);
    println!("Labels: {}", labels.join(", "));
    for (key, value) in &node.properties {
        println!("  {} = {}", key, value);
    }
    for rel in session.store().outgoing(&node.id) {
        println!("  -[{}]-> {}", rel.rel_type, rel.end_id);
    }

    Ok(())
}

/// Run a raw query template.
pub fn cmd_run(
    data_dir: &Path,
    json_mode: bool,
    template: &str,
    params: Option<&str>,
) -> Result<(), GraphError> {
    let params: Params = parse_object(params, "params")?;
    let mut session = Session::open(data_dir)?;
    let result = session.run(template, &params)?;
    session.close();
    print_result(&result, json_mode);
    Ok(())
}

/// Run a JSON-encoded request.
pub fn cmd_exec(data_dir: &Path, json_mode: bool, request: &str) -> Result<(), GraphError> {
    let request: Request = serde_json::from_str(request)
        .map_err(|e| GraphError::DeserializationError(format!("Invalid request: {}", e)))?;
    run_request(data_dir, json_mode, &request)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn run_request(data_dir: &Path, json_mode: bool, request: &Request) -> Result<(), GraphError> {
    let mut session = Session::open(data_dir)?;
    let result = session.execute(request)?;
    session.close();
    print_result(&result, json_mode);
    Ok(())
}

/// Parse an optional JSON object argument. Absent means empty.
pub fn parse_object(raw: Option<&str>, name: &str) -> Result<Properties, GraphError> {
    let Some(raw) = raw else {
        return Ok(Properties::new());
    };
    serde_json::from_str(raw).map_err(|_| GraphError::InvalidParameter {
        name: name.to_string(),
        expected: "a JSON object",
    })
}

fn print_result(result: &QueryResult, json_mode: bool) {
    if json_mode {
        print_json(result);
        return;
    }

    if result.is_empty() {
        println!("(no records)");
        return;
    }
    for (i, record) in result.records.iter().enumerate() {
        let fields: Vec<String> = record
            .keys()
            .iter()
            .zip(record.values())
            .map(|(key, value)| {
                let value = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
                format!("{}={}", key, value)
            })
            .collect();
        println!("{:>4}  {}", i + 1, fields.join("  "));
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// TESTS
// =============================================================================
