//! # Embergraph CLI Module
//!
//! This module implements the CLI interface for Embergraph.
//!
//! ## Available Commands
//!
//! - `init` - Create the data directory and empty collections
//! - `status` - Show store status
//! - `ping` - Run the connectivity check query
//! - `seed` - Populate the demo project
//! - `nodes` - List nodes by label, optionally with their outgoing edges
//! - `count` - Count nodes in a project
//! - `upsert-file` - Upsert a File node
//! - `upsert-symbol` - Upsert a Function or Class and link it to its File
//! - `show` - Show one node by id
//! - `run` - Run a raw query template with JSON parameters
//! - `exec` - Run a JSON-encoded request

mod commands;

use crate::config::{DATA_DIR_ENV, load_config, resolve_data_dir};
use clap::{Parser, Subcommand};
use embergraph_core::{GraphError, SymbolKind};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Embergraph - embedded code-structure graph store
///
/// Stores files, functions, classes and their relationships, and answers a
/// fixed set of lookup and upsert queries against them.
#[derive(Parser, Debug)]
#[command(name = "embergraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding nodes.json and relationships.json
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the config file (default: ./embergraph.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and empty collection files
    Init,

    /// Show store status
    Status,

    /// Run the connectivity check query
    Ping,

    /// Populate the demo project (idempotent)
    Seed,

    /// List nodes carrying a label
    Nodes {
        /// Label to match
        #[arg(short, long, default_value = "File")]
        label: String,

        /// Restrict to one project
        #[arg(short, long)]
        project: Option<String>,

        /// Include each node's outgoing relationships
        #[arg(short, long)]
        expand: bool,
    },

    /// Count nodes belonging to a project
    Count {
        /// Project identifier
        #[arg(short, long)]
        project: String,
    },

    /// Upsert a File node
    UpsertFile {
        /// File path
        #[arg(long)]
        path: String,

        /// Project identifier
        #[arg(short, long)]
        project: String,

        /// Extra properties as a JSON object
        #[arg(long)]
        props: Option<String>,
    },

    /// Upsert a Function or Class and link it from its File
    UpsertSymbol {
        /// Symbol kind (function, class)
        #[arg(short, long)]
        kind: SymbolKind,

        /// Symbol name
        #[arg(short, long)]
        name: String,

        /// Project identifier
        #[arg(short, long)]
        project: String,

        /// Path of the containing File
        #[arg(short, long)]
        file: String,

        /// Extra properties as a JSON object
        #[arg(long)]
        props: Option<String>,
    },

    /// Show one node by id
    Show {
        /// Node identifier
        #[arg(long)]
        id: String,
    },

    /// Run a raw query template
    Run {
        /// Query template text
        template: String,

        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },

    /// Run a JSON-encoded request, e.g. '{"shape": "ping"}'
    Exec {
        /// Request as JSON
        request: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GraphError> {
    let config = load_config(cli.config.as_deref())?;
    let data_dir = resolve_data_dir(
        cli.data_dir.as_deref(),
        std::env::var(DATA_DIR_ENV).ok(),
        config.as_ref(),
    );
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init) => cmd_init(&data_dir, json_mode),
        Some(Commands::Status) => cmd_status(&data_dir, json_mode),
        Some(Commands::Ping) => cmd_ping(&data_dir, json_mode),
        Some(Commands::Seed) => cmd_seed(&data_dir, json_mode),
        Some(Commands::Nodes {
            label,
            project,
            expand,
        }) => cmd_nodes(&data_dir, json_mode, label, project, expand),
        Some(Commands::Count { project }) => cmd_count(&data_dir, json_mode, project),
        Some(Commands::UpsertFile {
            path,
            project,
            props,
        }) => cmd_upsert_file(&data_dir, json_mode, path, project, props.as_deref()),
        Some(Commands::UpsertSymbol {
            kind,
            name,
            project,
            file,
            props,
        }) => cmd_upsert_symbol(
            &data_dir,
            json_mode,
            kind,
            name,
            project,
            file,
            props.as_deref(),
        ),
        Some(Commands::Show { id }) => cmd_show(&data_dir, json_mode, &id),
        Some(Commands::Run { template, params }) => {
            cmd_run(&data_dir, json_mode, &template, params.as_deref())
        }
        Some(Commands::Exec { request }) => cmd_exec(&data_dir, json_mode, &request),
        None => {
            // No subcommand - show status by default
            cmd_status(&data_dir, json_mode)
        }
    }
}
