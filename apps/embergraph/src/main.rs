//! # Embergraph
//!
//! The binary for the embedded code-structure graph store.
//!
//! ## Usage
//!
//! ```bash
//! # Create the data directory and empty collections
//! embergraph init
//!
//! # Populate the demo project and look at it
//! embergraph seed
//! embergraph nodes -l File -p demo --expand
//!
//! # Run a raw query template
//! embergraph run 'MATCH (n {projectId: $projectId}) RETURN count(n) AS count' \
//!     --params '{"projectId": "demo"}'
//! ```

use clap::Parser;
use embergraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the log subscriber. EMBERGRAPH_LOG_FORMAT=json enables
/// machine-parseable output. Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("EMBERGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "embergraph=debug,embergraph_core=debug"
    } else {
        "embergraph=info,embergraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
