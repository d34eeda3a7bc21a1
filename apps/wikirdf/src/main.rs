//! # wikirdf - RDF/XML Export
//!
//! The binary for the wikirdf serializer.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │             apps/wikirdf (THE BINARY)          │
//! │                                               │
//! │   ┌─────────────┐          ┌─────────────┐    │
//! │   │    CLI      │          │  HTTP API   │    │
//! │   │   (clap)    │          │   (axum)    │    │
//! │   └──────┬──────┘          └──────┬──────┘    │
//! │          └────────────┬───────────┘           │
//! │                       ▼                       │
//! │               ┌───────────────┐               │
//! │               │ wikirdf-core  │               │
//! │               │ (THE LOGIC)   │               │
//! │               └───────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serialize a JSON graph to RDF/XML
//! wikirdf export -i graph.json -o graph.rdf
//!
//! # Start the HTTP server
//! wikirdf server --host 0.0.0.0 --port 8080
//!
//! # Inspect the entity table
//! wikirdf namespaces
//! wikirdf expand '&wiki;Main_Page'
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikirdf::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // WIKIRDF_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("WIKIRDF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wikirdf=info,wikirdf_core=info,tower_http=debug".into());

    // Logs go to stderr; stdout may carry the exported document.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && matches!(cli.command, Some(cli::Commands::Server { .. })) {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  wikirdf v{}

  Wiki graphs as RDF/XML
"#,
        env!("CARGO_PKG_VERSION")
    );
}
