//! # wikirdf CLI Module
//!
//! ## Available Commands
//!
//! - `export` - Serialize a JSON graph document to RDF/XML
//! - `expand` - Expand `&name;` entity references
//! - `namespaces` - List the DOCTYPE entities (default)
//! - `server` - Start the HTTP server

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wikirdf_core::{ExportConfig, ExportError};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// wikirdf - serialize wiki export graphs as RDF/XML
#[derive(Parser, Debug)]
#[command(name = "wikirdf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML export configuration
    #[arg(short = 'c', long, global = true, env = "WIKIRDF_CONFIG")]
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
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Serialize a JSON graph document to RDF/XML
    Export {
        /// Input JSON file (`{"nodes": [...]}`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Top-level nodes between two flushes (overrides the configuration)
        #[arg(short, long)]
        flush_every: Option<usize>,
    },

    /// Expand `&name;` references to full URIs
    Expand {
        /// Text to expand
        text: String,
    },

    /// List the DOCTYPE entities
    Namespaces,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Load the configuration named on the command line, or the defaults.
pub fn load_config(path: Option<&std::path::Path>) -> Result<ExportConfig, ExportError> {
    match path {
        Some(path) => {
            let config = ExportConfig::from_file(path)?;
            tracing::debug!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        None => Ok(ExportConfig::default()),
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ExportError> {
    let config = load_config(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, &host, port).await,
        Some(Commands::Export {
            input,
            output,
            flush_every,
        }) => cmd_export(&config, &input, output.as_deref(), flush_every, json_mode),
        Some(Commands::Expand { text }) => cmd_expand(&config, &text, json_mode),
        Some(Commands::Namespaces) | None => cmd_namespaces(&config, json_mode),
    }
}
