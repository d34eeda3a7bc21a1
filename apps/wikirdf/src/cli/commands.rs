//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use wikirdf_core::{
    ExportConfig, ExportDocument, ExportError, ExportStats, ExportStream, RdfXmlSerializer,
    UriExpander, primitives::MAX_EXPORT_NODES,
};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Maximum size of an input graph document (100 MB).
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ExportError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ExportError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ExportError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path and check that it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ExportError> {
    let canonical = path.canonicalize().map_err(|e| {
        ExportError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ExportError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path; its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, ExportError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ExportError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ExportError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ExportError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: ExportConfig, host: &str, port: u16) -> Result<(), ExportError> {
    println!("wikirdf Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", host);
    println!("  Port:        {}", port);
    println!("  Wiki:        {}", config.namespaces.wiki);
    println!("  Flush every: {}", config.flush_every);
    println!();
    println!("Endpoints:");
    println!("  POST /export     - Serialize nodes as RDF/XML");
    println!("  POST /expand     - Expand entity references");
    println!("  GET  /namespaces - List DOCTYPE entities");
    println!("  GET  /health     - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, config).await
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Read a graph document from `input`.
pub fn read_document(input: &Path) -> Result<ExportDocument, ExportError> {
    let path = validate_file_path(input)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ExportError::IoError(format!("Cannot read file: {}", e)))?;
    let document: ExportDocument = serde_json::from_str(&content)
        .map_err(|e| ExportError::DeserializationError(format!("Invalid graph JSON: {}", e)))?;

    if document.nodes.len() > MAX_EXPORT_NODES {
        return Err(ExportError::DeserializationError(format!(
            "Node count {} exceeds maximum {}",
            document.nodes.len(),
            MAX_EXPORT_NODES
        )));
    }
    Ok(document)
}

/// Stream `document` into `sink`.
pub fn export_to<W: Write>(
    sink: W,
    config: &ExportConfig,
    document: &ExportDocument,
    flush_every: usize,
) -> Result<(W, ExportStats), ExportError> {
    let serializer = RdfXmlSerializer::from_config(config)?;
    let mut stream = ExportStream::new(sink, serializer, flush_every);
    stream.start()?;
    for node in &document.nodes {
        stream.write(node)?;
    }
    stream.finish()
}

/// Serialize a JSON graph document to RDF/XML.
pub fn cmd_export(
    config: &ExportConfig,
    input: &Path,
    output: Option<&Path>,
    flush_every: Option<usize>,
    json_mode: bool,
) -> Result<(), ExportError> {
    let flush_every = match flush_every {
        Some(0) => {
            return Err(ExportError::ConfigError(
                "flush_every must be greater than zero".to_string(),
            ));
        }
        Some(n) => n,
        None => config.flush_every,
    };
    let document = read_document(input)?;
    tracing::info!(
        event = "export_started",
        nodes = document.nodes.len(),
        flush_every
    );

    let Some(output) = output else {
        let stdout = std::io::stdout();
        export_to(stdout.lock(), config, &document, flush_every)?;
        return Ok(());
    };

    let path = validate_output_path(output)?;
    let file = std::fs::File::create(&path)
        .map_err(|e| ExportError::IoError(format!("Cannot create file: {}", e)))?;
    let (_, stats) = export_to(BufWriter::new(file), config, &document, flush_every)?;

    if json_mode {
        let out = serde_json::json!({
            "output": path.to_string_lossy(),
            "nodes": stats.nodes,
            "flushes": stats.flushes,
            "bytes": stats.bytes
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!(
            "Exported {} nodes ({} bytes) to {}",
            stats.nodes,
            stats.bytes,
            path.display()
        );
    }
    Ok(())
}

// =============================================================================
// EXPAND COMMAND
// =============================================================================

/// Expand `&name;` references in `text`.
pub fn cmd_expand(config: &ExportConfig, text: &str, json_mode: bool) -> Result<(), ExportError> {
    let expander = UriExpander::new(&config.namespaces);
    let uri = expander.expand(text)?;

    if json_mode {
        let out = serde_json::json!({ "text": text, "uri": uri });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!("{}", uri);
    }
    Ok(())
}

// =============================================================================
// NAMESPACES COMMAND
// =============================================================================

/// List the DOCTYPE entities of the configured wiki.
pub fn cmd_namespaces(config: &ExportConfig, json_mode: bool) -> Result<(), ExportError> {
    let expander = UriExpander::new(&config.namespaces);

    if json_mode {
        let out = api::NamespacesResponse::from_expander(&expander);
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!("DOCTYPE Entities");
    println!("================");
    for (name, uri) in expander.prolog_entities() {
        println!("  &{:<10} {}", format!("{};", name), uri);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
