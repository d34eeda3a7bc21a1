//! # Streaming Export
//!
//! [`ExportStream`] drives a serializer over a sequence of top-level nodes
//! and hands the produced text to an `io::Write` sink in chunks.
//!
//! Every `flush_every` nodes the stream drains pending declarations (the
//! space between two top-level elements is the only place they can go) and
//! flushes. The first flush also ends the shared namespace scope, so from
//! then on each top-level element declares its own non-base namespaces.

use crate::namespaces::UriExpander;
use crate::serializer::Serializer;
use crate::serializer::rdfxml::RdfXmlSerializer;
use crate::{ExpData, ExportError};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Counters of a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    /// Top-level nodes serialized.
    pub nodes: usize,
    /// Non-empty chunks written to the sink.
    pub flushes: usize,
    /// Bytes written to the sink.
    pub bytes: usize,
}

/// A document being streamed to a sink.
#[derive(Debug)]
pub struct ExportStream<W: Write, S: Serializer> {
    sink: W,
    serializer: S,
    flush_every: usize,
    since_flush: usize,
    stats: ExportStats,
}

impl<W: Write, S: Serializer> ExportStream<W, S> {
    /// Create a stream. A `flush_every` of zero is treated as one.
    pub fn new(sink: W, serializer: S, flush_every: usize) -> Self {
        Self {
            sink,
            serializer,
            flush_every: flush_every.max(1),
            since_flush: 0,
            stats: ExportStats::default(),
        }
    }

    /// Begin the document.
    pub fn start(&mut self) -> Result<(), ExportError> {
        self.stats = ExportStats::default();
        self.since_flush = 0;
        self.serializer.start_serialization()
    }

    /// Serialize one top-level node, flushing periodically.
    pub fn write(&mut self, node: &ExpData) -> Result<(), ExportError> {
        self.serializer.serialize_exp_data(node)?;
        self.stats.nodes += 1;
        self.since_flush += 1;
        if self.since_flush >= self.flush_every {
            self.serializer.serialize_declarations()?;
            self.flush()?;
        }
        Ok(())
    }

    /// Send all buffered text to the sink.
    pub fn flush(&mut self) -> Result<(), ExportError> {
        let chunk = self.serializer.flush_content()?;
        self.since_flush = 0;
        if chunk.is_empty() {
            return Ok(());
        }
        self.sink.write_all(chunk.as_bytes())?;
        self.stats.flushes += 1;
        self.stats.bytes += chunk.len();
        tracing::debug!(
            event = "chunk_written",
            bytes = chunk.len(),
            nodes = self.stats.nodes
        );
        Ok(())
    }

    /// Write the rest of the document and return the sink.
    pub fn finish(mut self) -> Result<(W, ExportStats), ExportError> {
        self.serializer.finish_serialization()?;
        self.flush()?;
        self.sink.flush()?;
        tracing::info!(
            event = "export_finished",
            nodes = self.stats.nodes,
            flushes = self.stats.flushes,
            bytes = self.stats.bytes
        );
        Ok((self.sink, self.stats))
    }

    /// Counters so far.
    pub fn stats(&self) -> ExportStats {
        self.stats
    }
}

/// Serialize `nodes` into one RDF/XML document in a single pass.
pub fn to_rdfxml(
    nodes: &[ExpData],
    expander: &UriExpander,
    generator: &str,
) -> Result<String, ExportError> {
    let serializer = RdfXmlSerializer::new(expander.clone(), generator)?;
    let mut stream = ExportStream::new(Vec::new(), serializer, usize::MAX);
    stream.start()?;
    for node in nodes {
        stream.write(node)?;
    }
    let (bytes, _) = stream.finish()?;
    String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))
}
