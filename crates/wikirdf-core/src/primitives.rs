//! # Export Primitives
//!
//! Fixed limits and defaults of the serializer. These are compiled into the
//! binary; the tunable parts live in [`crate::config::ExportConfig`].

/// Maximum nesting depth of export data.
///
/// Each nested value or collection member adds one level. The serializer
/// recurses per level, so this bounds stack usage on hostile input.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Default number of top-level nodes between two flushes of a stream.
pub const DEFAULT_FLUSH_EVERY: usize = 50;

/// Maximum number of top-level nodes accepted in one export document.
///
/// Documents larger than this are rejected at the application boundary.
pub const MAX_EXPORT_NODES: usize = 10_000;

/// Default text of the trailing credit comment.
pub const DEFAULT_GENERATOR: &str = "Created by wikirdf";
