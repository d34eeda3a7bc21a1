//! # wikirdf-core
//!
//! Streaming RDF/XML serializer for wiki export graphs.
//!
//! The caller builds [`ExpData`] nodes (a subject with ordered statements)
//! and feeds them one at a time to a [`Serializer`]. The serializer writes
//! each node in a single walk and keeps the text buffered until it is
//! flushed, so a document of any size can be streamed in chunks.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - Single pass: namespaces discovered during a walk are spliced into the
//!   still-open start tag of the current block
//! - Flushed bytes are never rewritten; after the first flush every
//!   top-level element carries its own namespace declarations
//! - OWL declarations for classes and properties are deferred and written
//!   between top-level elements, once per document
//!
//! ## Example
//!
//! ```
//! use wikirdf_core::{ExpData, ExpLiteral, Serializer, RdfXmlSerializer, UriExpander};
//!
//! let expander = UriExpander::default();
//! let subject = expander.ns_resource("wiki", "Foo")?;
//! let property = expander.property("property", "Bar")?;
//! let data = ExpData::new(subject).with_value(property, ExpLiteral::new("5"));
//!
//! let mut serializer = RdfXmlSerializer::default();
//! serializer.start_serialization()?;
//! serializer.serialize_exp_data(&data)?;
//! serializer.finish_serialization()?;
//! let text = serializer.flush_content()?;
//!
//! assert!(text.contains("<property:Bar>5</property:Bar>"));
//! assert!(text.contains("<owl:DatatypeProperty rdf:about=\"&property;Bar\" />"));
//! # Ok::<(), wikirdf_core::ExportError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod declarations;
pub mod escape;
pub mod expdata;
pub mod namespaces;
pub mod primitives;
pub mod serializer;
pub mod stream;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{DeclarationKind, ExportError, Namespace, QName};

// =============================================================================
// RE-EXPORTS: Export Graph and Serializer
// =============================================================================

pub use config::{ExportConfig, NamespaceConfig};
pub use declarations::{DeclarationQueue, DeclarationRequest};
pub use expdata::{
    ExpData, ExpElement, ExpLiteral, ExpResource, ExportDocument, MainType, Property,
    PropertyValues,
};
pub use namespaces::UriExpander;
pub use serializer::buffer::{BlockState, EmissionBuffer, SplicePoint};
pub use serializer::rdfxml::RdfXmlSerializer;
pub use serializer::{NamespaceScope, Serializer, SerializerCore, SerializerStatus};
pub use stream::{ExportStats, ExportStream, to_rdfxml};
