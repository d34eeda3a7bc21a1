//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the serializer:
//! - Namespace bindings and qualified names (`Namespace`, `QName`)
//! - Declaration kinds for deferred OWL declarations (`DeclarationKind`)
//! - Error types (`ExportError`)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// NAMESPACE BINDING
// =============================================================================

/// A `(prefix, URI)` pair as written in an `xmlns:prefix="uri"` attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// The short prefix (e.g. `property`).
    pub prefix: String,
    /// The namespace URI, possibly written as an entity reference (e.g. `&property;`).
    pub uri: String,
}

impl Namespace {
    /// Create a new namespace binding.
    #[must_use]
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

// =============================================================================
// QUALIFIED NAME
// =============================================================================

/// A qualified name `prefix:localName`, bound to the namespace URI it abbreviates.
///
/// The full URI of the named resource is `namespace + local_name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Namespace prefix used in element and attribute names.
    pub prefix: String,
    /// Namespace URI the prefix stands for.
    pub namespace: String,
    /// Local part of the name.
    pub local_name: String,
}

impl QName {
    /// Create a new qualified name.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// The URI this name abbreviates.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", self.namespace, self.local_name)
    }

    /// Check whether this name is `prefix:local_name`.
    #[must_use]
    pub fn is(&self, prefix: &str, local_name: &str) -> bool {
        self.prefix == prefix && self.local_name == local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local_name)
    }
}

// =============================================================================
// DECLARATION KIND
// =============================================================================

/// What a deferred declaration asserts about a URI.
///
/// The derived order is the order in which kinds for one URI are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// `owl:Class`
    Class,
    /// `owl:ObjectProperty`
    ObjectProperty,
    /// `owl:DatatypeProperty`
    DatatypeProperty,
}

impl DeclarationKind {
    /// The element name of the declaration statement.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Class => "owl:Class",
            Self::ObjectProperty => "owl:ObjectProperty",
            Self::DatatypeProperty => "owl:DatatypeProperty",
        }
    }

    /// Map an `rdf:type` value in the `owl` vocabulary back to a kind.
    #[must_use]
    pub fn from_owl_type(local_name: &str) -> Option<Self> {
        match local_name {
            "Class" => Some(Self::Class),
            "ObjectProperty" => Some(Self::ObjectProperty),
            "DatatypeProperty" => Some(Self::DatatypeProperty),
            _ => None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while producing an export document.
///
/// Every error is deterministic for a given input graph; nothing here is
/// transient, so callers should never retry.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A `&name;` short reference that the expander does not know.
    #[error("Unknown entity reference: &{0};")]
    UnknownEntity(String),

    /// A name that cannot be used as an XML element or attribute name.
    #[error("Invalid XML name: {0:?}")]
    InvalidName(String),

    /// A character outside the XML 1.0 `Char` production.
    #[error("Character {0:?} is not allowed in XML")]
    InvalidCharacter(char),

    /// The graph nests deeper than the serializer is willing to recurse.
    #[error("Nesting depth {0} exceeds maximum {1}")]
    DepthExceeded(usize, usize),

    /// An operation was called in the wrong serializer state.
    #[error("Invalid serializer state: {0}")]
    InvalidState(String),

    /// The export configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
