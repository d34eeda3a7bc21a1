//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use wikirdf_core::{ExpData, ExportError, UriExpander, primitives::MAX_EXPORT_NODES};

/// Maximum length of a text accepted by `/expand`.
pub const MAX_EXPAND_LENGTH: usize = 4096;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// NAMESPACES RESPONSE
// =============================================================================

/// One DOCTYPE entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityJson {
    pub name: String,
    pub uri: String,
}

/// The entities written into every document prolog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespacesResponse {
    pub entities: Vec<EntityJson>,
}

impl NamespacesResponse {
    /// List the prolog entities of `expander`.
    #[must_use]
    pub fn from_expander(expander: &UriExpander) -> Self {
        Self {
            entities: expander
                .prolog_entities()
                .map(|(name, uri)| EntityJson {
                    name: name.to_string(),
                    uri: uri.to_string(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// EXPAND REQUEST/RESPONSE
// =============================================================================

/// Expand `&name;` references in a text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandRequest {
    pub text: String,
}

impl ExpandRequest {
    /// Check the request size.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.text.len() > MAX_EXPAND_LENGTH {
            return Err(ExportError::DeserializationError(format!(
                "Text length {} exceeds maximum {} bytes",
                self.text.len(),
                MAX_EXPAND_LENGTH
            )));
        }
        Ok(())
    }
}

/// Result of an expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandResponse {
    pub success: bool,
    pub uri: Option<String>,
    pub error: Option<String>,
}

impl ExpandResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(uri: String) -> Self {
        Self {
            success: true,
            uri: Some(uri),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            uri: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EXPORT REQUEST / ERROR RESPONSE
// =============================================================================

/// Serialize a batch of top-level nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub nodes: Vec<ExpData>,
    /// Nodes between two flushes; the server configuration applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_every: Option<usize>,
}

impl ExportRequest {
    /// Check the request bounds and resolve the flush interval.
    pub fn validate(&self, default_flush_every: usize) -> Result<usize, ExportError> {
        if self.nodes.len() > MAX_EXPORT_NODES {
            return Err(ExportError::DeserializationError(format!(
                "Node count {} exceeds maximum {}",
                self.nodes.len(),
                MAX_EXPORT_NODES
            )));
        }
        match self.flush_every {
            Some(0) => Err(ExportError::ConfigError(
                "flush_every must be greater than zero".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(default_flush_every),
        }
    }
}

/// Error body of a failed export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    /// Create an error response.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
