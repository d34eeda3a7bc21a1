//! # Export Configuration
//!
//! The namespace base URIs of the wiki and the streaming parameters are
//! caller-owned data, loaded from TOML:
//!
//! ```toml
//! flush_every = 50
//! generator = "Created by wikirdf"
//!
//! [namespaces]
//! wiki = "https://wiki.example.org/id/"
//! wikiurl = "https://wiki.example.org/wiki/"
//! ```
//!
//! Omitted `property` and `category` bases are derived from `wiki`.

use crate::ExportError;
use crate::escape::{check_chars, check_comment};
use crate::primitives::{DEFAULT_FLUSH_EVERY, DEFAULT_GENERATOR};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default base URI for wiki entities.
pub const DEFAULT_WIKI_BASE: &str = "http://localhost/wiki/Special:URIResolver/";

/// Default base URL for wiki articles.
pub const DEFAULT_WIKIURL_BASE: &str = "http://localhost/wiki/";

/// Maximum size of a configuration file.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// NAMESPACE CONFIGURATION
// =============================================================================

/// Base URIs of the wiki-specific namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Base URI of wiki entities (`&wiki;`).
    pub wiki: String,
    /// Base URL of wiki articles (`&wikiurl;`).
    pub wikiurl: String,
    /// Base URI of properties (`&property;`). Defaults to `wiki` + `Property-3A`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Base URI of categories (`&category;`). Defaults to `wiki` + `Category-3A`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// URL of the export service (`&export;`). Defaults to `wikiurl` + `Special:ExportRDF`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            wiki: DEFAULT_WIKI_BASE.to_string(),
            wikiurl: DEFAULT_WIKIURL_BASE.to_string(),
            property: None,
            category: None,
            export: None,
        }
    }
}

impl NamespaceConfig {
    /// Effective base URI of properties.
    #[must_use]
    pub fn property_base(&self) -> String {
        self.property
            .clone()
            .unwrap_or_else(|| format!("{}Property-3A", self.wiki))
    }

    /// Effective base URI of categories.
    #[must_use]
    pub fn category_base(&self) -> String {
        self.category
            .clone()
            .unwrap_or_else(|| format!("{}Category-3A", self.wiki))
    }

    /// Effective URL of the export service.
    #[must_use]
    pub fn export_url(&self) -> String {
        self.export
            .clone()
            .unwrap_or_else(|| format!("{}Special:ExportRDF", self.wikiurl))
    }
}

// =============================================================================
// EXPORT CONFIGURATION
// =============================================================================

/// Complete configuration of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Namespace base URIs.
    pub namespaces: NamespaceConfig,
    /// Top-level nodes between two flushes of a stream.
    pub flush_every: usize,
    /// Text of the trailing credit comment.
    pub generator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            namespaces: NamespaceConfig::default(),
            flush_every: DEFAULT_FLUSH_EVERY,
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl ExportConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ExportError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ExportError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            ExportError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ExportError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExportError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants the serializer relies on.
    pub fn validate(&self) -> Result<(), ExportError> {
        let ns = &self.namespaces;
        let bases = [
            ("wiki", Some(ns.wiki.as_str())),
            ("wikiurl", Some(ns.wikiurl.as_str())),
            ("property", ns.property.as_deref()),
            ("category", ns.category.as_deref()),
            ("export", ns.export.as_deref()),
        ];
        for (name, value) in bases {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ExportError::ConfigError(format!(
                        "Namespace '{}' must not be empty",
                        name
                    )));
                }
                if value.contains(['"', '<', '>']) || check_chars(value).is_err() {
                    return Err(ExportError::ConfigError(format!(
                        "Namespace '{}' contains characters not allowed in a URI",
                        name
                    )));
                }
            }
        }

        if self.flush_every == 0 {
            return Err(ExportError::ConfigError(
                "flush_every must be greater than zero".to_string(),
            ));
        }

        check_comment(&self.generator).map_err(|e| match e {
            ExportError::InvalidCharacter(ch) => {
                ExportError::ConfigError(format!("generator contains {:?}", ch))
            }
            other => other,
        })
    }
}
