//! # URI and Namespace Expansion
//!
//! Exported URIs are written in abbreviated form, e.g. `&wiki;Main_Page`,
//! where `&wiki;` is an entity declared in the DOCTYPE of the document.
//! [`UriExpander`] owns the fixed set of such entities and converts between
//! the abbreviated and the full form.
//!
//! The `wiki` namespace doubles as the fallback for names that cannot be
//! written as a QName in their own namespace: its local part may always start
//! with an underscore or a letter taken from the rest of the namespace URI.

use crate::config::NamespaceConfig;
use crate::escape::is_ncname;
use crate::{ExpResource, ExportError, Property, QName};

// =============================================================================
// WELL-KNOWN VOCABULARIES
// =============================================================================

/// RDF syntax namespace.
pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// RDF Schema namespace.
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// OWL namespace.
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";

/// Semantic wiki vocabulary namespace.
pub const SWIVT_NAMESPACE: &str = "http://semantic-mediawiki.org/swivt/1.0#";

/// Prefixes declared with `xmlns:` on the root element, in output order.
pub const ROOT_NAMESPACES: [&str; 6] = ["rdf", "rdfs", "owl", "swivt", "wiki", "property"];

/// Vocabularies whose resources are language constructs and never get declared.
pub const BUILTIN_PREFIXES: [&str; 3] = ["rdf", "rdfs", "owl"];

// =============================================================================
// VOCABULARY TERMS
// =============================================================================

/// The `rdf:type` property.
#[must_use]
pub fn rdf_type() -> Property {
    Property::new(QName::new("rdf", "&rdf;", "type"))
}

/// `rdf:Description`, the element name of untyped nodes.
#[must_use]
pub fn rdf_description() -> QName {
    QName::new("rdf", "&rdf;", "Description")
}

/// A term of the `rdfs` vocabulary, e.g. `rdfs:label`.
#[must_use]
pub fn rdfs_term(local: &str) -> QName {
    QName::new("rdfs", "&rdfs;", local)
}

/// A term of the `owl` vocabulary, e.g. `owl:Class`.
#[must_use]
pub fn owl_term(local: &str) -> QName {
    QName::new("owl", "&owl;", local)
}


// =============================================================================
// ENTITY TABLE
// =============================================================================

/// One `&name;` entity known to the expander.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entity {
    name: &'static str,
    uri: String,
    /// Written into the DOCTYPE of every document.
    in_prolog: bool,
}

/// Maps `&name;` short references to full URIs and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriExpander {
    entities: Vec<Entity>,
}

impl Default for UriExpander {
    fn default() -> Self {
        Self::new(&NamespaceConfig::default())
    }
}

impl UriExpander {
    /// Build the entity table from the wiki's namespace configuration.
    #[must_use]
    pub fn new(config: &NamespaceConfig) -> Self {
        let entity = |name, uri: &str, in_prolog| Entity {
            name,
            uri: uri.to_string(),
            in_prolog,
        };
        Self {
            entities: vec![
                entity("rdf", RDF_NAMESPACE, true),
                entity("rdfs", RDFS_NAMESPACE, true),
                entity("owl", OWL_NAMESPACE, true),
                entity("swivt", SWIVT_NAMESPACE, true),
                entity("wiki", &config.wiki, true),
                entity("property", &config.property_base(), true),
                entity("wikiurl", &config.wikiurl, true),
                entity("category", &config.category_base(), false),
                entity("export", &config.export_url(), false),
            ],
        }
    }

    /// Full URI of a single entity, by name.
    pub fn entity_uri(&self, name: &str) -> Result<&str, ExportError> {
        self.entities
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.uri.as_str())
            .ok_or_else(|| ExportError::UnknownEntity(name.to_string()))
    }

    /// Whether `name` is declared in the DOCTYPE of every document.
    #[must_use]
    pub fn in_prolog(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e.in_prolog && e.name == name)
    }

    /// Entities written into the DOCTYPE, in declaration order.
    pub fn prolog_entities(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entities
            .iter()
            .filter(|e| e.in_prolog)
            .map(|e| (e.name, e.uri.as_str()))
    }

    /// Replace every `&name;` reference in `text` with its full URI.
    ///
    /// An ampersand that does not start a `&name;` reference is copied
    /// unchanged. A reference to an unknown entity is an error: the entity
    /// set is fixed, so such a reference can only come from a bug upstream.
    pub fn expand(&self, text: &str) -> Result<String, ExportError> {
        let mut out = String::with_capacity(text.len() + 32);
        let mut rest = text;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let tail = &rest[amp..];
            match tail.find(';') {
                Some(end) if is_ncname(&tail[1..end]) => {
                    out.push_str(self.entity_uri(&tail[1..end])?);
                    rest = &tail[end + 1..];
                }
                _ => {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Rewrite a full URI to use the longest matching prolog entity.
    ///
    /// URIs outside every known namespace are returned unchanged.
    #[must_use]
    pub fn abbreviate(&self, uri: &str) -> String {
        self.entities
            .iter()
            .filter(|e| e.in_prolog && !e.uri.is_empty() && uri.starts_with(&e.uri))
            .max_by_key(|e| e.uri.len())
            .map(|e| format!("&{};{}", e.name, &uri[e.uri.len()..]))
            .unwrap_or_else(|| uri.to_string())
    }

    /// Build a resource `prefix:local` in one of the known namespaces.
    ///
    /// The resource URI is written as `&prefix;local`. Entities missing from
    /// the DOCTYPE (`category`, `export`) never appear in the output: their
    /// QName namespace is the full base URI and the resource URI is
    /// abbreviated against the prolog entities instead.
    ///
    /// If `local` is not a legal NCName the QName falls back to the `wiki`
    /// namespace when the namespace lies under it (`property:9` becomes
    /// `wiki:Property-3A9`); otherwise the resource carries no QName at all.
    pub fn ns_resource(&self, prefix: &str, local: &str) -> Result<ExpResource, ExportError> {
        let base = self.entity_uri(prefix)?;
        let (namespace, uri) = if self.in_prolog(prefix) {
            let namespace = format!("&{};", prefix);
            let uri = format!("{}{}", namespace, local);
            (namespace, uri)
        } else {
            (base.to_string(), self.abbreviate(&format!("{}{}", base, local)))
        };
        if is_ncname(local) {
            return Ok(ExpResource::new(uri).with_qname(QName::new(prefix, namespace, local)));
        }

        let wiki = self.entity_uri("wiki")?;
        if let Some(rest) = base.strip_prefix(wiki) {
            let fallback = format!("{}{}", rest, local);
            if is_ncname(&fallback) {
                return Ok(ExpResource::new(uri).with_qname(QName::new("wiki", "&wiki;", fallback)));
            }
        }
        Ok(ExpResource::new(uri))
    }

    /// Build a property `prefix:local`, which must be expressible as a QName.
    pub fn property(&self, prefix: &str, local: &str) -> Result<Property, ExportError> {
        let resource = self.ns_resource(prefix, local)?;
        resource
            .qname()
            .cloned()
            .map(Property::new)
            .ok_or_else(|| ExportError::InvalidName(format!("{}:{}", prefix, local)))
    }
}
