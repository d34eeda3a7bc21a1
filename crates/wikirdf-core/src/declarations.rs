//! # Declaration Queue
//!
//! OWL consumers expect every class and property used in a document to be
//! declared, e.g. `<owl:DatatypeProperty rdf:about="&property;Bar" />`.
//! Those declarations cannot be written while an element is open, so the
//! serializer only records them here and drains the queue between
//! top-level elements.
//!
//! Requests are keyed by URI. Kinds requested for one URI are combined, and
//! a kind that was already written (or asserted by the data itself) is never
//! requested again within the same document.

use crate::namespaces::BUILTIN_PREFIXES;
use crate::{DeclarationKind, ExpResource};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// One declaration to be written: `<kind rdf:about="uri" />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRequest {
    /// URI of the declared resource.
    pub uri: String,
    /// What it is declared as.
    pub kind: DeclarationKind,
}

/// Ordered, deduplicated set of pending declarations.
#[derive(Debug, Clone, Default)]
pub struct DeclarationQueue {
    /// Pending kinds per URI, in order of first request.
    pending: IndexMap<String, BTreeSet<DeclarationKind>>,
    /// Kinds already written or asserted, per URI.
    done: BTreeMap<String, BTreeSet<DeclarationKind>>,
}

impl DeclarationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a declaration for `resource`.
    ///
    /// Blank nodes and terms of the RDF, RDFS and OWL vocabularies are never
    /// declared. Returns `true` if a new pending entry was added.
    pub fn require(&mut self, resource: &ExpResource, kind: DeclarationKind) -> bool {
        if resource.is_blank_node() || resource.uri().is_empty() {
            return false;
        }
        if let Some(qname) = resource.qname() {
            if BUILTIN_PREFIXES.contains(&qname.prefix.as_str()) {
                return false;
            }
        }
        self.require_uri(resource.uri(), kind)
    }

    /// Request a declaration for a raw URI.
    pub fn require_uri(&mut self, uri: &str, kind: DeclarationKind) -> bool {
        if self.is_declared(uri, kind) {
            return false;
        }
        self.pending.entry(uri.to_string()).or_default().insert(kind)
    }

    /// Record that `uri` is already declared as `kind`, e.g. because the
    /// data contains `rdf:type owl:Class` for it.
    pub fn mark_declared(&mut self, uri: &str, kind: DeclarationKind) {
        self.done.entry(uri.to_string()).or_default().insert(kind);
        if let Some(kinds) = self.pending.get_mut(uri) {
            kinds.remove(&kind);
        }
    }

    /// Whether `uri` was already declared as `kind` in this document.
    #[must_use]
    pub fn is_declared(&self, uri: &str, kind: DeclarationKind) -> bool {
        self.done.get(uri).is_some_and(|kinds| kinds.contains(&kind))
    }

    /// Take all pending declarations in request order.
    ///
    /// Taken declarations count as written from now on.
    pub fn drain(&mut self) -> Vec<DeclarationRequest> {
        let mut out = Vec::new();
        for (uri, kinds) in self.pending.drain(..) {
            for kind in kinds {
                self.done.entry(uri.clone()).or_default().insert(kind);
                out.push(DeclarationRequest {
                    uri: uri.clone(),
                    kind,
                });
            }
        }
        out
    }

    /// Number of pending declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.values().map(BTreeSet::len).sum()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything, pending and done.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.done.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QName;

    fn res(prefix: &str, local: &str) -> ExpResource {
        ExpResource::named(QName::new(prefix, format!("&{prefix};"), local))
    }

    #[test]
    fn drain_in_request_order() {
        let mut queue = DeclarationQueue::new();
        queue.require(&res("property", "B"), DeclarationKind::DatatypeProperty);
        queue.require(&res("wiki", "City"), DeclarationKind::Class);
        queue.require(&res("property", "A"), DeclarationKind::ObjectProperty);

        let uris: Vec<_> = queue.drain().into_iter().map(|d| d.uri).collect();
        assert_eq!(uris, vec!["&property;B", "&wiki;City", "&property;A"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicate_requests_collapse() {
        let mut queue = DeclarationQueue::new();
        assert!(queue.require(&res("wiki", "City"), DeclarationKind::Class));
        assert!(!queue.require(&res("wiki", "City"), DeclarationKind::Class));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn kinds_combine_per_uri() {
        let mut queue = DeclarationQueue::new();
        queue.require(&res("wiki", "X"), DeclarationKind::ObjectProperty);
        queue.require(&res("wiki", "Y"), DeclarationKind::Class);
        queue.require(&res("wiki", "X"), DeclarationKind::Class);

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                DeclarationRequest {
                    uri: "&wiki;X".to_string(),
                    kind: DeclarationKind::Class
                },
                DeclarationRequest {
                    uri: "&wiki;X".to_string(),
                    kind: DeclarationKind::ObjectProperty
                },
                DeclarationRequest {
                    uri: "&wiki;Y".to_string(),
                    kind: DeclarationKind::Class
                },
            ]
        );
    }

    #[test]
    fn drained_declarations_are_not_repeated() {
        let mut queue = DeclarationQueue::new();
        queue.require(&res("property", "A"), DeclarationKind::DatatypeProperty);
        assert_eq!(queue.drain().len(), 1);

        assert!(!queue.require(&res("property", "A"), DeclarationKind::DatatypeProperty));
        assert!(queue.require(&res("property", "A"), DeclarationKind::ObjectProperty));
    }

    #[test]
    fn builtin_vocabularies_and_blank_nodes_skipped() {
        let mut queue = DeclarationQueue::new();
        assert!(!queue.require(&res("owl", "Thing"), DeclarationKind::Class));
        assert!(!queue.require(&res("rdfs", "label"), DeclarationKind::DatatypeProperty));
        assert!(!queue.require(&res("rdf", "type"), DeclarationKind::ObjectProperty));
        assert!(!queue.require(&ExpResource::blank(), DeclarationKind::Class));
        assert!(queue.is_empty());
    }

    #[test]
    fn mark_declared_cancels_pending() {
        let mut queue = DeclarationQueue::new();
        queue.require(&res("wiki", "City"), DeclarationKind::Class);
        queue.mark_declared("&wiki;City", DeclarationKind::Class);
        assert!(queue.drain().is_empty());
        assert!(queue.is_declared("&wiki;City", DeclarationKind::Class));
    }

    #[test]
    fn clear_forgets_done() {
        let mut queue = DeclarationQueue::new();
        queue.require(&res("wiki", "City"), DeclarationKind::Class);
        queue.drain();
        queue.clear();
        assert!(queue.require(&res("wiki", "City"), DeclarationKind::Class));
    }
}
