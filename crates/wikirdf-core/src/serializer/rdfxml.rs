//! # RDF/XML Backend
//!
//! Writes export data as RDF/XML with abbreviated URIs:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE rdf:RDF[
//!     <!ENTITY wiki 'http://example.org/id/'>
//!     ...
//! ]>
//!
//! <rdf:RDF
//!     xmlns:rdf="&rdf;"
//!     ...>
//!
//!     <wiki:City rdf:about="&wiki;Berlin">
//!         <property:Population rdf:datatype="...">3500000</property:Population>
//!     </wiki:City>
//!     <owl:DatatypeProperty rdf:about="&property;Population" />
//!     <!-- Created by wikirdf -->
//! </rdf:RDF>
//! ```
//!
//! One walk per top-level node. Namespaces found during the walk are
//! spliced into the open block afterwards; declarations are queued and
//! written between top-level elements.

use super::{NamespaceScope, Serializer, SerializerCore};
use crate::config::ExportConfig;
use crate::escape::{
    check_comment, checked_qname, entity_references, entity_value_string, escape_attribute,
    escape_text, is_ncname,
};
use crate::namespaces::{ROOT_NAMESPACES, UriExpander};
use crate::primitives::{DEFAULT_GENERATOR, MAX_NESTING_DEPTH};
use crate::{DeclarationKind, ExpData, ExpElement, ExportError, Property};

/// Serializer producing RDF/XML.
#[derive(Debug)]
pub struct RdfXmlSerializer {
    core: SerializerCore,
    expander: UriExpander,
    generator: String,
}

impl Default for RdfXmlSerializer {
    fn default() -> Self {
        Self {
            core: SerializerCore::new(),
            expander: UriExpander::default(),
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl RdfXmlSerializer {
    /// Create a serializer for the given entity table and credit comment.
    ///
    /// # Errors
    ///
    /// `ConfigError` if `generator` cannot be written inside an XML comment.
    pub fn new(expander: UriExpander, generator: impl Into<String>) -> Result<Self, ExportError> {
        let generator = generator.into();
        check_comment(&generator)?;
        Ok(Self {
            core: SerializerCore::new(),
            expander,
            generator,
        })
    }

    /// Create a serializer from a configuration.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        Self::new(UriExpander::new(&config.namespaces), config.generator.clone())
    }

    /// The entity table used for the prolog.
    #[must_use]
    pub fn expander(&self) -> &UriExpander {
        &self.expander
    }

    /// Escape a URI attribute value. Every entity it references must be
    /// declared in the DOCTYPE.
    fn uri_attribute(&self, value: &str) -> Result<String, ExportError> {
        if let Some(name) = entity_references(value).find(|name| !self.expander.in_prolog(name)) {
            return Err(ExportError::UnknownEntity(name.to_string()));
        }
        Ok(escape_attribute(value)?.into_owned())
    }

    /// Mark the subject of `data` as declared for every OWL kind it is
    /// explicitly typed with.
    fn record_declaration_types(&mut self, data: &ExpData) {
        let ExpElement::Resource(subject) = data.subject() else {
            return;
        };
        if subject.is_blank_node() {
            return;
        }
        for value in data.rdf_types() {
            let Some(kind) = value
                .subject()
                .as_resource()
                .and_then(|r| r.qname())
                .filter(|q| q.prefix == "owl")
                .and_then(|q| DeclarationKind::from_owl_type(&q.local_name))
            else {
                continue;
            };
            self.core.declarations_mut().mark_declared(subject.uri(), kind);
        }
    }

    /// Queue a class declaration for the subject of `value`.
    fn require_class(&mut self, value: &ExpData) {
        if let Some(resource) = value.subject().as_resource() {
            self.core
                .declarations_mut()
                .require(resource, DeclarationKind::Class);
        }
    }

    /// Write one node at `depth` (0 for top-level nodes).
    fn serialize_nested(&mut self, data: &ExpData, depth: usize) -> Result<(), ExportError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ExportError::DepthExceeded(depth, MAX_NESTING_DEPTH));
        }
        self.record_declaration_types(data);

        let indent = "\t\t".repeat(depth);
        let main_type = data.main_type();
        let type_name = checked_qname(&main_type.qname)?;
        let start = format!("\t{}<{}", indent, type_name);
        if self.core.buffer().is_open() {
            self.core.buffer_mut().append(&start);
        } else {
            self.core.buffer_mut().open_block(&start)?;
        }
        self.core
            .require_namespace(&main_type.qname.prefix, &main_type.qname.namespace);

        match data.subject() {
            ExpElement::Resource(resource) if resource.is_blank_node() => {}
            ExpElement::Resource(resource) => {
                let about = format!(" rdf:about=\"{}\"", self.uri_attribute(resource.uri())?);
                self.core.buffer_mut().append(&about);
            }
            ExpElement::Literal(literal) => {
                tracing::warn!(
                    event = "literal_subject",
                    value = literal.value(),
                    "literal used as subject; writing its value as rdf:about"
                );
                let value = escape_text(literal.value())?.replace('"', "&quot;");
                self.core
                    .buffer_mut()
                    .append(&format!(" rdf:about=\"{}\"", value));
            }
        }

        let statements = data.statements(&main_type);
        if statements.is_empty() {
            self.core.buffer_mut().append(" />\n");
            return Ok(());
        }
        self.core.buffer_mut().append(">\n");

        for (property, values) in statements {
            self.serialize_statements(property, &values, &indent, depth)?;
        }

        self.core
            .buffer_mut()
            .append(&format!("\t{}</{}>\n", indent, type_name));
        Ok(())
    }

    /// Write all values of one property of a node.
    fn serialize_statements(
        &mut self,
        property: &Property,
        values: &[&ExpData],
        indent: &str,
        depth: usize,
    ) -> Result<(), ExportError> {
        let name = checked_qname(property.qname())?;
        let class_typed = property.is_class_typed();
        let mut declaration_queued = false;

        for value in values {
            self.core
                .buffer_mut()
                .append(&format!("\t\t{}<{}", indent, name));
            self.core
                .require_namespace(&property.qname().prefix, &property.qname().namespace);

            let kind = match value.subject() {
                ExpElement::Literal(literal) => {
                    let mut text = String::new();
                    if let Some(datatype) = literal.datatype() {
                        let datatype = self.uri_attribute(datatype)?;
                        text.push_str(&format!(" rdf:datatype=\"{}\"", datatype));
                    }
                    text.push_str(&format!(
                        ">{}</{}>\n",
                        escape_text(literal.value())?,
                        name
                    ));
                    self.core.buffer_mut().append(&text);
                    DeclarationKind::DatatypeProperty
                }
                ExpElement::Resource(object) => {
                    if let Some(members) = value.collection() {
                        self.core
                            .buffer_mut()
                            .append(" rdf:parseType=\"Collection\">\n");
                        for member in members {
                            self.serialize_nested(member, depth + 1)?;
                            if class_typed {
                                self.require_class(member);
                            }
                        }
                        self.core
                            .buffer_mut()
                            .append(&format!("\t\t{}</{}>\n", indent, name));
                    } else {
                        if class_typed {
                            self.core
                                .declarations_mut()
                                .require(object, DeclarationKind::Class);
                        }
                        if value.has_properties() {
                            self.core.buffer_mut().append(">\n");
                            self.serialize_nested(value, depth + 1)?;
                            self.core
                                .buffer_mut()
                                .append(&format!("\t\t{}</{}>\n", indent, name));
                        } else if object.is_blank_node() {
                            self.core.buffer_mut().append("/>\n");
                        } else {
                            let resource = self.uri_attribute(object.uri())?;
                            self.core
                                .buffer_mut()
                                .append(&format!(" rdf:resource=\"{}\"/>\n", resource));
                        }
                    }
                    DeclarationKind::ObjectProperty
                }
            };

            if !declaration_queued {
                self.core
                    .declarations_mut()
                    .require(&property.resource(), kind);
                declaration_queued = true;
            }
        }
        Ok(())
    }
}

impl Serializer for RdfXmlSerializer {
    fn core(&self) -> &SerializerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SerializerCore {
        &mut self.core
    }

    fn serialize_header(&mut self) -> Result<(), ExportError> {
        let mut head = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE rdf:RDF[\n");
        for (name, uri) in self.expander.prolog_entities() {
            head.push_str(&format!("\t<!ENTITY {} {}>\n", name, entity_value_string(uri)?));
        }
        head.push_str("]>\n\n<rdf:RDF");
        for prefix in ROOT_NAMESPACES {
            head.push_str(&format!("\n\txmlns:{}=\"&{};\"", prefix, prefix));
        }

        self.core.open_shared_scope(ROOT_NAMESPACES)?;
        self.core.buffer_mut().open_block(&head)?;
        self.core.buffer_mut().append(">\n\n");
        Ok(())
    }

    fn serialize_footer(&mut self) -> Result<(), ExportError> {
        let footer = format!("\t<!-- {} -->\n</rdf:RDF>", self.generator);
        self.core.buffer_mut().append(&footer);
        Ok(())
    }

    fn serialize_declaration(&mut self, uri: &str, type_name: &str) -> Result<(), ExportError> {
        let line = format!("\t<{} rdf:about=\"{}\" />\n", type_name, self.uri_attribute(uri)?);
        self.core.buffer_mut().append(&line);
        Ok(())
    }

    fn serialize_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), ExportError> {
        if !is_ncname(prefix) {
            return Err(ExportError::InvalidName(prefix.to_string()));
        }
        let value = self.uri_attribute(uri)?;
        let attribute = match self.core.scope() {
            NamespaceScope::Shared => {
                self.core.register_global_namespace(prefix);
                format!("\n\txmlns:{}=\"{}\"", prefix, value)
            }
            NamespaceScope::Scoped => format!(" xmlns:{}=\"{}\"", prefix, value),
        };
        self.core.buffer_mut().splice(&attribute)
    }

    fn serialize_exp_data(&mut self, data: &ExpData) -> Result<(), ExportError> {
        self.core.ensure_started()?;
        let result = self
            .serialize_nested(data, 0)
            .and_then(|()| self.serialize_namespaces());
        if let Err(e) = result {
            tracing::debug!(event = "serialization_failed", error = %e);
            self.abort();
            return Err(e);
        }
        if self.core.scope() == NamespaceScope::Scoped {
            self.core.buffer_mut().close_block();
        }
        Ok(())
    }
}
