//! # Export Graph Model
//!
//! An [`ExpData`] is one RDF subject together with its outgoing statements.
//! Values are themselves `ExpData`, so a value can carry nested statements
//! about the object, or an ordered RDF collection.
//!
//! The model is built by the caller, then only read by the serializer.
//! Property order and value order are insertion order; nothing is sorted or
//! deduplicated.

use crate::escape::is_ncname;
use crate::namespaces::{rdf_description, rdf_type};
use crate::QName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// =============================================================================
// ELEMENTS
// =============================================================================

/// A resource: a URI, optionally abbreviated by a QName, or a blank node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResourceRepr")]
pub struct ExpResource {
    #[serde(skip_serializing_if = "String::is_empty")]
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    qname: Option<QName>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    blank: bool,
}

#[derive(Deserialize)]
struct ResourceRepr {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    qname: Option<QName>,
    #[serde(default)]
    blank: bool,
}

impl TryFrom<ResourceRepr> for ExpResource {
    type Error = String;

    fn try_from(repr: ResourceRepr) -> Result<Self, Self::Error> {
        if repr.blank {
            return Ok(Self::blank());
        }
        let uri = match (repr.uri, &repr.qname) {
            (Some(uri), _) if !uri.is_empty() => uri,
            (_, Some(qname)) => qname.uri(),
            _ => return Err("resource needs a uri, a qname or blank: true".to_string()),
        };
        Ok(Self {
            uri,
            qname: repr.qname,
            blank: false,
        })
    }
}

impl ExpResource {
    /// A resource identified by a URI only.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            qname: None,
            blank: false,
        }
    }

    /// A resource identified by a QName; its URI is the expanded QName.
    #[must_use]
    pub fn named(qname: QName) -> Self {
        Self {
            uri: qname.uri(),
            qname: Some(qname),
            blank: false,
        }
    }

    /// A blank node.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            uri: String::new(),
            qname: None,
            blank: true,
        }
    }

    /// Attach a QName that abbreviates this resource.
    #[must_use]
    pub fn with_qname(mut self, qname: QName) -> Self {
        self.qname = Some(qname);
        self
    }

    /// The URI, as written in `rdf:about` and `rdf:resource`. Empty for blank nodes.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The QName, if the resource can be written as one.
    #[must_use]
    pub fn qname(&self) -> Option<&QName> {
        self.qname.as_ref()
    }

    /// Blank nodes get neither `rdf:about` nor `rdf:resource`.
    #[must_use]
    pub fn is_blank_node(&self) -> bool {
        self.blank
    }
}

/// A literal value with an optional datatype URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpLiteral {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

impl ExpLiteral {
    /// A plain literal.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
        }
    }

    /// A typed literal.
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// The lexical value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The datatype URI, if any.
    #[must_use]
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref().filter(|d| !d.is_empty())
    }
}

/// Subject or object of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpElement {
    /// A URI resource or blank node.
    Resource(ExpResource),
    /// A literal value.
    Literal(ExpLiteral),
}

impl ExpElement {
    /// The resource, unless this is a literal.
    #[must_use]
    pub fn as_resource(&self) -> Option<&ExpResource> {
        match self {
            Self::Resource(r) => Some(r),
            Self::Literal(_) => None,
        }
    }
}

impl From<ExpResource> for ExpElement {
    fn from(resource: ExpResource) -> Self {
        Self::Resource(resource)
    }
}

impl From<ExpLiteral> for ExpElement {
    fn from(literal: ExpLiteral) -> Self {
        Self::Literal(literal)
    }
}

// =============================================================================
// PROPERTY
// =============================================================================

/// A property, always expressible as a QName so it can be an element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Property {
    qname: QName,
}

impl Property {
    /// Create a property from its QName.
    #[must_use]
    pub fn new(qname: QName) -> Self {
        Self { qname }
    }

    /// The QName used as element name.
    #[must_use]
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// The property URI, which also identifies it within a node.
    #[must_use]
    pub fn uri(&self) -> String {
        self.qname.uri()
    }

    /// The property as a resource, for declarations.
    #[must_use]
    pub fn resource(&self) -> ExpResource {
        ExpResource::named(self.qname.clone())
    }

    /// Whether the objects of this property denote OWL classes.
    ///
    /// Objects of such properties get an `owl:Class` declaration.
    #[must_use]
    pub fn is_class_typed(&self) -> bool {
        let local = self.qname.local_name.as_str();
        match self.qname.prefix.as_str() {
            "rdf" => local == "type",
            "rdfs" => local == "subClassOf",
            "owl" => matches!(
                local,
                "intersectionOf"
                    | "unionOf"
                    | "equivalentClass"
                    | "complementOf"
                    | "someValuesFrom"
                    | "allValuesFrom"
                    | "onClass"
            ),
            _ => false,
        }
    }
}

/// All values of one property on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValues {
    /// The property.
    pub property: Property,
    /// The values, in insertion order.
    #[serde(default)]
    pub values: Vec<ExpData>,
}

// =============================================================================
// EXPORT DATA
// =============================================================================

/// One subject with its outgoing statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpData {
    subject: ExpElement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    main_type: Option<QName>,
    #[serde(default, with = "property_list", skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, PropertyValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collection: Option<Vec<ExpData>>,
}

/// The element name chosen for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainType {
    /// The element name.
    pub qname: QName,
    /// Position `(property index, value index)` of the `rdf:type` value
    /// that became the element name and must not be written again.
    pub consumed: Option<(usize, usize)>,
}

impl ExpData {
    /// A node without statements.
    #[must_use]
    pub fn new(subject: impl Into<ExpElement>) -> Self {
        Self {
            subject: subject.into(),
            main_type: None,
            properties: IndexMap::new(),
            collection: None,
        }
    }

    /// A blank value holding an ordered RDF collection.
    #[must_use]
    pub fn collection_of(members: Vec<ExpData>) -> Self {
        Self {
            collection: Some(members),
            ..Self::new(ExpResource::blank())
        }
    }

    /// Use `qname` as element name instead of extracting one from `rdf:type`.
    #[must_use]
    pub fn with_main_type(mut self, qname: QName) -> Self {
        self.main_type = Some(qname);
        self
    }

    /// Append a value for `property`, keeping insertion order.
    pub fn add_property_value(&mut self, property: Property, value: ExpData) {
        self.properties
            .entry(property.uri())
            .or_insert_with(|| PropertyValues {
                property,
                values: Vec::new(),
            })
            .values
            .push(value);
    }

    /// Builder form of [`ExpData::add_property_value`].
    #[must_use]
    pub fn with_value(mut self, property: Property, value: impl Into<ExpData>) -> Self {
        self.add_property_value(property, value.into());
        self
    }

    /// The subject of the statements.
    #[must_use]
    pub fn subject(&self) -> &ExpElement {
        &self.subject
    }

    /// Whether the node has at least one statement.
    #[must_use]
    pub fn has_properties(&self) -> bool {
        self.properties.values().any(|p| !p.values.is_empty())
    }

    /// The collection members, if this value is an RDF collection.
    #[must_use]
    pub fn collection(&self) -> Option<&[ExpData]> {
        self.collection.as_deref()
    }

    /// The values of `rdf:type`.
    #[must_use]
    pub fn rdf_types(&self) -> &[ExpData] {
        self.rdf_type_entry()
            .map(|(_, p)| p.values.as_slice())
            .unwrap_or_default()
    }

    fn rdf_type_entry(&self) -> Option<(usize, &PropertyValues)> {
        self.properties
            .values()
            .enumerate()
            .find(|(_, p)| p.property.qname().is("rdf", "type"))
    }

    /// Choose the element name of this node.
    ///
    /// An explicit main type wins. Otherwise the first `rdf:type` value that
    /// is a plain named resource is used (and consumed); failing that the
    /// node is an `rdf:Description`.
    #[must_use]
    pub fn main_type(&self) -> MainType {
        if let Some(qname) = &self.main_type {
            return MainType {
                qname: qname.clone(),
                consumed: None,
            };
        }

        if let Some((property_index, entry)) = self.rdf_type_entry() {
            for (value_index, value) in entry.values.iter().enumerate() {
                if value.has_properties() || value.collection.is_some() {
                    continue;
                }
                let Some(resource) = value.subject.as_resource() else {
                    continue;
                };
                if resource.is_blank_node() {
                    continue;
                }
                if let Some(qname) = resource.qname() {
                    if is_ncname(&qname.prefix) && is_ncname(&qname.local_name) {
                        return MainType {
                            qname: qname.clone(),
                            consumed: Some((property_index, value_index)),
                        };
                    }
                }
            }
        }

        MainType {
            qname: rdf_description(),
            consumed: None,
        }
    }

    /// The statements left to write once `main_type` has been chosen.
    ///
    /// Properties whose values were all consumed are dropped.
    #[must_use]
    pub fn statements(&self, main_type: &MainType) -> Vec<(&Property, Vec<&ExpData>)> {
        self.properties
            .values()
            .enumerate()
            .filter_map(|(pi, entry)| {
                let values: Vec<&ExpData> = entry
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(vi, _)| main_type.consumed != Some((pi, *vi)))
                    .map(|(_, v)| v)
                    .collect();
                (!values.is_empty()).then_some((&entry.property, values))
            })
            .collect()
    }

    /// Add an `rdf:type` statement.
    #[must_use]
    pub fn with_type(self, class: ExpResource) -> Self {
        self.with_value(rdf_type(), class)
    }
}

impl From<ExpResource> for ExpData {
    fn from(resource: ExpResource) -> Self {
        Self::new(resource)
    }
}

impl From<ExpLiteral> for ExpData {
    fn from(literal: ExpLiteral) -> Self {
        Self::new(literal)
    }
}

/// A batch of top-level nodes, the input format of the CLI and HTTP API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Top-level nodes, serialized in order.
    pub nodes: Vec<ExpData>,
}

/// Properties are written as a list of `{property, values}` entries.
/// Repeated entries for the same property are merged on input.
mod property_list {
    use super::PropertyValues;
    use indexmap::IndexMap;
    use indexmap::map::Entry;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &IndexMap<String, PropertyValues>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, PropertyValues>, D::Error> {
        let entries = Vec::<PropertyValues>::deserialize(deserializer)?;
        let mut map: IndexMap<String, PropertyValues> = IndexMap::with_capacity(entries.len());
        for entry in entries {
            match map.entry(entry.property.uri()) {
                Entry::Occupied(mut existing) => existing.get_mut().values.extend(entry.values),
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }
        Ok(map)
    }
}

// =============================================================================
// TESTS
// =============================================================================
