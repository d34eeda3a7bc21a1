//! Shared helpers for the integration tests.
//!
//! Documents are re-read with quick-xml; the tag stack, the namespace
//! scopes and the DOCTYPE entities are tracked here, since quick-xml checks
//! none of them.

#![allow(dead_code)]

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use wikirdf_core::{ExpResource, NamespaceConfig, Property, QName, RdfXmlSerializer, UriExpander};

// =============================================================================
// BUILDERS
// =============================================================================

pub fn config() -> NamespaceConfig {
    NamespaceConfig {
        wiki: "http://example.org/id/".to_string(),
        wikiurl: "http://example.org/wiki/".to_string(),
        ..NamespaceConfig::default()
    }
}

pub fn expander() -> UriExpander {
    UriExpander::new(&config())
}

pub fn serializer() -> RdfXmlSerializer {
    RdfXmlSerializer::new(expander(), "Created by wikirdf").expect("serializer")
}

pub fn wiki(local: &str) -> ExpResource {
    ExpResource::named(QName::new("wiki", "&wiki;", local))
}

pub fn prop(local: &str) -> Property {
    Property::new(QName::new("property", "&property;", local))
}

pub fn foaf(local: &str) -> Property {
    Property::new(QName::new("foaf", "http://xmlns.com/foaf/0.1/", local))
}

// =============================================================================
// DOCUMENT CHECKS
// =============================================================================

struct OpenElement {
    name: String,
    declared: Vec<String>,
}

const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Check that `text` is one well-formed XML document in which every prefix
/// is declared on the element that uses it or on an ancestor, and every
/// entity reference names a predefined or DOCTYPE entity.
pub fn check_document(text: &str) -> Result<(), String> {
    if let Some(ch) = text.chars().find(|&ch| !is_xml_char(ch)) {
        return Err(format!("character {ch:?} is not allowed in XML"));
    }
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut entities: Vec<String> = PREDEFINED_ENTITIES.iter().map(ToString::to_string).collect();
    let mut roots = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| format!("parse error: {e}"))?;
        match event {
            Event::DocType(doctype) => {
                let internal = String::from_utf8_lossy(&doctype).into_owned();
                entities.extend(
                    internal
                        .split("<!ENTITY")
                        .skip(1)
                        .filter_map(|decl| decl.split_whitespace().next())
                        .map(ToString::to_string),
                );
            }
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                check_entity(&name, &entities)?;
            }
            Event::Start(start) => {
                let element = open_element(&start, &stack, &entities)?;
                if stack.is_empty() {
                    roots += 1;
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                if stack.is_empty() {
                    roots += 1;
                }
                open_element(&start, &stack, &entities)?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(open) if open.name == name => {}
                    Some(open) => return Err(format!("</{name}> closes <{}>", open.name)),
                    None => return Err(format!("</{name}> without start tag")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("<{}> is never closed", open.name));
    }
    if roots != 1 {
        return Err(format!("expected one root element, found {roots}"));
    }
    Ok(())
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&ch)
        || ('\u{E000}'..='\u{FFFD}').contains(&ch)
        || ch >= '\u{10000}'
}

fn check_entity(name: &str, entities: &[String]) -> Result<(), String> {
    if name.starts_with('#') || entities.iter().any(|e| e == name) {
        Ok(())
    } else {
        Err(format!("entity '&{name};' is not declared"))
    }
}

/// Check every `&name;` in a raw attribute value.
fn check_attribute_entities(value: &str, entities: &[String]) -> Result<(), String> {
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        let tail = &rest[amp + 1..];
        let end = tail
            .find(';')
            .ok_or_else(|| format!("unterminated reference in {value:?}"))?;
        check_entity(&tail[..end], entities)?;
        rest = &tail[end + 1..];
    }
    Ok(())
}

fn open_element(
    start: &BytesStart<'_>,
    stack: &[OpenElement],
    entities: &[String],
) -> Result<OpenElement, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut declared = Vec::new();
    let mut used = vec![name.clone()];
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        check_attribute_entities(&String::from_utf8_lossy(&attr.value), entities)?;
        match key.strip_prefix("xmlns:") {
            Some(prefix) => declared.push(prefix.to_string()),
            None => used.push(key),
        }
    }

    for qname in &used {
        let Some((prefix, _)) = qname.split_once(':') else {
            continue;
        };
        let visible = declared.iter().any(|p| p == prefix)
            || stack
                .iter()
                .any(|open| open.declared.iter().any(|p| p == prefix));
        if !visible {
            return Err(format!("prefix '{prefix}' used by <{name}> is not declared"));
        }
    }
    Ok(OpenElement { name, declared })
}

/// The raw character data of the first `<tag>...</tag>` in `text`.
pub fn element_text<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(&text[start..end])
}

/// Remove every `xmlns:prefix="..."` attribute, with its leading whitespace.
pub fn strip_namespace(text: &str, prefix: &str) -> String {
    let mut out = text.to_string();
    for lead in ["\n\t", " "] {
        let needle = format!("{lead}xmlns:{prefix}=\"");
        while let Some(at) = out.find(&needle) {
            let value_start = at + needle.len();
            let Some(len) = out[value_start..].find('"') else {
                break;
            };
            out.replace_range(at..value_start + len + 1, "");
        }
    }
    out
}
