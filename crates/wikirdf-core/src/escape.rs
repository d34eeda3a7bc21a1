//! # Escaping and XML Names
//!
//! Three escaping rules are in play in an RDF/XML export:
//! - character data of literals (`escape_text`)
//! - attribute values holding URIs, which may contain entity references
//!   such as `&wiki;` that must survive untouched (`escape_attribute`)
//! - entity values in the DOCTYPE internal subset (`entity_value_string`)
//!
//! All of them reject characters outside the XML 1.0 `Char` production;
//! such text has no escaped form.

use crate::{ExportError, QName};
use std::borrow::Cow;

/// Whether `ch` may appear in an XML 1.0 document at all.
pub fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

/// Fail on the first character that XML cannot represent.
pub fn check_chars(text: &str) -> Result<(), ExportError> {
    match text.chars().find(|&ch| !is_xml_char(ch)) {
        Some(ch) => Err(ExportError::InvalidCharacter(ch)),
        None => Ok(()),
    }
}

/// Escape literal text for XML character data.
///
/// Only `&`, `<` and `>` are replaced; quotes are legal in element content.
pub fn escape_text(text: &str) -> Result<Cow<'_, str>, ExportError> {
    check_chars(text)?;
    if !text.contains(['&', '<', '>']) {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Ok(Cow::Owned(out))
}

/// Escape a double-quoted attribute value.
///
/// An ampersand that starts a well-formed entity or character reference is
/// kept as is, so abbreviated URIs like `&wiki;Foo` keep pointing at the
/// DOCTYPE entities. Any other ampersand is escaped. Whether the entities
/// are declared is the caller's concern (see [`entity_references`]).
pub fn escape_attribute(value: &str) -> Result<Cow<'_, str>, ExportError> {
    check_chars(value)?;
    if !value.contains(['&', '<', '>', '"']) {
        return Ok(Cow::Borrowed(value));
    }
    let mut out = String::with_capacity(value.len() + 8);
    for (i, ch) in value.char_indices() {
        match ch {
            '&' if starts_reference(&value[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Ok(Cow::Owned(out))
}

/// Names of the entity references `escape_attribute` keeps in `value`.
///
/// Character references are not included.
pub fn entity_references(value: &str) -> impl Iterator<Item = &str> {
    value.match_indices('&').filter_map(move |(i, _)| {
        let tail = &value[i..];
        if !starts_reference(tail) || tail[1..].starts_with('#') {
            return None;
        }
        tail.find(';').map(|end| &tail[1..end])
    })
}

/// Wrap a value for use in `<!ENTITY name '...'>`.
///
/// Character references in an entity value are expanded once when the
/// DTD is read and the result is parsed again wherever the entity is used.
/// `&` and `<` are therefore double-encoded; `%` would start a parameter
/// entity reference and `'` would end the literal.
pub fn entity_value_string(value: &str) -> Result<String, ExportError> {
    check_chars(value)?;
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&#38;#38;"),
            '<' => out.push_str("&#38;#60;"),
            '%' => out.push_str("&#37;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    Ok(out)
}

/// Check text for use inside `<!-- ... -->`.
pub fn check_comment(text: &str) -> Result<(), ExportError> {
    if text.contains("--") || text.ends_with('-') {
        return Err(ExportError::ConfigError(
            "generator must not contain \"--\" or end with \"-\"".to_string(),
        ));
    }
    check_chars(text)
}

/// Check whether `text` (which starts with `&`) begins a complete reference.
fn starts_reference(text: &str) -> bool {
    let Some(end) = text.find(';') else {
        return false;
    };
    let body = &text[1..end];
    if let Some(num) = body.strip_prefix('#') {
        return match num.strip_prefix('x') {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        };
    }
    is_ncname(body)
}

// =============================================================================
// XML NAMES
// =============================================================================

fn is_name_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_numeric() || matches!(ch, '-' | '.' | '\u{B7}')
}

/// Check whether `name` is a non-colonized XML name.
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Render a QName for use as an element name, validating both parts.
pub fn checked_qname(name: &QName) -> Result<String, ExportError> {
    if is_ncname(&name.prefix) && is_ncname(&name.local_name) {
        Ok(name.to_string())
    } else {
        Err(ExportError::InvalidName(name.to_string()))
    }
}
