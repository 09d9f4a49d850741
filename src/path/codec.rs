//! Path string parser and flattener.

use super::types::{PathElement, StructuredPath};
use crate::error::TelemetryError;
use std::collections::{BTreeMap, HashMap};

/// Parses an XPath-like string into a [`StructuredPath`].
///
/// Grammar: `/elem[key=value][key2='value2']/elem2...`. A `/` inside an open
/// bracket belongs to the value. Empty element names are skipped, so
/// consecutive slashes never produce empty elements.
///
/// # Errors
/// `MalformedPath` when a non-empty path does not start with `/` or when the
/// bracket annotations are not properly nested.
pub fn parse(origin: &str, path: &str, target: &str) -> Result<StructuredPath, TelemetryError> {
    if !path.is_empty() && !path.starts_with('/') {
        return Err(TelemetryError::MalformedPath(format!(
            "path does not start with a '/': {}",
            path
        )));
    }

    let malformed = || TelemetryError::MalformedPath(format!("invalid path: {}", path));

    let mut structured = StructuredPath {
        origin: origin.to_string(),
        target: target.to_string(),
        elements: Vec::new(),
    };

    // A trailing delimiter flushes the last element
    let buf = format!("{}/", path);

    let mut start = 0;
    let mut name_end: Option<usize> = None;
    let mut key_start: Option<usize> = None;
    let mut value_start: Option<usize> = None;
    let mut keys = BTreeMap::new();

    for (i, byte) in buf.bytes().enumerate() {
        match byte {
            b'[' => {
                if key_start.is_some() {
                    return Err(malformed());
                }
                if name_end.is_none() {
                    name_end = Some(i);
                }
                key_start = Some(i + 1);
            }
            b'=' => match (key_start, value_start) {
                (Some(_), None) => value_start = Some(i + 1),
                _ => return Err(malformed()),
            },
            b']' => match (key_start, value_start) {
                (Some(k), Some(v)) => {
                    let key = &buf[k..v - 1];
                    let value = buf[v..i].trim_matches(|c: char| c == '\'' || c == '"');
                    keys.insert(key.to_string(), value.to_string());
                    key_start = None;
                    value_start = None;
                }
                _ => return Err(malformed()),
            },
            b'/' if key_start.is_none() => {
                let end = name_end.unwrap_or(i);
                let element_keys = std::mem::take(&mut keys);
                if end > start {
                    structured.elements.push(PathElement {
                        name: buf[start..end].to_string(),
                        keys: element_keys,
                    });
                }
                start = i + 1;
                name_end = None;
            }
            _ => {}
        }
    }

    if key_start.is_some() || value_start.is_some() {
        return Err(malformed());
    }

    Ok(structured)
}

/// Flattens a structured path into its display string, collecting key
/// annotations into `tags`.
///
/// See [`flatten_with_prefix`].
pub fn flatten(path: &StructuredPath, tags: &mut HashMap<String, String>) -> String {
    flatten_with_prefix("", path, tags)
}

/// Flattens a structured path appended to an already-flattened `prefix`.
///
/// The display string is `prefix`, then `origin:` when the origin is set,
/// then `/name` per element. Each key becomes a tag under its bare name
/// unless that name is already taken, in which case it is stored under
/// `<display string so far>/<key>`. An existing tag is never overwritten by
/// a later element's key of the same name.
pub fn flatten_with_prefix(
    prefix: &str,
    path: &StructuredPath,
    tags: &mut HashMap<String, String>,
) -> String {
    let mut builder = String::from(prefix);

    if !path.origin.is_empty() {
        builder.push_str(&path.origin);
        builder.push(':');
    }

    for element in &path.elements {
        builder.push('/');
        builder.push_str(&element.name);

        for (key, value) in &element.keys {
            let key = field_name(key);

            // Use the short form of the key if it is still free
            if tags.contains_key(&key) {
                tags.insert(format!("{}/{}", builder, key), value.clone());
            } else {
                tags.insert(key, value.clone());
            }
        }
    }

    builder
}

/// Finalizes a name for use as a tag or field key.
pub fn field_name(name: &str) -> String {
    name.replace('-', "_")
}
