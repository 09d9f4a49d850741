//! Structured path data types and their wire conversions.

use crate::proto::gnmi;
use std::collections::BTreeMap;
use std::fmt;

/// One element of a structured path with its key selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathElement {
    /// Element name, never empty and never containing `/`
    pub name: String,
    /// Key selectors (`[key=value]`)
    pub keys: BTreeMap<String, String>,
}

impl PathElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Adds a key selector, builder style.
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(key.into(), value.into());
        self
    }
}

/// A parsed resource path, elements ordered root to leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredPath {
    pub origin: String,
    pub target: String,
    pub elements: Vec<PathElement>,
}

impl StructuredPath {
    /// Element names in order.
    pub fn names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Renders the path string accepted by [`crate::path::parse`].
    ///
    /// Origin and target are not part of the string form.
    pub fn to_path_string(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            out.push('/');
            out.push_str(&element.name);
            for (key, value) in &element.keys {
                out.push('[');
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push(']');
            }
        }
        out
    }
}

impl fmt::Display for StructuredPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

impl From<&StructuredPath> for gnmi::Path {
    fn from(path: &StructuredPath) -> Self {
        gnmi::Path {
            origin: path.origin.clone(),
            target: path.target.clone(),
            elem: path
                .elements
                .iter()
                .map(|element| gnmi::PathElem {
                    name: element.name.clone(),
                    key: element
                        .keys
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<&gnmi::Path> for StructuredPath {
    fn from(path: &gnmi::Path) -> Self {
        StructuredPath {
            origin: path.origin.clone(),
            target: path.target.clone(),
            elements: path
                .elem
                .iter()
                .map(|elem| PathElement {
                    name: elem.name.clone(),
                    keys: elem
                        .key
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                })
                .collect(),
        }
    }
}
