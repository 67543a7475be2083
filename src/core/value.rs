//! Configuration values and the recursive overlay merge
//!
//! Step templates and override patches are both plain nested mappings. Keys
//! are kept in a `BTreeMap` so every mapping iterates (and serializes) in
//! sorted order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A nested mapping from string keys to configuration values
pub type Mapping = BTreeMap<String, Value>;

/// A configuration value: a scalar, a sequence, or a nested mapping
///
/// Variant order matters for deserialization: integers are tried before
/// floats so `20` stays an `Integer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Borrow the value as a string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the value as a mapping, if it is one
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Overlay `update` on top of `base`
///
/// Keys present in both where both values are mappings are merged
/// recursively. Any other value in `update` (scalars and sequences alike)
/// replaces the base value. Keys only present in `base` are kept as-is.
/// Neither input is modified.
pub fn overlay(base: &Mapping, update: &Mapping) -> Mapping {
    let mut merged = base.clone();
    for (key, value) in update {
        let next = match (merged.get(key), value) {
            (Some(Value::Mapping(inner)), Value::Mapping(patch)) => {
                Value::Mapping(overlay(inner, patch))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Build a nested mapping from a slash-separated key path
///
/// `nested("a/b/c", "3")` yields `{a: {b: {c: "3"}}}`.
pub fn nested(path: &str, value: impl Into<Value>) -> Mapping {
    let mut keys = path.rsplit('/');
    // rsplit always yields at least one item
    let leaf = keys.next().unwrap_or(path);
    let mut map = Mapping::from([(leaf.to_string(), value.into())]);
    for key in keys {
        map = Mapping::from([(key.to_string(), Value::Mapping(map))]);
    }
    map
}
