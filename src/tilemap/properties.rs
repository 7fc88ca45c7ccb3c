use std::collections::BTreeMap;

use serde::Serialize;

/// A typed custom property value.
///
/// The source format tags each property with `bool`, `int` or `float`;
/// every other type (`string`, `color`, `file`, untyped) is kept as text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Parse a raw attribute value according to its declared type.
    ///
    /// Returns `None` when an `int`/`float` value does not parse.
    pub fn parse(kind: Option<&str>, raw: &str) -> Option<Self> {
        match kind {
            Some("bool") => Some(Self::Bool(raw == "true")),
            Some("int") => raw.trim().parse().ok().map(Self::Int),
            Some("float") => raw.trim().parse().ok().map(Self::Float),
            _ => Some(Self::String(raw.to_string())),
        }
    }

    /// Truthiness used by the conventional layer flags:
    /// `false`, `0`, `0.0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Name → value property bag attached to maps, layers, groups and objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Absent properties are falsy.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(PropertyValue::is_truthy)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropertyValue::as_i64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_f64)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
