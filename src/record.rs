//! Scraped record representation.
//!
//! A record is a flat-ish mapping from field name to value. Scrapers emit
//! them as JSON objects; the quality gate only ever reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field value as produced by a scraper.
///
/// Variant order matters for untagged deserialization: `null` and booleans
/// must be tried before numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

/// Coarse kind of a value, used by structure checks and rule declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text or number; anything printable on one line.
    Scalar,
    Text,
    Number,
    Bool,
    List,
    Map,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Scalar => write!(f, "scalar"),
            ValueKind::Text => write!(f, "text"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::List => write!(f, "list"),
            ValueKind::Map => write!(f, "map"),
        }
    }
}

impl FieldValue {
    /// Returns the string content if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the value carries no usable content.
    ///
    /// Null, empty or whitespace-only text, and empty collections are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Interpret the value as a number.
    ///
    /// Text is accepted when it parses after trimming and removing
    /// thousands separators.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// Whether this value is a list or map.
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldValue::List(_) | FieldValue::Map(_))
    }

    /// Whether a collection value holds another collection.
    pub fn is_deeply_nested(&self) -> bool {
        match self {
            FieldValue::List(items) => items.iter().any(FieldValue::is_collection),
            FieldValue::Map(entries) => entries.values().any(FieldValue::is_collection),
            _ => false,
        }
    }

    /// Whether this value satisfies the expected kind.
    pub fn matches_kind(&self, kind: ValueKind) -> bool {
        match (kind, self) {
            (_, FieldValue::Null) => true,
            (ValueKind::Scalar, FieldValue::Text(_) | FieldValue::Number(_)) => true,
            (ValueKind::Text, FieldValue::Text(_)) => true,
            (ValueKind::Number, FieldValue::Number(_)) => true,
            (ValueKind::Number, FieldValue::Text(_)) => self.as_number().is_some(),
            (ValueKind::Bool, FieldValue::Bool(_)) => true,
            (ValueKind::List, FieldValue::List(_)) => true,
            (ValueKind::Map, FieldValue::Map(_)) => true,
            _ => false,
        }
    }

    /// Append every string found in this value (recursively) to `out`.
    pub fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldValue::Text(s) => out.push(s.as_str()),
            FieldValue::List(items) => items.iter().for_each(|v| v.collect_text(out)),
            FieldValue::Map(entries) => entries.values().for_each(|v| v.collect_text(out)),
            _ => {}
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// One scraped data item awaiting quality assessment.
///
/// The category is never stored on the record; callers supply it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the value only if it is present and not blank.
    pub fn non_blank(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|v| !v.is_blank())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All string content of the record, including strings nested in
    /// lists and maps, in field-name order.
    pub fn text_content(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for value in self.fields.values() {
            value.collect_text(&mut out);
        }
        out
    }
}
