use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cell of an input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects. Never valid for a known field.
    Other(serde_json::Value),
}

impl FieldValue {
    /// Canonical scalar text, or `None` when the cell counts as empty.
    ///
    /// Integral floats render without a fraction (`12345.0` -> `"12345"`),
    /// since spreadsheet exports turn integer columns into floats.
    pub fn canonical(&self) -> Option<String> {
        let s = match self {
            FieldValue::Null | FieldValue::Other(_) => return None,
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) if !f.is_finite() => return None,
            FieldValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(t) => {
                let t = t.trim();
                // pandas writes missing cells as "nan"
                if t == "nan" || t == "NaN" { return None; }
                t.to_string()
            }
        };
        if s.is_empty() { None } else { Some(s) }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self { FieldValue::Text(s.to_string()) }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self { FieldValue::Text(s) }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self { FieldValue::Int(i) }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self { FieldValue::Float(f) }
}

/// Result of looking a field up by name.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Missing,
    Value(String),
    Malformed(&'a serde_json::Value),
}

/// A single catalog row: field name to value. Field names are trimmed on
/// construction so `" Publisher "` and `"Publisher"` are the same column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, FieldValue>", into = "HashMap<String, FieldValue>")]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.trim().to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.fields.get(name) {
            None => Lookup::Missing,
            Some(FieldValue::Other(v)) => Lookup::Malformed(v),
            Some(v) => v.canonical().map(Lookup::Value).unwrap_or(Lookup::Missing),
        }
    }

    /// Canonical value of `name`, or the empty string when missing, null or
    /// malformed.
    pub fn get_or_default(&self, name: &str) -> String {
        match self.lookup(name) {
            Lookup::Value(v) => v,
            Lookup::Missing | Lookup::Malformed(_) => String::new(),
        }
    }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl From<HashMap<String, FieldValue>> for Record {
    fn from(raw: HashMap<String, FieldValue>) -> Self {
        let fields = raw.into_iter().map(|(k, v)| (k.trim().to_string(), v)).collect();
        Self { fields }
    }
}

impl From<Record> for HashMap<String, FieldValue> {
    fn from(r: Record) -> Self { r.fields }
}
