//! Nested values for formats that decode straight into maps and lists.
//!
//! JSON, TOML, XML (and YAML when read for its whole content) carry no
//! position or comment metadata, so they are converted into the closed
//! `NestedValue` variant rather than a [`DocumentNode`](super::node::DocumentNode)
//! tree.
//!
//! # Example
//!
//! ```
//! use confquill::document::value::{NestedValue, ValueKind};
//!
//! let value = NestedValue::from(serde_json::json!({"port": 8080, "ratio": 0.5}));
//! let map = value.as_map().unwrap();
//! assert_eq!(map["port"].kind(), Some(ValueKind::Integer));
//! assert_eq!(map["ratio"].kind(), Some(ValueKind::Number));
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A recursively typed value without source metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<NestedValue>),
    /// Keys are unique; insertion order follows the source where the decoder
    /// preserves it.
    Map(IndexMap<String, NestedValue>),
}

/// Best-effort runtime kind of a nested value, used as the row tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Number,
    Boolean,
    Map,
    List,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Map => "map",
            ValueKind::List => "list",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl NestedValue {
    /// Returns the runtime kind, or `None` for null.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            NestedValue::Null => None,
            NestedValue::Bool(_) => Some(ValueKind::Boolean),
            NestedValue::Int(_) => Some(ValueKind::Integer),
            NestedValue::Float(_) => Some(ValueKind::Number),
            NestedValue::String(_) => Some(ValueKind::String),
            NestedValue::List(_) => Some(ValueKind::List),
            NestedValue::Map(_) => Some(ValueKind::Map),
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, NestedValue>> {
        match self {
            NestedValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NestedValue]> {
        match self {
            NestedValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts into a `serde_json::Value` for JSON output columns.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for NestedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NestedValue::Null => serializer.serialize_none(),
            NestedValue::Bool(b) => serializer.serialize_bool(*b),
            NestedValue::Int(i) => serializer.serialize_i64(*i),
            NestedValue::Float(f) => serializer.serialize_f64(*f),
            NestedValue::String(s) => serializer.serialize_str(s),
            NestedValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            NestedValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for NestedValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => NestedValue::Null,
            Value::Bool(b) => NestedValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => NestedValue::Int(i),
                // u64 beyond i64 range and real floats both land here
                None => NestedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => NestedValue::String(s),
            Value::Array(items) => NestedValue::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => NestedValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, NestedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for NestedValue {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => NestedValue::String(s),
            Value::Integer(i) => NestedValue::Int(i),
            Value::Float(f) => NestedValue::Float(f),
            Value::Boolean(b) => NestedValue::Bool(b),
            Value::Datetime(dt) => NestedValue::String(dt.to_string()),
            Value::Array(items) => NestedValue::List(items.into_iter().map(Self::from).collect()),
            Value::Table(table) => NestedValue::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (k, NestedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for NestedValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => NestedValue::Null,
            Value::Bool(b) => NestedValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => NestedValue::Int(i),
                None => NestedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => NestedValue::String(s),
            Value::Sequence(items) => {
                NestedValue::List(items.into_iter().map(Self::from).collect())
            }
            Value::Mapping(mapping) => NestedValue::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (yaml_key(k), NestedValue::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => NestedValue::from(tagged.value),
        }
    }
}

/// Renders a YAML mapping key as a string.
fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
