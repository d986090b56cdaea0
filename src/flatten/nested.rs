//! Nested-value flattening for JSON, TOML, XML and similar formats.
//!
//! Unlike tree mode, results are gathered into one map per document before
//! anything is returned, so duplicate paths coalesce (the last value wins).
//!
//! ```
//! use confquill::document::value::NestedValue;
//! use confquill::flatten::nested::flatten;
//!
//! let value = NestedValue::from(serde_json::json!({"a": {"b": 1, "c": 2}}));
//! let flat = flatten(&value);
//! let keys: Vec<&String> = flat.keys().collect();
//! assert_eq!(keys, vec!["a.b", "a.c"]);
//! ```

use crate::document::value::{NestedValue, ValueKind};
use indexmap::IndexMap;

/// One flattened entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry {
    /// Raw path segments, keys and stringified indices, as found in the source.
    pub keys: Vec<String>,
    pub value: NestedValue,
}

impl FlatEntry {
    /// Runtime kind of the value; `None` for null.
    pub fn kind(&self) -> Option<ValueKind> {
        self.value.kind()
    }
}

/// Flattens `root` into a map from dotted path to entry.
///
/// Maps recurse key by key. Lists recurse only into elements that are maps;
/// any other element is stored whole under its index, so a list of lists is
/// never expanded past the first level. Empty lists and empty maps produce
/// nothing.
pub fn flatten(root: &NestedValue) -> IndexMap<String, FlatEntry> {
    let mut out = IndexMap::new();
    visit(root, &mut Vec::new(), &mut out);
    out
}

fn visit(value: &NestedValue, path: &mut Vec<String>, out: &mut IndexMap<String, FlatEntry>) {
    match value {
        NestedValue::Map(entries) => {
            for (key, child) in entries {
                path.push(key.clone());
                visit(child, path, out);
                path.pop();
            }
        }
        NestedValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                if matches!(item, NestedValue::Map(_)) {
                    visit(item, path, out);
                } else {
                    store(path, item, out);
                }
                path.pop();
            }
        }
        scalar => store(path, scalar, out),
    }
}

fn store(path: &[String], value: &NestedValue, out: &mut IndexMap<String, FlatEntry>) {
    let entry = FlatEntry {
        keys: path.to_vec(),
        value: value.clone(),
    };
    // insert() keeps the first position of a coalesced key
    out.insert(path.join("."), entry);
}
