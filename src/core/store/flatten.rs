//! Conversion between nested namespace trees and dot-joined flat entries.
//!
//! This is the sole boundary between the two store shapes. `flatten` and
//! `unflatten` are exact inverses for any entry set sharing one namespace.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Flatten a namespace tree into `namespace.seg.seg = value` entries.
///
/// Only string leaves are emitted; anything else (numbers, arrays, nulls)
/// is ignored, matching the flat reader's tolerance for foreign values.
pub fn flatten(tree: &Map<String, Value>, namespace: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    flatten_into(tree, namespace, &mut entries);
    entries
}

fn flatten_into(tree: &Map<String, Value>, prefix: &str, entries: &mut BTreeMap<String, String>) {
    for (key, value) in tree {
        let path = format!("{}.{}", prefix, key);
        match value {
            Value::String(s) => {
                entries.insert(path, s.clone());
            }
            Value::Object(child) => flatten_into(child, &path, entries),
            _ => {}
        }
    }
}

/// Rebuild a namespace tree from flat entries.
///
/// Entries not prefixed by `namespace.` are skipped; the remaining dot
/// segments become nesting levels.
pub fn unflatten(entries: &BTreeMap<String, String>, namespace: &str) -> Map<String, Value> {
    let prefix = format!("{}.", namespace);
    let mut tree = Map::new();
    for (key, value) in entries {
        let Some(path) = key.strip_prefix(&prefix) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        let segments: Vec<&str> = path.split('.').collect();
        insert_nested(&mut tree, &segments, Value::String(value.clone()));
    }
    tree
}

/// Insert a value at a nested path, creating intermediate objects as needed.
/// An existing non-object value on the path is replaced by an object.
pub fn insert_nested(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        root.insert(first.to_string(), value);
        return;
    }

    let next_level = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !next_level.is_object() {
        *next_level = Value::Object(Map::new());
    }
    if let Some(inner) = next_level.as_object_mut() {
        insert_nested(inner, rest, value);
    }
}
