//! Translation store I/O.
//!
//! Two store shapes exist per language: a flat key/value file and a set of
//! nested per-namespace tree files. `flatten`/`unflatten` are the single
//! conversion boundary between them.

pub mod flatten;
pub mod reader;
pub mod writer;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub use flatten::{flatten, insert_nested, unflatten};
pub use reader::StoreReader;
pub use writer::{ConfirmFn, StoreWriter, WriteAction, WriteMode, WriteOutcome, group_by_namespace};

/// Parsed content of one store file.
///
/// The namespace is explicit on the nested variant rather than implied by
/// the file name, so conversions never depend on filesystem context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreContent {
    /// One key/value object for a whole language.
    Flat(BTreeMap<String, String>),
    /// One namespace's arbitrarily deep string tree.
    Nested {
        namespace: String,
        tree: Map<String, Value>,
    },
}

impl StoreContent {
    /// View as dot-joined flat entries; nested trees go through `flatten`.
    pub fn flat_entries(&self) -> BTreeMap<String, String> {
        match self {
            StoreContent::Flat(map) => map.clone(),
            StoreContent::Nested { namespace, tree } => flatten(tree, namespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flat_entries_for_both_variants() {
        let mut map = BTreeMap::new();
        map.insert("a.b".to_string(), "v".to_string());
        assert_eq!(StoreContent::Flat(map.clone()).flat_entries(), map);

        let nested = StoreContent::Nested {
            namespace: "ns".to_string(),
            tree: json!({"a": {"b": "v"}}).as_object().unwrap().clone(),
        };
        let entries = nested.flat_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["ns.a.b"], "v");
    }
}
