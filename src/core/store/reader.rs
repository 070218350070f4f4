use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use serde_json::Value;

use super::StoreContent;

/// Reads per-language translation stores.
///
/// Flat stores live at `<store_root>/<lang>.json` (one key/value object per
/// language); nested stores at `<store_root>/<lang>/<namespace>.json` (one
/// arbitrarily deep string tree per namespace). Malformed content never
/// aborts the caller: a broken flat file reads as empty, and a broken
/// namespace file is skipped while its siblings still load.
pub struct StoreReader {
    store_root: PathBuf,
}

impl StoreReader {
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
        }
    }

    pub fn flat_path(&self, language: &str) -> PathBuf {
        self.store_root.join(format!("{}.json", language))
    }

    pub fn nested_dir(&self, language: &str) -> PathBuf {
        self.store_root.join(language)
    }

    pub fn nested_path(&self, language: &str, namespace: &str) -> PathBuf {
        self.nested_dir(language).join(format!("{}.json", namespace))
    }

    /// Read the flat store for one language.
    ///
    /// Non-string values are ignored. A missing file is an empty store; a
    /// malformed file logs a warning and also reads as empty.
    pub fn read_flat(&self, language: &str) -> BTreeMap<String, String> {
        let path = self.flat_path(language);
        if !path.is_file() {
            return BTreeMap::new();
        }
        match read_object(&path) {
            Ok(object) => object
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                warn(&format!(
                    "Skipping malformed flat store {}: {}",
                    path.display(),
                    err
                ));
                BTreeMap::new()
            }
        }
    }

    /// Read every namespace file for one language, flattened to
    /// `namespace.seg.seg = value` entries.
    ///
    /// Parse failures are isolated per file: the broken file is logged and
    /// skipped, remaining namespaces still load.
    pub fn read_nested(&self, language: &str) -> BTreeMap<String, String> {
        let dir = self.nested_dir(language);
        let mut entries = BTreeMap::new();
        let Ok(dir_entries) = fs::read_dir(&dir) else {
            return entries;
        };

        let mut files: Vec<PathBuf> = dir_entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for path in files {
            let Some(namespace) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_object(&path) {
                Ok(tree) => {
                    let content = StoreContent::Nested {
                        namespace: namespace.to_string(),
                        tree,
                    };
                    entries.extend(content.flat_entries());
                }
                Err(err) => {
                    warn(&format!(
                        "Skipping malformed namespace file {}: {}",
                        path.display(),
                        err
                    ));
                }
            }
        }
        entries
    }
}

fn read_object(path: &Path) -> anyhow::Result<serde_json::Map<String, Value>> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("root must be an object"),
    }
}

fn warn(message: &str) {
    eprintln!("{} {}", "warning:".bold().yellow(), message);
}
