use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;

use super::flatten::unflatten;
use super::reader::StoreReader;
use crate::config::DEFAULT_NAMESPACE;
use crate::core::record::TranslationRecord;

/// How a store file is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Union of existing and new content; new values win on collision.
    Merge,
    /// Existing content is discarded. Gated by a confirmation step unless
    /// the force flag is set.
    Overwrite,
    /// No filesystem mutation; reports the path that would be written.
    Preview,
}

/// What happened to one store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Written,
    /// Overwrite was declined by the confirmation step.
    Declined,
    Previewed,
}

#[derive(Debug)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub action: WriteAction,
    pub keys: usize,
}

pub type ConfirmFn = Box<dyn Fn(&Path) -> bool>;

/// Writes per-language translation stores.
///
/// Files are written whole: read fully, merged or replaced in memory, then
/// serialized back with pretty formatting and a trailing newline. There is
/// no cross-process locking; one invocation owns a store file for its full
/// read-modify-write cycle.
pub struct StoreWriter {
    reader: StoreReader,
    store_root: PathBuf,
    force: bool,
    confirm: ConfirmFn,
}

impl StoreWriter {
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        let store_root = store_root.into();
        Self {
            reader: StoreReader::new(store_root.clone()),
            store_root,
            force: false,
            // Without a confirmation hook, unforced overwrites are declined.
            confirm: Box::new(|_| false),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Install the confirmation step used for unforced overwrites.
    pub fn with_confirm(mut self, confirm: ConfirmFn) -> Self {
        self.confirm = confirm;
        self
    }

    /// Write the flat store for one language.
    pub fn write_flat(
        &self,
        language: &str,
        entries: &BTreeMap<String, String>,
        mode: WriteMode,
    ) -> Result<WriteOutcome> {
        let path = self.reader.flat_path(language);
        let content = match mode {
            WriteMode::Merge => {
                let mut merged = self.reader.read_flat(language);
                merged.extend(entries.clone());
                merged
            }
            WriteMode::Overwrite | WriteMode::Preview => entries.clone(),
        };

        let object: serde_json::Map<String, Value> = content
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.finish(path, Value::Object(object), entries.len(), mode)
    }

    /// Write one namespace file for one language.
    ///
    /// `entries` carry full dotted keys (`namespace.seg.seg`); keys outside
    /// `namespace` are ignored by the rebuild.
    pub fn write_nested(
        &self,
        language: &str,
        namespace: &str,
        entries: &BTreeMap<String, String>,
        mode: WriteMode,
    ) -> Result<WriteOutcome> {
        let path = self.reader.nested_path(language, namespace);
        let merged = match mode {
            WriteMode::Merge => {
                let mut existing: BTreeMap<String, String> = self
                    .reader
                    .read_nested(language)
                    .into_iter()
                    .filter(|(key, _)| key.starts_with(&format!("{}.", namespace)))
                    .collect();
                existing.extend(entries.clone());
                existing
            }
            WriteMode::Overwrite | WriteMode::Preview => entries.clone(),
        };

        let tree = unflatten(&merged, namespace);
        self.finish(path, Value::Object(tree), entries.len(), mode)
    }

    fn finish(
        &self,
        path: PathBuf,
        content: Value,
        keys: usize,
        mode: WriteMode,
    ) -> Result<WriteOutcome> {
        match mode {
            WriteMode::Preview => Ok(WriteOutcome {
                path,
                action: WriteAction::Previewed,
                keys,
            }),
            WriteMode::Overwrite if !self.force && !(self.confirm)(&path) => Ok(WriteOutcome {
                path,
                action: WriteAction::Declined,
                keys: 0,
            }),
            WriteMode::Merge | WriteMode::Overwrite => {
                save_json(&path, &content)?;
                Ok(WriteOutcome {
                    path,
                    action: WriteAction::Written,
                    keys,
                })
            }
        }
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }
}

/// Group nested-destined records by namespace so each namespace is written
/// to exactly one file.
///
/// The namespace is the first dot segment of the key; keys without a dot go
/// to the default namespace, prefixed so the rebuild nests them there.
pub fn group_by_namespace(
    records: &[&TranslationRecord],
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut groups: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for record in records {
        let (namespace, entry_key) = match record.key.split_once('.') {
            Some((ns, _)) => (ns.to_string(), record.key.clone()),
            None => (
                DEFAULT_NAMESPACE.to_string(),
                format!("{}.{}", DEFAULT_NAMESPACE, record.key),
            ),
        };
        groups
            .entry(namespace)
            .or_default()
            .insert(entry_key, record.value.clone());
    }
    groups
}

fn save_json(path: &Path, content: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(content).context("Failed to serialize JSON")?;
    fs::write(path, format!("{}\n", serialized))
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}
