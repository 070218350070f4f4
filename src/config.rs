use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".locsyncrc.json";

/// Namespace used for nested-store keys that carry no dot segment.
pub const DEFAULT_NAMESPACE: &str = "common";

/// Regex patterns applied to one file type.
///
/// Template types can inherit a base type's patterns via `inherits`; the
/// inherited patterns run first, then the type's own patterns, in order.
/// Duplicate matches across patterns are permitted and deduplicated later
/// during collection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypePatterns {
    /// File suffixes this type claims (e.g. [".py"], [".html.tera"]).
    /// Compound suffixes are matched against the whole file name, not just
    /// the last dot segment.
    pub suffixes: Vec<String>,
    /// Name of a base file type whose patterns run before this type's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Ordered regex list; capture group 1 is the extracted text.
    pub patterns: Vec<String>,
}

/// Remote translation-management service settings.
///
/// The bearer token is deliberately not part of the config file; it comes
/// from the CLI flag or the `LOCSYNC_API_TOKEN` environment variable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_batch_size() -> usize {
    50
}

fn default_batch_pause_ms() -> u64 {
    200
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            project_id: String::new(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories to scan for translation references.
    #[serde(default = "default_scan_roots")]
    pub scan_roots: Vec<String>,
    /// Glob patterns for paths to skip while scanning.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Languages the translation store carries.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Language used to resolve lookup keys to values.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Root directory of the translation store.
    ///
    /// Flat stores live at `<storeRoot>/<lang>.json`; nested stores at
    /// `<storeRoot>/<lang>/<namespace>.json`.
    #[serde(default = "default_store_root")]
    pub store_root: String,
    /// Directory whose first-level subdirectories are treated as modules.
    #[serde(default = "default_modules_root")]
    pub modules_root: String,
    /// Optional module manifest: module name -> relative subpaths to scan.
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<String>>,
    /// Emit unresolved lookup keys as direct-text records instead of
    /// dropping them. Off by default: dropping orphaned keys is the
    /// intended behavior, not an accident.
    #[serde(default)]
    pub collect_unresolved: bool,
    /// Pattern table, keyed by file type name.
    #[serde(default = "default_file_types")]
    pub file_types: BTreeMap<String, FileTypePatterns>,
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_scan_roots() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

fn default_store_root() -> String {
    "./locales".to_string()
}

fn default_modules_root() -> String {
    "modules".to_string()
}

fn default_file_types() -> BTreeMap<String, FileTypePatterns> {
    let mut types = BTreeMap::new();
    types.insert(
        "python".to_string(),
        FileTypePatterns {
            suffixes: vec![".py".to_string()],
            inherits: None,
            patterns: vec![
                r#"__\(\s*"([^"]+)"\s*\)"#.to_string(),
                r#"__\(\s*'([^']+)'\s*\)"#.to_string(),
            ],
        },
    );
    types.insert(
        "javascript".to_string(),
        FileTypePatterns {
            suffixes: vec![".js".to_string(), ".ts".to_string()],
            inherits: None,
            patterns: vec![
                r#"\bt\(\s*"([^"]+)"\s*\)"#.to_string(),
                r#"\bt\(\s*'([^']+)'\s*\)"#.to_string(),
            ],
        },
    );
    types.insert(
        "template".to_string(),
        FileTypePatterns {
            suffixes: vec![".html.tera".to_string(), ".html".to_string()],
            inherits: Some("python".to_string()),
            patterns: vec![r#"\{\{\s*__\(\s*"([^"]+)"\s*\)\s*\}\}"#.to_string()],
        },
    );
    types
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_roots: default_scan_roots(),
            excludes: Vec::new(),
            languages: default_languages(),
            default_language: default_language(),
            store_root: default_store_root(),
            modules_root: default_modules_root(),
            modules: BTreeMap::new(),
            collect_unresolved: false,
            file_types: default_file_types(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any exclusion glob or extraction regex fails to
    /// compile, or if a template type inherits from an unknown base type.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.excludes {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))?;
        }

        for (name, file_type) in &self.file_types {
            for pattern in &file_type.patterns {
                Regex::new(pattern).with_context(|| {
                    format!("Invalid regex in file type '{}': \"{}\"", name, pattern)
                })?;
            }
            if let Some(base) = &file_type.inherits {
                if !self.file_types.contains_key(base) {
                    anyhow::bail!("File type '{}' inherits unknown base type '{}'", name, base);
                }
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

/// Search for a config file starting from `start_dir`, walking up to the root.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load the config next to or above `dir`, falling back to defaults.
pub fn load_config_or_default(dir: &Path) -> Result<Config> {
    match find_config_file(dir) {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}
