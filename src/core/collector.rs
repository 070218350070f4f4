//! Orchestration of collect, scan, and pull-sync workflows.
//!
//! One collect run moves through Idle -> ScanningPaths -> ScanningModules
//! (when modules are configured) -> Deduplicating -> Done, recording elapsed
//! time and counters at each transition. Statistics are returned as an
//! explicit value per call; there is no shared mutable accumulator.

use std::{
    collections::BTreeMap,
    collections::HashSet,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::config::Config;
use crate::core::diff::{DifferenceSet, analyze_differences};
use crate::core::extract::{ExcludeSet, Extractor, PatternTable, RootScan};
use crate::core::record::{
    CollectStats, FileType, ScanPhase, SourceType, TranslationRecord, now_timestamp,
};
use crate::core::remote::{ListFilters, SyncClient};
use crate::core::resolve::Resolver;
use crate::core::store::{
    StoreReader, StoreWriter, WriteAction, WriteMode, WriteOutcome, group_by_namespace,
};

#[derive(Debug, Default)]
pub struct CollectOptions {
    /// Override the configured scan roots.
    pub paths: Option<Vec<PathBuf>>,
    /// Restrict the module phase to these modules; `None` scans every
    /// module named in the manifest.
    pub modules: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct CollectOutcome {
    pub records: Vec<TranslationRecord>,
    pub stats: CollectStats,
}

/// Per-language result of a pull sync.
#[derive(Debug)]
pub struct PullReport {
    pub language: String,
    pub written: usize,
    pub previewed: usize,
    pub skipped: usize,
    pub outcomes: Vec<WriteOutcome>,
    pub errors: Vec<String>,
}

impl PullReport {
    fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            written: 0,
            previewed: 0,
            skipped: 0,
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Fold one write outcome into the counters. Only a write that actually
    /// happened counts as written; a preview counts separately and a
    /// declined overwrite counts as neither.
    fn absorb(&mut self, outcome: WriteOutcome) {
        match outcome.action {
            WriteAction::Written => self.written += outcome.keys,
            WriteAction::Previewed => self.previewed += outcome.keys,
            WriteAction::Declined => {}
        }
        self.outcomes.push(outcome);
    }
}

/// A remote list item that survived pull validation.
struct PulledRecord {
    key: String,
    value: String,
    file_type: FileType,
}

/// Composes extractor, resolver, stores, diff engine and remote client into
/// the collect / scan / sync workflows.
pub struct Collector<'a> {
    config: &'a Config,
    patterns: PatternTable,
    resolver: Resolver,
    reader: StoreReader,
}

impl<'a> Collector<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let reader = StoreReader::new(&config.store_root);
        let resolver = Resolver::from_store(
            &reader,
            &config.default_language,
            config.collect_unresolved,
        );
        Ok(Self {
            config,
            patterns: PatternTable::from_config(&config.file_types)?,
            resolver,
            reader,
        })
    }

    /// Run the full collect workflow: path scan, optional module scan,
    /// then first-wins deduplication.
    pub fn collect(&self, options: &CollectOptions) -> CollectOutcome {
        let started = Instant::now();
        let mut stats = CollectStats::default();
        stats.record_phase(ScanPhase::Idle, started.elapsed());

        let mut extractor = self.extractor();
        let mut scan = RootScan::default();

        let roots: Vec<PathBuf> = match &options.paths {
            Some(paths) => paths.clone(),
            None => self.config.scan_roots.iter().map(PathBuf::from).collect(),
        };
        for root in &roots {
            scan.absorb(extractor.scan_root(root));
        }
        stats.files_scanned = scan.files_scanned;
        stats.records_found = scan.records.len();
        stats.unresolved_dropped = scan.unresolved_dropped;
        stats.record_phase(ScanPhase::ScanningPaths, started.elapsed());

        let module_names: Vec<String> = match &options.modules {
            Some(names) => names.clone(),
            None => self.config.modules.keys().cloned().collect(),
        };
        if !module_names.is_empty() {
            for name in &module_names {
                for root in self.module_roots(name) {
                    scan.absorb(extractor.scan_root(&root));
                }
            }
            stats.files_scanned = scan.files_scanned;
            stats.records_found = scan.records.len();
            stats.unresolved_dropped = scan.unresolved_dropped;
            stats.record_phase(ScanPhase::ScanningModules, started.elapsed());
        }

        let before = scan.records.len();
        let records = dedupe(scan.records);
        stats.duplicates_dropped = before - records.len();
        stats.records_found = records.len();
        stats.record_phase(ScanPhase::Deduplicating, started.elapsed());

        stats.record_phase(ScanPhase::Done, started.elapsed());
        CollectOutcome { records, stats }
    }

    /// Scan explicit paths, outside the phased collect workflow.
    pub fn scan_paths(&self, paths: &[PathBuf]) -> CollectOutcome {
        self.collect(&CollectOptions {
            paths: Some(paths.to_vec()),
            modules: Some(Vec::new()),
        })
    }

    /// Scan the named modules only.
    pub fn scan_modules(&self, names: &[String]) -> CollectOutcome {
        self.collect(&CollectOptions {
            paths: Some(Vec::new()),
            modules: Some(names.to_vec()),
        })
    }

    /// Read every store entry for the given languages back as records.
    pub fn scan_existing_translations(&self, languages: &[String]) -> Vec<TranslationRecord> {
        let mut records = Vec::new();
        for language in languages {
            let flat_path = self.reader.flat_path(language).display().to_string();
            for (key, value) in self.reader.read_flat(language) {
                records.push(store_record(key, value, flat_path.clone(), FileType::Flat));
            }
            for (key, value) in self.reader.read_nested(language) {
                let namespace = key.split('.').next().unwrap_or_default();
                let path = self
                    .reader
                    .nested_path(language, namespace)
                    .display()
                    .to_string();
                records.push(store_record(key, value, path, FileType::Nested));
            }
        }
        records
    }

    /// Diff collected records against existing ones.
    pub fn analyze_differences(
        &self,
        collected: &[TranslationRecord],
        existing: &[TranslationRecord],
    ) -> DifferenceSet {
        analyze_differences(collected, existing)
    }

    /// Pull-sync every language, best effort: one language's failure is
    /// reported in its own entry while the rest still run.
    pub fn pull_languages(
        &self,
        client: &SyncClient,
        writer: &StoreWriter,
        languages: &[String],
        mode: WriteMode,
    ) -> Vec<PullReport> {
        languages
            .iter()
            .map(|language| self.pull_language(client, writer, language, mode))
            .collect()
    }

    /// Pull-sync one language: fetch, validate, group by destination file,
    /// write. Invalid records are counted and skipped, never fatal.
    pub fn pull_language(
        &self,
        client: &SyncClient,
        writer: &StoreWriter,
        language: &str,
        mode: WriteMode,
    ) -> PullReport {
        let mut report = PullReport::new(language);

        let items = match client.get_translations(&ListFilters {
            language: Some(language.to_string()),
            ..ListFilters::default()
        }) {
            Ok(items) => items,
            Err(err) => {
                report.errors.push(err.to_string());
                return report;
            }
        };

        let mut flat_entries: BTreeMap<String, String> = BTreeMap::new();
        let mut nested_records: Vec<TranslationRecord> = Vec::new();
        for item in &items {
            match validate_pulled(item) {
                Ok(pulled) => match pulled.file_type {
                    FileType::Nested => nested_records.push(store_record(
                        pulled.key,
                        pulled.value,
                        String::new(),
                        FileType::Nested,
                    )),
                    FileType::Flat => {
                        flat_entries.insert(pulled.key, pulled.value);
                    }
                    // `other` is accepted on the wire but has no store
                    // destination; the record is counted, never written.
                    FileType::Other => {
                        eprintln!(
                            "{} Skipping record \"{}\" for '{}': no store destination for file type 'other'",
                            "warning:".bold().yellow(),
                            pulled.key,
                            language
                        );
                        report.skipped += 1;
                    }
                },
                Err(reason) => {
                    eprintln!(
                        "{} Skipping invalid record for '{}': {}",
                        "warning:".bold().yellow(),
                        language,
                        reason
                    );
                    report.skipped += 1;
                }
            }
        }

        if !flat_entries.is_empty() {
            match writer.write_flat(language, &flat_entries, mode) {
                Ok(outcome) => report.absorb(outcome),
                Err(err) => report.errors.push(err.to_string()),
            }
        }
        let nested_refs: Vec<&TranslationRecord> = nested_records.iter().collect();
        for (namespace, entries) in group_by_namespace(&nested_refs) {
            match writer.write_nested(language, &namespace, &entries, mode) {
                Ok(outcome) => report.absorb(outcome),
                Err(err) => report.errors.push(err.to_string()),
            }
        }
        report
    }

    fn extractor(&self) -> Extractor<'_> {
        Extractor::new(
            &self.patterns,
            &self.resolver,
            ExcludeSet::new(&self.config.excludes),
            self.config.modules_root.clone(),
        )
    }

    /// Roots for one module: manifest subpaths when present, else the
    /// module's directory under the modules root.
    fn module_roots(&self, name: &str) -> Vec<PathBuf> {
        match self.config.modules.get(name) {
            Some(subpaths) if !subpaths.is_empty() => {
                subpaths.iter().map(PathBuf::from).collect()
            }
            _ => vec![Path::new(&self.config.modules_root).join(name)],
        }
    }
}

/// First occurrence of a composite key wins; later duplicates are dropped,
/// not merged. Single pass.
fn dedupe(records: Vec<TranslationRecord>) -> Vec<TranslationRecord> {
    let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert((record.module.clone(), record.key.clone())))
        .collect()
}

fn store_record(
    key: String,
    value: String,
    source_file: String,
    file_type: FileType,
) -> TranslationRecord {
    TranslationRecord {
        key,
        value,
        source_file,
        line_number: None,
        context: String::new(),
        module: None,
        file_type,
        is_direct_text: false,
        source_type: SourceType::TranslationFile,
        created_at: now_timestamp(),
    }
}

/// Validate one remote list item during pull.
///
/// Key and value must be non-empty; a present file-type tag must be a known
/// value; a nested-destined key must contain a namespace separator.
fn validate_pulled(item: &Value) -> Result<PulledRecord, String> {
    let key = item
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if key.is_empty() {
        return Err("missing or empty key".to_string());
    }
    let value = item
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if value.is_empty() {
        return Err(format!("empty value for key \"{}\"", key));
    }

    let file_type = match item.get("file_type") {
        None | Some(Value::Null) => FileType::Flat,
        Some(Value::String(tag)) => tag
            .parse::<FileType>()
            .map_err(|_| format!("unknown file type \"{}\" for key \"{}\"", tag, key))?,
        Some(other) => return Err(format!("malformed file type tag: {}", other)),
    };

    if file_type == FileType::Nested && !key.contains('.') {
        return Err(format!(
            "nested record \"{}\" has no namespace separator",
            key
        ));
    }

    Ok(PulledRecord {
        key,
        value,
        file_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::remote::{HttpBackend, HttpFailure, RetryPolicy, Sleeper};
    use crate::core::store::StoreReader;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let config = Config {
            scan_roots: vec![dir.path().join("src").display().to_string()],
            store_root: dir.path().join("locales").display().to_string(),
            ..Config::default()
        };
        Fixture { dir, config }
    }

    #[test]
    fn test_collect_phases_recorded() {
        let f = fixture();
        write(f.dir.path(), "src/app.py", "m = __(\"hello there\")\n");
        let collector = Collector::new(&f.config).unwrap();
        let outcome = collector.collect(&CollectOptions::default());

        let phases: Vec<ScanPhase> = outcome.stats.phases.iter().map(|p| p.phase).collect();
        assert_eq!(
            phases,
            vec![
                ScanPhase::Idle,
                ScanPhase::ScanningPaths,
                ScanPhase::Deduplicating,
                ScanPhase::Done
            ]
        );
        assert_eq!(outcome.stats.files_scanned, 1);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_dedupe_first_occurrence_wins() {
        let f = fixture();
        write(
            f.dir.path(),
            "src/a.py",
            "x = __(\"dup text one\")\ny = __(\"other text\")\n",
        );
        write(f.dir.path(), "src/b.py", "z = __(\"dup text one\") # again\n");
        let collector = Collector::new(&f.config).unwrap();
        let outcome = collector.collect(&CollectOptions::default());

        let dup: Vec<_> = outcome
            .records
            .iter()
            .filter(|r| r.key == "dup text one")
            .collect();
        assert_eq!(dup.len(), 1);
        assert!(dup[0].source_file.ends_with("a.py"));
        assert_eq!(outcome.stats.duplicates_dropped, 1);
    }

    #[test]
    fn test_collect_idempotent_modulo_created_at() {
        let f = fixture();
        write(f.dir.path(), "src/app.py", "m = __(\"stable text\")\n");
        let collector = Collector::new(&f.config).unwrap();
        let first = collector.collect(&CollectOptions::default());
        let second = collector.collect(&CollectOptions::default());

        assert_eq!(first.records.len(), second.records.len());
        for (a, b) in first.records.iter().zip(second.records.iter()) {
            let mut b = b.clone();
            b.created_at = a.created_at.clone();
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_scan_modules_uses_manifest_paths() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "modules/billing/views.py",
            "m = __(\"billing text\")\n",
        );
        let mut config = Config {
            scan_roots: vec![dir.path().join("src").display().to_string()],
            store_root: dir.path().join("locales").display().to_string(),
            ..Config::default()
        };
        config.modules.insert(
            "billing".to_string(),
            vec![dir.path().join("modules/billing").display().to_string()],
        );
        let collector = Collector::new(&config).unwrap();
        let outcome = collector.scan_modules(&["billing".to_string()]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(
            outcome.records[0].module.as_deref(),
            Some("billing"),
            "module detected from path under modules root"
        );
        assert!(
            outcome
                .stats
                .phases
                .iter()
                .any(|p| p.phase == ScanPhase::ScanningModules)
        );
    }

    #[test]
    fn test_scan_existing_translations() {
        let f = fixture();
        write(
            f.dir.path(),
            "locales/en.json",
            r#"{"user.login.success": "Login successful"}"#,
        );
        write(
            f.dir.path(),
            "locales/en/nested.json",
            r#"{"user": {"profile": {"name": "Name"}}}"#,
        );
        let collector = Collector::new(&f.config).unwrap();
        let records = collector.scan_existing_translations(&["en".to_string()]);

        assert_eq!(records.len(), 2);
        let flat = records.iter().find(|r| r.file_type == FileType::Flat).unwrap();
        assert_eq!(flat.key, "user.login.success");
        assert_eq!(flat.value, "Login successful");
        assert_eq!(flat.source_type, SourceType::TranslationFile);

        let nested = records
            .iter()
            .find(|r| r.file_type == FileType::Nested)
            .unwrap();
        assert_eq!(nested.key, "nested.user.profile.name");
        assert_eq!(nested.value, "Name");
    }

    #[test]
    fn test_validate_pulled() {
        assert!(validate_pulled(&json!({"key": "a.b", "value": "X"})).is_ok());
        assert!(validate_pulled(&json!({"key": "", "value": "X"})).is_err());
        assert!(validate_pulled(&json!({"key": "a.b", "value": ""})).is_err());
        assert!(validate_pulled(&json!({"key": "a.b", "value": "X", "file_type": "bogus"})).is_err());
        // Nested without a namespace separator is rejected.
        assert!(
            validate_pulled(&json!({"key": "simple_key", "value": "X", "file_type": "nested"}))
                .is_err()
        );
        assert!(
            validate_pulled(&json!({"key": "ns.key", "value": "X", "file_type": "nested"})).is_ok()
        );
    }

    struct ScriptedBackend {
        body: String,
    }

    impl HttpBackend for ScriptedBackend {
        fn send(
            &self,
            _method: &str,
            _url: &str,
            _token: &str,
            _body: Option<&Value>,
        ) -> Result<String, HttpFailure> {
            Ok(self.body.clone())
        }
    }

    struct NoSleep;
    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    fn scripted_client(body: &str) -> SyncClient {
        SyncClient::from_parts(
            Box::new(ScriptedBackend {
                body: body.to_string(),
            }),
            Box::new(NoSleep),
            RetryPolicy::default(),
            "https://api.example.com".to_string(),
            "token".to_string(),
            "proj".to_string(),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_pull_language_writes_and_skips() {
        let f = fixture();
        let collector = Collector::new(&f.config).unwrap();
        let client = scripted_client(
            r#"{"success": true, "data": [
                {"key": "auth.login", "value": "Login", "file_type": "nested"},
                {"key": "plain.key", "value": "Plain"},
                {"key": "simple_key", "value": "X", "file_type": "nested"},
                {"key": "empty.value", "value": ""}
            ]}"#,
        );
        let writer = StoreWriter::new(&f.config.store_root);
        let report = collector.pull_language(&client, &writer, "en", WriteMode::Merge);

        assert_eq!(report.skipped, 2);
        assert_eq!(report.written, 2);
        assert!(report.errors.is_empty());

        let reader = StoreReader::new(&f.config.store_root);
        assert_eq!(reader.read_flat("en")["plain.key"], "Plain");
        assert_eq!(reader.read_nested("en")["auth.login"], "Login");
        // The invalid nested record was not written anywhere.
        assert!(!reader.read_flat("en").contains_key("simple_key"));
        assert!(!reader.read_nested("en").contains_key("simple_key"));
    }

    #[test]
    fn test_identical_module_files_each_yield_records() {
        // Two modules whose source files are byte-identical must both
        // surface: the composite (module, key) identities differ, so the
        // extractor may not collapse them by content.
        let f = fixture();
        write(
            f.dir.path(),
            "src/modules/auth/views.py",
            "m = __(\"shared caption\")\n",
        );
        write(
            f.dir.path(),
            "src/modules/billing/views.py",
            "m = __(\"shared caption\")\n",
        );
        let collector = Collector::new(&f.config).unwrap();
        let outcome = collector.collect(&CollectOptions::default());

        let modules: Vec<_> = outcome
            .records
            .iter()
            .map(|r| r.module.as_deref())
            .collect();
        assert_eq!(modules, vec![Some("auth"), Some("billing")]);
        assert_eq!(outcome.stats.duplicates_dropped, 0);
    }

    #[test]
    fn test_pull_language_other_file_type_not_written() {
        let f = fixture();
        let collector = Collector::new(&f.config).unwrap();
        let client = scripted_client(
            r#"{"success": true, "data": [
                {"key": "plain.key", "value": "Plain"},
                {"key": "legacy.key", "value": "Legacy", "file_type": "other"}
            ]}"#,
        );
        let writer = StoreWriter::new(&f.config.store_root);
        let report = collector.pull_language(&client, &writer, "en", WriteMode::Merge);

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 1);

        let reader = StoreReader::new(&f.config.store_root);
        let flat = reader.read_flat("en");
        assert_eq!(flat["plain.key"], "Plain");
        assert!(!flat.contains_key("legacy.key"));
    }

    #[test]
    fn test_pull_language_preview_counts_separately() {
        let f = fixture();
        let collector = Collector::new(&f.config).unwrap();
        let client = scripted_client(
            r#"{"success": true, "data": [
                {"key": "auth.login", "value": "Login", "file_type": "nested"},
                {"key": "plain.key", "value": "Plain"}
            ]}"#,
        );
        let writer = StoreWriter::new(&f.config.store_root);
        let report = collector.pull_language(&client, &writer, "en", WriteMode::Preview);

        assert_eq!(report.written, 0);
        assert_eq!(report.previewed, 2);
        assert!(report.errors.is_empty());

        // A preview touches nothing on disk.
        let reader = StoreReader::new(&f.config.store_root);
        assert!(reader.read_flat("en").is_empty());
        assert!(reader.read_nested("en").is_empty());
    }

    #[test]
    fn test_pull_language_remote_failure_is_contained() {
        let f = fixture();
        let collector = Collector::new(&f.config).unwrap();
        let client = scripted_client(r#"{"success": false, "message": "denied"}"#);
        let writer = StoreWriter::new(&f.config.store_root);
        let reports = collector.pull_languages(
            &client,
            &writer,
            &["en".to_string(), "ja".to_string()],
            WriteMode::Merge,
        );

        assert_eq!(reports.len(), 2, "second language still processed");
        assert!(reports.iter().all(|r| r.errors.len() == 1));
    }

    #[test]
    fn test_missing_scan_root_non_fatal() {
        let f = fixture();
        let collector = Collector::new(&f.config).unwrap();
        let outcome = collector.collect(&CollectOptions::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.files_scanned, 0);
    }
}
