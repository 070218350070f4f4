use std::{
    collections::HashSet,
    fs,
    hash::{DefaultHasher, Hash, Hasher},
    path::{Component, Path, PathBuf},
};

use colored::Colorize;

use super::patterns::PatternTable;
use super::scanner::{ExcludeSet, enumerate_files};
use crate::core::record::{SourceType, TranslationRecord, now_timestamp};
use crate::core::resolve::Resolver;

/// Byte radius of the context window captured around each match.
const CONTEXT_RADIUS: usize = 40;

/// Result of scanning one root.
#[derive(Debug, Default)]
pub struct RootScan {
    pub records: Vec<TranslationRecord>,
    pub files_scanned: usize,
    pub unresolved_dropped: usize,
}

impl RootScan {
    pub fn absorb(&mut self, other: RootScan) {
        self.records.extend(other.records);
        self.files_scanned += other.files_scanned;
        self.unresolved_dropped += other.unresolved_dropped;
    }
}

/// Walks directory trees and extracts candidate translation references.
///
/// Each file's content is loaded once; the ordered regex list for the file's
/// detected type runs over it, and capture group 1 of every match becomes
/// candidate text handed to the resolver. Candidates that fail resolution
/// are logged and dropped, never emitted as placeholder records.
pub struct Extractor<'a> {
    patterns: &'a PatternTable,
    resolver: &'a Resolver,
    excludes: ExcludeSet,
    modules_root: String,
    /// Files already extracted in this run, keyed by path and content hash.
    /// Only a true rescan of the same unchanged file is skipped; a distinct
    /// file with identical bytes still yields its own records.
    seen: HashSet<(PathBuf, u64)>,
}

impl<'a> Extractor<'a> {
    pub fn new(
        patterns: &'a PatternTable,
        resolver: &'a Resolver,
        excludes: ExcludeSet,
        modules_root: impl Into<String>,
    ) -> Self {
        Self {
            patterns,
            resolver,
            excludes,
            modules_root: modules_root.into(),
            seen: HashSet::new(),
        }
    }

    /// Scan one root directory.
    ///
    /// A missing root is non-fatal: it logs a warning and yields zero
    /// records so remaining roots still get processed.
    pub fn scan_root(&mut self, root: &Path) -> RootScan {
        let mut scan = RootScan::default();
        if !root.is_dir() {
            eprintln!(
                "{} Scan root does not exist, skipping: {}",
                "warning:".bold().yellow(),
                root.display()
            );
            return scan;
        }

        for path in enumerate_files(root, &self.excludes) {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(file_type) = self.patterns.detect(file_name) else {
                continue;
            };
            let Ok(content) = fs::read_to_string(&path) else {
                // Unreadable or non-UTF-8 content is skipped, not fatal.
                continue;
            };
            scan.files_scanned += 1;

            if !self.seen.insert((path.clone(), content_hash(&content))) {
                continue;
            }
            self.extract_file(&path, file_type, &content, &mut scan);
        }
        scan
    }

    fn extract_file(&self, path: &Path, file_type: &str, content: &str, scan: &mut RootScan) {
        let source_file = path.display().to_string();
        let module = detect_module(path, &self.modules_root);

        for pattern in self.patterns.patterns_for(file_type) {
            for captures in pattern.captures_iter(content) {
                let Some(group) = captures.get(1) else {
                    continue;
                };
                let text = group.as_str();
                if text.is_empty() {
                    continue;
                }

                let full = captures.get(0).unwrap_or(group);
                let line = line_number(content, full.start());

                let Some(resolution) = self.resolver.resolve(text) else {
                    eprintln!(
                        "{} Unresolved key at {}:{}: \"{}\"",
                        "warning:".bold().yellow(),
                        source_file,
                        line,
                        text
                    );
                    scan.unresolved_dropped += 1;
                    continue;
                };

                scan.records.push(TranslationRecord {
                    key: text.to_string(),
                    value: resolution.value,
                    source_file: source_file.clone(),
                    line_number: Some(line),
                    context: context_window(content, full.start(), full.end()),
                    module: module.clone(),
                    file_type: resolution.file_type,
                    is_direct_text: resolution.is_direct_text,
                    source_type: SourceType::CodeScan,
                    created_at: now_timestamp(),
                });
            }
        }
    }
}

fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// 1-based line number: count of newlines before the match's byte offset.
fn line_number(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Fixed byte radius around the full match, clipped to file bounds and
/// snapped outward to char boundaries.
fn context_window(content: &str, start: usize, end: usize) -> String {
    let mut lo = start.saturating_sub(CONTEXT_RADIUS);
    while lo > 0 && !content.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_RADIUS).min(content.len());
    while hi < content.len() && !content.is_char_boundary(hi) {
        hi += 1;
    }
    content[lo..hi].to_string()
}

/// Module name: the first path segment under the modules root, else absent.
fn detect_module(path: &Path, modules_root: &str) -> Option<String> {
    let mut components = path.components();
    while let Some(component) = components.next() {
        if matches!(component, Component::Normal(name) if name == modules_root) {
            return match components.next() {
                Some(Component::Normal(name)) => name.to_str().map(String::from),
                _ => None,
            };
        }
    }
    None
}
