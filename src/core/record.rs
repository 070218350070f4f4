use std::{fmt, str::FromStr, time::Duration};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Store format a record belongs to.
///
/// `Flat` is the generic default: literal text and flat-store hits both carry
/// it. `Nested` marks records resolved from (or destined for) a per-namespace
/// tree file. `Other` covers tags we accept from the remote but do not write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Flat,
    Nested,
    Other,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Flat => write!(f, "flat"),
            FileType::Nested => write!(f, "nested"),
            FileType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for FileType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(FileType::Flat),
            "nested" => Ok(FileType::Nested),
            "other" => Ok(FileType::Other),
            _ => Err(()),
        }
    }
}

/// Where a record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    CodeScan,
    TranslationFile,
}

/// A single translation reference, either extracted from source code or read
/// back from a translation store.
///
/// Records are ephemeral: they are recomputed on every invocation and carry
/// no identity across runs. Invariants: `key` is non-empty, and
/// `is_direct_text == true` implies `value == key`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationRecord {
    pub key: String,
    pub value: String,
    pub source_file: String,
    /// 1-based line number; only present for code-scan records.
    pub line_number: Option<usize>,
    /// Bounded snippet of the text surrounding the match.
    pub context: String,
    pub module: Option<String>,
    pub file_type: FileType,
    pub is_direct_text: bool,
    pub source_type: SourceType,
    pub created_at: String,
}

impl TranslationRecord {
    /// Composite identity used by deduplication and the difference engine.
    ///
    /// An absent module is a distinct, stable value: `None` never compares
    /// equal to `Some("")`.
    pub fn composite_key(&self) -> (Option<&str>, &str) {
        (self.module.as_deref(), &self.key)
    }
}

/// Current UTC timestamp for `created_at`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Phases of one collect run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    ScanningPaths,
    ScanningModules,
    Deduplicating,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "idle"),
            ScanPhase::ScanningPaths => write!(f, "scanning-paths"),
            ScanPhase::ScanningModules => write!(f, "scanning-modules"),
            ScanPhase::Deduplicating => write!(f, "deduplicating"),
            ScanPhase::Done => write!(f, "done"),
        }
    }
}

/// Timing and counters recorded at one phase transition.
#[derive(Debug, Clone)]
pub struct PhaseTiming {
    pub phase: ScanPhase,
    pub elapsed: Duration,
    pub files_scanned: usize,
    pub records_found: usize,
}

/// Statistics for one collect run.
///
/// Returned as an explicit value from each call rather than accumulated in
/// shared state, so callers compose without hidden coupling.
#[derive(Debug, Clone, Default)]
pub struct CollectStats {
    pub files_scanned: usize,
    pub records_found: usize,
    pub duplicates_dropped: usize,
    pub unresolved_dropped: usize,
    pub phases: Vec<PhaseTiming>,
}

impl CollectStats {
    pub fn record_phase(&mut self, phase: ScanPhase, elapsed: Duration) {
        self.phases.push(PhaseTiming {
            phase,
            elapsed,
            files_scanned: self.files_scanned,
            records_found: self.records_found,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(module: Option<&str>, key: &str) -> TranslationRecord {
        TranslationRecord {
            key: key.to_string(),
            value: key.to_string(),
            source_file: "src/app.py".to_string(),
            line_number: Some(1),
            context: String::new(),
            module: module.map(String::from),
            file_type: FileType::Flat,
            is_direct_text: true,
            source_type: SourceType::CodeScan,
            created_at: now_timestamp(),
        }
    }

    #[test]
    fn test_file_type_parse_and_display() {
        assert_eq!("flat".parse::<FileType>().unwrap(), FileType::Flat);
        assert_eq!("nested".parse::<FileType>().unwrap(), FileType::Nested);
        assert!("json".parse::<FileType>().is_err());
        assert_eq!(FileType::Nested.to_string(), "nested");
    }

    #[test]
    fn test_composite_key_distinguishes_absent_module() {
        let absent = record(None, "user.login");
        let empty = record(Some(""), "user.login");
        assert_ne!(absent.composite_key(), empty.composite_key());
    }

    #[test]
    fn test_record_serializes_enum_tags() {
        let json = serde_json::to_value(record(Some("billing"), "a.b")).unwrap();
        assert_eq!(json["file_type"], "flat");
        assert_eq!(json["source_type"], "code_scan");
    }

    #[test]
    fn test_now_timestamp_shape() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'), "expected UTC timestamp, got {ts}");
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_phase_timing_snapshots_counters() {
        let mut stats = CollectStats::default();
        stats.files_scanned = 3;
        stats.records_found = 7;
        stats.record_phase(ScanPhase::ScanningPaths, Duration::from_millis(5));
        assert_eq!(stats.phases.len(), 1);
        assert_eq!(stats.phases[0].files_scanned, 3);
        assert_eq!(stats.phases[0].records_found, 7);
    }
}
