//! Difference engine over two record collections.
//!
//! Records are partitioned by composite `(module, key)` identity. `updated`
//! compares structural metadata only (source file, line number, context),
//! never the resolved value: two snapshots with identical metadata but a
//! changed value classify as `unchanged`. That is the intended semantics of
//! the sync protocol, not an oversight.

use std::collections::{HashMap, HashSet};

use crate::core::record::TranslationRecord;

#[derive(Debug, Default)]
pub struct DifferenceSet {
    /// Present only in the collected side.
    pub new: Vec<TranslationRecord>,
    /// Present in both, with differing source file, line, or context.
    pub updated: Vec<TranslationRecord>,
    /// Present only in the existing side.
    pub deleted: Vec<TranslationRecord>,
    /// Present in both with identical metadata.
    pub unchanged: Vec<TranslationRecord>,
}

pub fn analyze_differences(
    collected: &[TranslationRecord],
    existing: &[TranslationRecord],
) -> DifferenceSet {
    let mut existing_by_key: HashMap<(Option<&str>, &str), &TranslationRecord> = HashMap::new();
    for record in existing {
        // First occurrence wins when one side carries duplicates.
        existing_by_key.entry(record.composite_key()).or_insert(record);
    }

    let mut diff = DifferenceSet::default();
    let mut collected_keys: HashSet<(Option<&str>, &str)> = HashSet::new();

    for record in collected {
        if !collected_keys.insert(record.composite_key()) {
            continue;
        }
        match existing_by_key.get(&record.composite_key()) {
            None => diff.new.push(record.clone()),
            Some(old) if metadata_differs(record, old) => diff.updated.push(record.clone()),
            Some(_) => diff.unchanged.push(record.clone()),
        }
    }

    let mut deleted_keys: HashSet<(Option<&str>, &str)> = HashSet::new();
    for record in existing {
        let key = record.composite_key();
        if collected_keys.contains(&key) || !deleted_keys.insert(key) {
            continue;
        }
        diff.deleted.push(record.clone());
    }

    diff
}

fn metadata_differs(a: &TranslationRecord, b: &TranslationRecord) -> bool {
    a.source_file != b.source_file || a.line_number != b.line_number || a.context != b.context
}
