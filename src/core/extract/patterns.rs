use std::collections::BTreeMap;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::FileTypePatterns;

struct CompiledFileType {
    suffixes: Vec<String>,
    /// Inherited base patterns first, then the type's own, in config order.
    patterns: Vec<Regex>,
}

/// Compiled per-file-type regex table.
///
/// Template types chain their base type's patterns ahead of their own, so a
/// `.html.tera` file runs the base language's extraction patterns plus the
/// template-specific ones. The same text matching twice across patterns is
/// fine; the collector deduplicates later.
pub struct PatternTable {
    types: BTreeMap<String, CompiledFileType>,
}

impl PatternTable {
    pub fn from_config(file_types: &BTreeMap<String, FileTypePatterns>) -> Result<Self> {
        let mut types = BTreeMap::new();
        for (name, file_type) in file_types {
            let mut sources: Vec<&str> = Vec::new();
            collect_patterns(file_types, name, &mut sources, &mut Vec::new());

            let mut patterns = Vec::with_capacity(sources.len());
            for source in sources {
                let regex = Regex::new(source).with_context(|| {
                    format!("Invalid regex in file type '{}': \"{}\"", name, source)
                })?;
                patterns.push(regex);
            }
            types.insert(
                name.clone(),
                CompiledFileType {
                    suffixes: file_type.suffixes.clone(),
                    patterns,
                },
            );
        }
        Ok(Self { types })
    }

    /// Detect the file type claiming `file_name`.
    ///
    /// Suffixes match against the whole file name, so a compound suffix like
    /// `.html.tera` wins over `.tera` or a bare extension check. The longest
    /// matching suffix across all types decides.
    pub fn detect(&self, file_name: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (name, file_type) in &self.types {
            for suffix in &file_type.suffixes {
                if file_name.ends_with(suffix.as_str()) {
                    let better = match best {
                        Some((_, len)) => suffix.len() > len,
                        None => true,
                    };
                    if better {
                        best = Some((name.as_str(), suffix.len()));
                    }
                }
            }
        }
        best.map(|(name, _)| name)
    }

    pub fn patterns_for(&self, type_name: &str) -> &[Regex] {
        self.types
            .get(type_name)
            .map(|t| t.patterns.as_slice())
            .unwrap_or(&[])
    }
}

/// Walk the inheritance chain, base patterns first. `seen` guards against
/// config cycles.
fn collect_patterns<'a>(
    file_types: &'a BTreeMap<String, FileTypePatterns>,
    name: &str,
    out: &mut Vec<&'a str>,
    seen: &mut Vec<String>,
) {
    if seen.iter().any(|s| s == name) {
        return;
    }
    seen.push(name.to_string());

    let Some(file_type) = file_types.get(name) else {
        return;
    };
    if let Some(base) = &file_type.inherits {
        collect_patterns(file_types, base, out, seen);
    }
    out.extend(file_type.patterns.iter().map(String::as_str));
}
