use std::path::{Path, PathBuf};

use colored::Colorize;
use glob::Pattern;
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal path prefixes.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Compiled exclusion set: glob patterns matched against the path relative
/// to the scan root, plus literal prefixes.
pub struct ExcludeSet {
    globs: Vec<Pattern>,
    literals: Vec<PathBuf>,
}

impl ExcludeSet {
    pub fn new(excludes: &[String]) -> Self {
        let mut globs = Vec::new();
        let mut literals = Vec::new();
        for raw in excludes {
            if is_glob_pattern(raw) {
                match Pattern::new(raw) {
                    Ok(pattern) => globs.push(pattern),
                    Err(err) => {
                        eprintln!(
                            "{} Invalid exclude pattern '{}': {}",
                            "warning:".bold().yellow(),
                            raw,
                            err
                        );
                    }
                }
            } else {
                literals.push(PathBuf::from(raw));
            }
        }
        Self { globs, literals }
    }

    pub fn matches(&self, relative: &Path) -> bool {
        if self.literals.iter().any(|lit| relative.starts_with(lit)) {
            return true;
        }
        self.globs.iter().any(|g| g.matches_path(relative))
    }
}

/// Enumerate regular files under `root`, honoring the exclusion set.
///
/// Returns paths in sorted order for deterministic output. A missing root
/// yields an empty list; the caller decides how loudly to report it.
pub fn enumerate_files(root: &Path, excludes: &ExcludeSet) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.matches(relative) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    files
}
