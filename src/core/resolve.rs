//! Classification and resolution of extracted text.
//!
//! Extracted text is either a lookup key (dotted ASCII identifiers, at least
//! two segments) resolved against the translation stores, or literal text
//! used as its own translation value.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::core::record::FileType;
use crate::core::store::StoreReader;

/// Dotted-identifier shape: letter-led ASCII identifiers joined by dots,
/// two or more segments. Anything else is literal text.
static LOOKUP_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    Literal,
    LookupKey,
}

pub fn classify(text: &str) -> TextClass {
    if LOOKUP_KEY_REGEX.is_match(text) {
        TextClass::LookupKey
    } else {
        TextClass::Literal
    }
}

/// Outcome of resolving one piece of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: String,
    pub file_type: FileType,
    pub is_direct_text: bool,
}

/// Resolves extracted text against the default language's stores.
///
/// Lookup order: the nested store first (first dot segment names the
/// namespace, the rest walks that namespace's tree), then the flat store
/// keyed by the whole dotted string. First hit wins.
///
/// A lookup key absent from both stores resolves to `None` and the caller
/// drops the candidate; with `collect_unresolved` set, the key is emitted
/// as direct text instead.
pub struct Resolver {
    nested: BTreeMap<String, String>,
    flat: BTreeMap<String, String>,
    collect_unresolved: bool,
}

impl Resolver {
    /// Load the default language's stores once, up front.
    pub fn from_store(reader: &StoreReader, default_language: &str, collect_unresolved: bool) -> Self {
        Self {
            nested: reader.read_nested(default_language),
            flat: reader.read_flat(default_language),
            collect_unresolved,
        }
    }

    #[cfg(test)]
    pub fn from_entries(
        nested: BTreeMap<String, String>,
        flat: BTreeMap<String, String>,
        collect_unresolved: bool,
    ) -> Self {
        Self {
            nested,
            flat,
            collect_unresolved,
        }
    }

    pub fn resolve(&self, text: &str) -> Option<Resolution> {
        match classify(text) {
            TextClass::Literal => Some(direct_text(text)),
            TextClass::LookupKey => {
                if let Some(value) = self.nested.get(text) {
                    return Some(Resolution {
                        value: value.clone(),
                        file_type: FileType::Nested,
                        is_direct_text: false,
                    });
                }
                if let Some(value) = self.flat.get(text) {
                    return Some(Resolution {
                        value: value.clone(),
                        file_type: FileType::Flat,
                        is_direct_text: false,
                    });
                }
                if self.collect_unresolved {
                    return Some(direct_text(text));
                }
                None
            }
        }
    }
}

fn direct_text(text: &str) -> Resolution {
    Resolution {
        value: text.to_string(),
        file_type: FileType::Flat,
        is_direct_text: true,
    }
}
