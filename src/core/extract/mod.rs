//! Pattern-based extraction of translation references from source trees.

pub mod extractor;
pub mod patterns;
pub mod scanner;

pub use extractor::{Extractor, RootScan};
pub use patterns::PatternTable;
pub use scanner::{ExcludeSet, enumerate_files};
