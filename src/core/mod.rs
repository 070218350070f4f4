//! Core engine: extraction, resolution, store I/O, diffing, remote sync.

pub mod collector;
pub mod diff;
pub mod extract;
pub mod record;
pub mod remote;
pub mod resolve;
pub mod store;

pub use collector::{CollectOptions, CollectOutcome, Collector, PullReport};
pub use diff::{DifferenceSet, analyze_differences};
pub use record::{
    CollectStats, FileType, PhaseTiming, ScanPhase, SourceType, TranslationRecord,
};
pub use resolve::{Resolution, Resolver, TextClass, classify};
