//! Locsync - translation key extraction and synchronization
//!
//! Locsync is a CLI tool and library for keeping application source code and a
//! translation-management service in sync. It scans source trees for
//! translation references, resolves them against per-language translation
//! stores (flat key/value files or nested per-namespace trees), computes the
//! difference against existing records, and pushes/pulls records over the
//! remote API.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, resolution, store I/O, diffing, remote sync
//!
//! ## Concurrency
//!
//! One invocation runs single-threaded and synchronous end to end: directory
//! walks, regex passes, store reads/writes and HTTP calls all execute
//! sequentially. Translation store files are read fully and written fully with
//! no cross-process locking, so concurrent invocations against the same store
//! file are not guaranteed consistent.

pub mod cli;
pub mod config;
pub mod core;
