//! Synchronous client for the remote translation-management service.

pub mod client;
pub mod error;
pub mod retry;

pub use client::{ApiEnvelope, BatchOutcome, HttpBackend, HttpFailure, ListFilters, SyncClient};
pub use error::RemoteError;
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
