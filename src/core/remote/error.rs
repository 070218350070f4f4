use thiserror::Error;

/// Errors crossing the remote-client boundary.
///
/// Everything else (per-batch failures, invalid pulled records) is reported
/// as data, not raised.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with `success: false`. Not retried.
    #[error("remote rejected request: {message}")]
    Protocol {
        message: String,
        detail: Option<serde_json::Value>,
    },

    /// Network or timeout failure that survived the whole retry chain.
    #[error("transport failure after {attempts} attempt(s): {detail}")]
    Transport { attempts: u32, detail: String },

    /// Empty or non-JSON response body.
    #[error("bad response format: {0}")]
    BadFormat(String),
}
