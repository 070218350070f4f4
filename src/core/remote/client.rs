use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::error::RemoteError;
use super::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::config::RemoteConfig;
use crate::core::record::TranslationRecord;

/// Uniform response wrapper used by every remote endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Result of uploading one chunk during `batch_upload`.
///
/// Partial failure is an expected outcome: a failed chunk is recorded here
/// and later chunks still run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub batch_index: usize,
}

/// Filters for `get_translations`.
#[derive(Debug, Default, Clone)]
pub struct ListFilters {
    pub language: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Transport failure modes surfaced by the HTTP backend.
#[derive(Debug)]
pub enum HttpFailure {
    /// Connection/timeout class problems; retried per policy.
    Transport(String),
    /// Non-2xx status; the body may still carry an envelope.
    Status(u16, String),
}

/// HTTP seam: the production backend wraps a `ureq::Agent`; tests script
/// responses and record requests.
pub trait HttpBackend {
    fn send(
        &self,
        method: &str,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<String, HttpFailure>;
}

struct UreqBackend {
    agent: ureq::Agent,
}

impl UreqBackend {
    fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        Self { agent }
    }
}

impl HttpBackend for UreqBackend {
    fn send(
        &self,
        method: &str,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<String, HttpFailure> {
        let request = self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", token))
            .set("Accept", "application/json");

        let response = match body {
            Some(payload) => request.send_json(payload.clone()),
            None => request.call(),
        };

        match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|err| HttpFailure::Transport(err.to_string())),
            Err(ureq::Error::Status(code, resp)) => {
                Err(HttpFailure::Status(code, resp.into_string().unwrap_or_default()))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(HttpFailure::Transport(transport.to_string()))
            }
        }
    }
}

/// Synchronous client for the translation-management API.
///
/// Every request carries the bearer token and project id. Transport failures
/// are retried per policy with a linear backoff; `success: false` envelopes
/// surface immediately as protocol errors.
pub struct SyncClient {
    backend: Box<dyn HttpBackend>,
    sleeper: Box<dyn Sleeper>,
    policy: RetryPolicy,
    api_url: String,
    token: String,
    project_id: String,
    batch_pause: Duration,
}

impl SyncClient {
    pub fn new(remote: &RemoteConfig, token: impl Into<String>) -> Self {
        Self::from_parts(
            Box::new(UreqBackend::new(Duration::from_secs(remote.timeout_secs))),
            Box::new(ThreadSleeper),
            RetryPolicy {
                max_attempts: remote.max_attempts.max(1),
                base_delay: Duration::from_millis(remote.base_delay_ms),
            },
            remote.api_url.clone(),
            token.into(),
            remote.project_id.clone(),
            Duration::from_millis(remote.batch_pause_ms),
        )
    }

    /// Assemble a client from parts. The backend and sleeper seams exist so
    /// tests can script responses and observe sleeps.
    pub fn from_parts(
        backend: Box<dyn HttpBackend>,
        sleeper: Box<dyn Sleeper>,
        policy: RetryPolicy,
        api_url: String,
        token: String,
        project_id: String,
        batch_pause: Duration,
    ) -> Self {
        Self {
            backend,
            sleeper,
            policy,
            api_url,
            token,
            project_id,
            batch_pause,
        }
    }

    /// Incremental push of newly found records.
    pub fn add_translations(
        &self,
        records: &[TranslationRecord],
        languages: &[String],
    ) -> Result<ApiEnvelope, RemoteError> {
        let payload = json!({
            "project_id": self.project_id,
            "languages": languages,
            "translations": records.iter().map(add_item).collect::<Vec<_>>(),
        });
        self.request("POST", "translations/add", Some(&payload))
    }

    /// Bulk push of resolved value + language pairs for first-time
    /// integration.
    pub fn init_translations(
        &self,
        records: &[TranslationRecord],
        language: &str,
    ) -> Result<ApiEnvelope, RemoteError> {
        let payload = json!({
            "project_id": self.project_id,
            "translations": records
                .iter()
                .map(|r| init_item(r, language))
                .collect::<Vec<_>>(),
        });
        self.request("POST", "translations/init", Some(&payload))
    }

    /// Retrieve records matching the filters.
    ///
    /// Returns the envelope's `data` array; a malformed body yields an empty
    /// list so the caller decides whether that is fatal. A `success: false`
    /// envelope still surfaces as a protocol error.
    pub fn get_translations(&self, filters: &ListFilters) -> Result<Vec<Value>, RemoteError> {
        let mut query = format!("project_id={}", encode_query_value(&self.project_id));
        if let Some(language) = &filters.language {
            query.push_str(&format!("&language={}", encode_query_value(language)));
        }
        if let Some(page) = filters.page {
            query.push_str(&format!("&page={}", page));
        }
        if let Some(per_page) = filters.per_page {
            query.push_str(&format!("&per_page={}", per_page));
        }

        match self.request("GET", &format!("translations/list?{}", query), None) {
            Ok(envelope) => Ok(envelope
                .data
                .and_then(|d| d.as_array().cloned())
                .unwrap_or_default()),
            Err(RemoteError::BadFormat(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Upload records in chunks of `batch_size`, sequentially, pausing
    /// between chunks. One chunk's failure never aborts the rest.
    pub fn batch_upload(
        &self,
        records: &[TranslationRecord],
        languages: &[String],
        batch_size: usize,
    ) -> Vec<BatchOutcome> {
        let batch_size = batch_size.max(1);
        let chunks: Vec<&[TranslationRecord]> = records.chunks(batch_size).collect();
        let total = chunks.len();
        let mut outcomes = Vec::with_capacity(total);

        for (batch_index, chunk) in chunks.into_iter().enumerate() {
            let outcome = match self.add_translations(chunk, languages) {
                Ok(_) => BatchOutcome {
                    success: true,
                    error: None,
                    batch_index,
                },
                Err(err) => BatchOutcome {
                    success: false,
                    error: Some(err.to_string()),
                    batch_index,
                },
            };
            outcomes.push(outcome);

            if batch_index + 1 < total {
                self.sleeper.sleep(self.batch_pause);
            }
        }
        outcomes
    }

    /// Health probe. Never errors: any failure converts to `false`. Any
    /// non-empty JSON object body is tolerated as healthy.
    pub fn check_connection(&self) -> bool {
        let url = self.endpoint("health");
        match self.backend.send("GET", &url, &self.token, None) {
            Ok(body) => matches!(
                serde_json::from_str::<Value>(&body),
                Ok(Value::Object(map)) if !map.is_empty()
            ),
            Err(_) => false,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiEnvelope, RemoteError> {
        let url = self.endpoint(path);
        let mut attempt = 1;
        loop {
            match self.backend.send(method, &url, &self.token, body) {
                Ok(body) => return parse_envelope(&body),
                // The envelope, when present, is more precise than the
                // status code alone.
                Err(HttpFailure::Status(_, body)) => return parse_envelope(&body),
                Err(HttpFailure::Transport(detail)) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(RemoteError::Transport {
                            attempts: attempt,
                            detail,
                        });
                    }
                    self.sleeper.sleep(self.policy.delay_for(attempt));
                    attempt += 1;
                }
            }
        }
    }
}

/// Percent-encode one query-string value. Unreserved characters pass
/// through; everything else, reserved delimiters included, becomes `%XX`
/// so values like `pt BR` or keys containing `&` cannot corrupt the query.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn parse_envelope(body: &str) -> Result<ApiEnvelope, RemoteError> {
    if body.trim().is_empty() {
        return Err(RemoteError::BadFormat("empty response body".to_string()));
    }
    let envelope: ApiEnvelope = serde_json::from_str(body)
        .map_err(|err| RemoteError::BadFormat(err.to_string()))?;
    if !envelope.success {
        return Err(RemoteError::Protocol {
            message: envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
            detail: envelope.error,
        });
    }
    Ok(envelope)
}

fn add_item(record: &TranslationRecord) -> Value {
    json!({
        "key": record.key,
        "default_text": record.value,
        "source_file": record.source_file,
        "line_number": record.line_number,
        "context": record.context,
        "module": record.module,
        "metadata": {
            "file_type": record.file_type.to_string(),
            "created_at": record.created_at,
        },
    })
}

fn init_item(record: &TranslationRecord, language: &str) -> Value {
    json!({
        "key": record.key,
        "default_text": record.key,
        "value": record.value,
        "language": language,
        "module": record.module,
        "metadata": {
            "file_type": record.file_type.to_string(),
            "created_at": record.created_at,
        },
    })
}
