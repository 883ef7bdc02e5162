// src/error.rs
// Per-stage error kinds. Stages return these; the orchestration layer in
// `api` decides to log and degrade to an empty value rather than propagate.

use thiserror::Error;

/// Failures of the upstream fetch stage.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Configuration: the credential env var is unset or empty.
    #[error("NEWS_API_KEY is not set")]
    MissingApiKey,
    /// Transport: connectivity, timeout, or non-2xx at the HTTP layer.
    #[error("news api request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Transport: the API answered but reported a non-ok status.
    #[error("news api returned status `{code}`: {message}")]
    ApiStatus { code: String, message: String },
    /// Shape: the response body is not a valid NewsAPI payload.
    #[error("decoding news api response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MissingApiKey => "config",
            FetchError::Http(_) => "transport",
            FetchError::ApiStatus { .. } => "api_status",
            FetchError::Decode(_) => "decode",
        }
    }
}

/// Failures of the normalization stage. Any of these rejects the whole batch;
/// a collection is either fully valid or empty, never partial.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("article is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("cannot parse publishedAt `{value}`: {source}")]
    BadTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl ProcessError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::MissingField { .. } => "missing_field",
            ProcessError::BadTimestamp { .. } => "bad_timestamp",
        }
    }
}
