//! Service-level errors for the REST layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while talking to the service API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {detail}")]
    Status {
        status: StatusCode,
        detail: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A human-supplied name did not resolve to any known identifier.
    #[error("no {kind} named '{name}' found")]
    NotFound { kind: &'static str, name: String },
}

impl ApiError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}
