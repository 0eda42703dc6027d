//! Typed errors for LLM operations
//!
//! Lets callers tell auth problems, throttling and transport failures apart
//! without string matching. The agents only log and report these; nothing retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// API key rejected (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Quota or rate limit exceeded (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Connection refused, timeout, DNS failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LlmError {
    /// Convert HTTP status code and error text into typed LlmError
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        match status.as_u16() {
            401 => LlmError::Unauthorized(error_text),
            429 => LlmError::RateLimited(error_text),
            400 => LlmError::BadRequest(error_text),
            500..=599 => LlmError::ServiceError(error_text),
            _ => LlmError::Other(anyhow::anyhow!("HTTP {}: {}", status, error_text)),
        }
    }

    /// Convert network/connection errors into typed LlmError
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else if let Some(status) = e.status() {
            let error_text = e.to_string();
            Self::from_http_status(status, error_text)
        } else {
            LlmError::Other(e.into())
        }
    }
}
