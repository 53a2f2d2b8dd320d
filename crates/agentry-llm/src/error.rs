//! Error types for the LLM client

use thiserror::Error;

/// Result alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors produced while talking to a chat or embeddings endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or invalid client configuration
    #[error("configuration error: {message}")]
    Configuration {
        /// What was wrong
        message: String,
    },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        body: String,
    },

    /// The endpoint answered without any choice or embedding
    #[error("empty response from model")]
    EmptyResponse,

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LlmError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an API error from a status code and body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Whether retrying the same request might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for LlmError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}
