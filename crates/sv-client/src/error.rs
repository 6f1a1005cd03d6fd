//! Client error taxonomy.

use serde_json::Value;
use sv_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the API client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received at all.
    #[error("network error: {0}")]
    Network(String),

    /// The transport-level timeout elapsed.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The backend answered with a 4xx/5xx status.
    #[error("http {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Parsed error body, when the backend sent JSON.
        body: Option<Value>,
    },

    /// A 2xx response whose body failed shape validation, or invalid
    /// caller input to a core helper.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Client construction or configuration failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Transient errors eligible for bounded automatic retry: network
    /// failures, timeouts, and 5xx responses. Client errors (4xx) are
    /// never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
