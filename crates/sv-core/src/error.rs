//! Error types for the Sigview core.

use thiserror::Error;

/// Errors produced by the pure core: transformers, normalizers, and helpers.
///
/// Transformers are total over missing *optional* fields. They fail only
/// when a response is structurally incompatible with the expected shape
/// (wrong JSON type, or missing mandatory identity fields), or when a
/// caller passes invalid input to a pure helper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A 200-class response body failed shape validation in a transformer.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid caller input to a pure helper.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Shorthand for a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        CoreError::MalformedResponse(message.into())
    }

    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
