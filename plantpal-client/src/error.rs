//! Error types for plantpal-client

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local validation failed; no network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// The relay could not be reached or its reply could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was markup or invalid JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
