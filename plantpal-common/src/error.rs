//! Common error types for PlantPal

use thiserror::Error;

/// Common result type for PlantPal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the relay and the client
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Render an error and its source chain on one line
///
/// HTTP client errors are generic at the top ("error sending request") with
/// the useful part (connection refused, DNS failure) in their sources. Some
/// layers already print their source in their own message; a cause whose text
/// is already on the line is skipped.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
