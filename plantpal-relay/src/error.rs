//! Error types for plantpal-relay
//!
//! Only failures inside the relay produce a locally synthesized body (see
//! [`ErrorBody`]). Upstream error responses are not errors here; they are
//! relayed like any other reply.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plantpal_common::api::{ErrorBody, NO_IMAGE_ERROR};
use thiserror::Error;

/// Relay error type
#[derive(Debug, Error)]
pub enum RelayError {
    /// Request carried no usable image part (400)
    #[error("No image uploaded")]
    NoImage(Option<String>),

    /// Request body exceeded the configured upload limit (413)
    #[error("Image too large: {0}")]
    TooLarge(String),

    /// Upstream did not answer within the configured timeout (500)
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// Connecting to upstream or reading its reply failed (500)
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoImage(_) => StatusCode::BAD_REQUEST,
            RelayError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Timeout(_) | RelayError::Transport(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            RelayError::NoImage(None) => ErrorBody::new(NO_IMAGE_ERROR),
            RelayError::NoImage(Some(detail)) => ErrorBody::with_detail(NO_IMAGE_ERROR, detail),
            RelayError::TooLarge(detail) => ErrorBody::with_detail("Image too large", detail),
            RelayError::Timeout(detail) => {
                ErrorBody::with_detail("Identification service timed out", detail)
            }
            RelayError::Transport(detail) => {
                ErrorBody::with_detail("Failed to reach identification service", detail)
            }
            RelayError::Internal(detail) => ErrorBody::with_detail("Internal error", detail),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::NoImage(None).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::TooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RelayError::Timeout("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Transport("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_no_image_body() {
        assert_eq!(RelayError::NoImage(None).body(), ErrorBody::new("No image uploaded"));
    }

    #[test]
    fn test_local_4xx_bodies() {
        let body = RelayError::NoImage(Some("not a multipart body".into())).body();
        assert_eq!(body.error, NO_IMAGE_ERROR);
        assert_eq!(body.detail.as_deref(), Some("not a multipart body"));

        let body = RelayError::TooLarge("limit is 10485760 bytes".into()).body();
        assert_eq!(body.error, "Image too large");
        assert!(body.detail.is_some());
    }

    #[test]
    fn test_transport_body_has_detail() {
        let body = RelayError::Transport("connection refused".into()).body();

        assert_eq!(body.error, "Failed to reach identification service");
        assert_eq!(body.detail.as_deref(), Some("connection refused"));
    }
}
