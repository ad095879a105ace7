//! Relay wire contract types and constants

use serde::{Deserialize, Serialize};

/// Route served by the relay
pub const RELAY_PATH: &str = "/identify-plants";

/// Default relay listen port
pub const DEFAULT_RELAY_PORT: u16 = 3100;

/// Multipart field carrying the image from the client to the relay
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the image from the relay to the upstream API
pub const UPSTREAM_IMAGE_FIELD: &str = "images";

/// Multipart field carrying the classification hint ("organ")
pub const ORGAN_FIELD: &str = "organs";

/// Classification hint sent when none is configured
pub const DEFAULT_ORGAN: &str = "leaf";

/// Error text of the 400 response when no image part is present
pub const NO_IMAGE_ERROR: &str = "No image uploaded";

/// Locally synthesized error body
///
/// The relay produces this only for its own failures:
///
/// - 400 `No image uploaded`: no image part, or `detail` set when the body
///   was not multipart at all
/// - 413 `Image too large`, with `detail`
/// - 500 when upstream could not be reached or timed out, always with `detail`
///
/// Every other body the client sees is upstream text, passed through.
///
/// # Examples
///
/// ```
/// use plantpal_common::api::ErrorBody;
///
/// let body = ErrorBody::with_detail("Upstream request failed", "connection refused");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["error"], "Upstream request failed");
/// assert_eq!(json["detail"], "connection refused");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error summary
    pub error: String,
    /// Underlying cause (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

// ========================================
// Tests
// ========================================
