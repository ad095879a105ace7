//! Upstream identification API client
//!
//! Re-encodes the uploaded image as a fresh multipart payload, attaches the
//! server-held API key and classification hint, and returns whatever the
//! upstream answered: status, content type and raw body. The body is never
//! parsed here.

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use plantpal_common::api::{ORGAN_FIELD, UPSTREAM_IMAGE_FIELD};
use plantpal_common::error_chain;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("plantpal-relay/", env!("CARGO_PKG_VERSION"));

/// Image extracted from the client's multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Upstream reply, relayed verbatim
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        // Any code in 100..=999 is representable; upstream cannot send anything else
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = self
            .content_type
            .and_then(|ct| HeaderValue::from_str(&ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));

        (status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

/// Pl@ntNet-style identification client
pub struct UpstreamClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    organ: String,
    include_related_images: bool,
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Internal(error_chain(&e)))?;

        Ok(Self {
            http_client,
            endpoint: config.identify_endpoint(),
            api_key: config.api_key.clone(),
            organ: config.organ.clone(),
            include_related_images: config.include_related_images,
        })
    }

    /// Endpoint without credentials, safe to log
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward one image upstream
    ///
    /// Any HTTP status is a successful relay. Only transport failures
    /// (connect, timeout, body read) are errors.
    pub async fn forward(&self, image: ImageUpload) -> RelayResult<UpstreamReply> {
        let form = self.build_form(image);

        let mut query = vec![("api-key", self.api_key.as_str())];
        if self.include_related_images {
            query.push(("include-related-images", "true"));
        }

        debug!(endpoint = %self.endpoint, organ = %self.organ, "Forwarding image upstream");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&query)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(transport_error)?;

        info!(status, bytes = body.len(), "Upstream responded");

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }

    fn build_form(&self, image: ImageUpload) -> Form {
        Form::new()
            .part(UPSTREAM_IMAGE_FIELD, image_part(image))
            .text(ORGAN_FIELD, self.organ.clone())
    }
}

fn image_part(image: ImageUpload) -> Part {
    let ImageUpload {
        file_name,
        content_type,
        bytes,
    } = image;

    if let Some(ct) = content_type {
        match Part::bytes(bytes.to_vec()).file_name(file_name.clone()).mime_str(&ct) {
            Ok(part) => return part,
            Err(e) => warn!("Ignoring unparsable content type {}: {}", ct, e),
        }
    }

    Part::bytes(bytes.to_vec()).file_name(file_name)
}

fn transport_error(err: reqwest::Error) -> RelayError {
    // The request URL carries the API key; strip it before it reaches a client
    let err = err.without_url();
    let timed_out = err.is_timeout();
    let detail = error_chain(&err);

    if timed_out {
        warn!("Upstream request timed out: {}", detail);
        RelayError::Timeout(detail)
    } else {
        warn!("Upstream transport failure: {}", detail);
        RelayError::Transport(detail)
    }
}
