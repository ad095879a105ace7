//! Relay client
//!
//! Posts an [`IdentificationRequest`] to the relay and hands back the raw
//! reply. Status interpretation is left to the renderer.

use std::time::Duration;

use plantpal_common::error_chain;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::upload::IdentificationRequest;

const USER_AGENT: &str = concat!("plantpal-client/", env!("CARGO_PKG_VERSION"));

/// Raw relay reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub status: u16,
    pub body: String,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the relay endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    http_client: reqwest::Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(error_chain(&e)))?;

        Ok(Self {
            http_client,
            relay_url: relay_url.into(),
        })
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Send one request; any HTTP status counts as a reply
    pub async fn identify(&self, request: IdentificationRequest) -> ClientResult<RelayReply> {
        debug!(
            relay_url = %self.relay_url,
            file_name = request.image().file_name(),
            bytes = request.image().len(),
            organ = request.organ(),
            "Sending identification request"
        );

        let response = self
            .http_client
            .post(&self.relay_url)
            .multipart(request.into_form())
            .send()
            .await
            .map_err(|e| ClientError::Transport(error_chain(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(error_chain(&e)))?;

        debug!(status, bytes = body.len(), "Relay replied");
        Ok(RelayReply { status, body })
    }
}
