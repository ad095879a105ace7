//! plantpal-client configuration
//!
//! Same resolution order as the relay: CLI → ENV → TOML → compiled default.

use clap::Args;
use plantpal_common::api::{DEFAULT_RELAY_PORT, RELAY_PATH};
use plantpal_common::config::{is_valid_key, ClientSection, IdentitySection};
use plantpal_common::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::DEFAULT_IDENTITY_ENDPOINT;
use crate::render::DEFAULT_MAX_MATCHES;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn default_relay_url() -> String {
    format!("http://127.0.0.1:{}{}", DEFAULT_RELAY_PORT, RELAY_PATH)
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ClientOptions {
    /// Path to TOML config file
    #[arg(short, long, global = true, env = "PLANTPAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Relay endpoint URL
    #[arg(long, global = true, env = "PLANTPAL_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "PLANTPAL_CLIENT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Number of matches to show
    #[arg(long, global = true, env = "PLANTPAL_MAX_MATCHES")]
    pub max_matches: Option<usize>,

    /// Identity provider API key
    #[arg(long, global = true, env = "PLANTPAL_IDENTITY_API_KEY", hide_env_values = true)]
    pub identity_api_key: Option<String>,

    /// Identity provider base URL
    #[arg(long, global = true, env = "PLANTPAL_IDENTITY_ENDPOINT")]
    pub identity_endpoint: Option<String>,
}

/// Resolved client configuration
#[derive(Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub timeout: Duration,
    pub max_matches: usize,
    pub identity_endpoint: String,
    identity_api_key: Option<String>,
}

impl ClientConfig {
    pub fn resolve(
        options: &ClientOptions,
        client: &ClientSection,
        identity: &IdentitySection,
    ) -> Result<Self> {
        let relay_url = options
            .relay_url
            .clone()
            .or_else(|| client.relay_url.clone())
            .unwrap_or_else(default_relay_url);
        reqwest::Url::parse(&relay_url)
            .map_err(|e| Error::Config(format!("Invalid relay URL {}: {}", relay_url, e)))?;

        let timeout_secs = options
            .timeout_secs
            .or(client.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("Timeout must be at least 1 second".to_string()));
        }

        let max_matches = options
            .max_matches
            .or(client.max_matches)
            .unwrap_or(DEFAULT_MAX_MATCHES);
        if max_matches == 0 {
            return Err(Error::Config("max_matches must be at least 1".to_string()));
        }

        Ok(Self {
            relay_url,
            timeout: Duration::from_secs(timeout_secs),
            max_matches,
            identity_endpoint: options
                .identity_endpoint
                .clone()
                .or_else(|| identity.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_IDENTITY_ENDPOINT.to_string()),
            identity_api_key: options
                .identity_api_key
                .clone()
                .or_else(|| identity.api_key.clone())
                .filter(|k| is_valid_key(k))
                .map(|k| k.trim().to_string()),
        })
    }

    /// Key for the identity provider; only login and signup need it
    pub fn identity_api_key(&self) -> Result<&str> {
        self.identity_api_key.as_deref().ok_or_else(|| {
            Error::Config(
                "Identity provider API key not configured. Please configure using one of:\n\
                 1. Argument: --identity-api-key your-key-here\n\
                 2. Environment: PLANTPAL_IDENTITY_API_KEY=your-key-here\n\
                 3. TOML config: [identity] api_key = \"your-key\""
                    .to_string(),
            )
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("relay_url", &self.relay_url)
            .field("timeout", &self.timeout)
            .field("max_matches", &self.max_matches)
            .field("identity_endpoint", &self.identity_endpoint)
            .field(
                "identity_api_key",
                &self.identity_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
