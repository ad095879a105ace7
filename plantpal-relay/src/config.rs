//! plantpal-relay configuration
//!
//! Settings resolve CLI → ENV → TOML → compiled default. The upstream API key
//! has no compiled default: the relay refuses to start without one.

use clap::Parser;
use plantpal_common::api::{DEFAULT_ORGAN, DEFAULT_RELAY_PORT};
use plantpal_common::config::{is_valid_key, RelaySection};
use plantpal_common::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_UPSTREAM_URL: &str = "https://my-api.plantnet.org/v2/identify";
pub const DEFAULT_PROJECT: &str = "all";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Command-line arguments for plantpal-relay
///
/// Every setting is optional here so that TOML values can fill the gaps.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "plantpal-relay")]
#[command(about = "Plant identification relay service")]
#[command(version)]
pub struct RelayArgs {
    /// Path to TOML config file
    #[arg(short, long, env = "PLANTPAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "PLANTPAL_RELAY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PLANTPAL_RELAY_PORT")]
    pub port: Option<u16>,

    /// Upstream identification endpoint (without project segment)
    #[arg(long, env = "PLANTPAL_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Upstream flora project
    #[arg(long, env = "PLANTPAL_PROJECT")]
    pub project: Option<String>,

    /// Upstream API key
    #[arg(long, env = "PLANTPAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Classification hint attached to every request
    #[arg(long, env = "PLANTPAL_ORGAN")]
    pub organ: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "PLANTPAL_UPSTREAM_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "PLANTPAL_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Ask upstream to include reference images for each match
    #[arg(long, env = "PLANTPAL_INCLUDE_RELATED_IMAGES")]
    pub include_related_images: Option<bool>,
}

/// Resolved relay configuration
#[derive(Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub project: String,
    pub api_key: String,
    pub organ: String,
    pub timeout: Duration,
    pub max_upload_bytes: usize,
    pub include_related_images: bool,
}

impl RelayConfig {
    /// Merge CLI/ENV arguments with the `[relay]` TOML section
    pub fn resolve(args: &RelayArgs, toml: &RelaySection) -> Result<Self> {
        let api_key = resolve_api_key(args.api_key.as_deref(), toml.api_key.as_deref())?;

        let upstream_url = args
            .upstream_url
            .clone()
            .or_else(|| toml.upstream_url.clone())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        reqwest::Url::parse(&upstream_url)
            .map_err(|e| Error::Config(format!("Invalid upstream URL {}: {}", upstream_url, e)))?;

        let timeout_secs = args
            .timeout_secs
            .or(toml.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("Upstream timeout must be at least 1 second".to_string()));
        }

        let max_upload_bytes = args
            .max_upload_bytes
            .or(toml.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(Error::Config("Maximum upload size must be non-zero".to_string()));
        }

        Ok(Self {
            host: args
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml.port).unwrap_or(DEFAULT_RELAY_PORT),
            upstream_url,
            project: args
                .project
                .clone()
                .or_else(|| toml.project.clone())
                .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            api_key,
            organ: args
                .organ
                .clone()
                .or_else(|| toml.organ.clone())
                .unwrap_or_else(|| DEFAULT_ORGAN.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
            include_related_images: args
                .include_related_images
                .or(toml.include_related_images)
                .unwrap_or(false),
        })
    }

    /// Upstream endpoint including the project segment, without credentials
    pub fn identify_endpoint(&self) -> String {
        format!("{}/{}", self.upstream_url.trim_end_matches('/'), self.project)
    }
}

// api_key must never reach the logs
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_url", &self.upstream_url)
            .field("project", &self.project)
            .field("api_key", &"<redacted>")
            .field("organ", &self.organ)
            .field("timeout", &self.timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("include_related_images", &self.include_related_images)
            .finish()
    }
}

fn resolve_api_key(cli_or_env: Option<&str>, toml: Option<&str>) -> Result<String> {
    let cli_or_env = cli_or_env.filter(|k| is_valid_key(k));
    let toml = toml.filter(|k| is_valid_key(k));

    if cli_or_env.is_some() && toml.is_some() {
        warn!("Upstream API key found in both arguments/environment and TOML. Using arguments/environment.");
    }

    cli_or_env
        .or(toml)
        .map(|k| k.trim().to_string())
        .ok_or_else(|| {
            Error::Config(
                "Upstream API key not configured. Please configure using one of:\n\
                 1. Argument: --api-key your-key-here\n\
                 2. Environment: PLANTPAL_API_KEY=your-key-here\n\
                 3. TOML config: [relay] api_key = \"your-key\""
                    .to_string(),
            )
        })
}
