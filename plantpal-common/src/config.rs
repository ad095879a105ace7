//! Configuration file loading
//!
//! Every PlantPal binary resolves its settings in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are handled by clap (`#[arg(env = ...)]`); this module
//! provides tier 3. A missing config file is not an error: the binary logs a
//! warning and continues with defaults. A config file that exists but cannot
//! be parsed is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PLANTPAL_CONFIG";

/// File name looked up in the platform config directories
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level TOML configuration
///
/// All sections are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub relay: RelaySection,
    pub client: ClientSection,
    pub identity: IdentitySection,
}

/// Logging configuration
///
/// `level` is an `EnvFilter` directive used when `RUST_LOG` is unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// `[relay]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
    pub project: Option<String>,
    pub api_key: Option<String>,
    pub organ: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<usize>,
    pub include_related_images: Option<bool>,
}

/// `[client]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientSection {
    pub relay_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_matches: Option<usize>,
}

/// `[identity]` section (identity provider used by the login module)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentitySection {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

impl TomlConfig {
    /// Locate and load the config file, degrading to defaults when absent
    ///
    /// `explicit` is the `--config` argument, if any.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match locate_config_file(explicit) {
            Some(path) if path.exists() => {
                let config = load_toml_config(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Find the config file path
///
/// An explicit path (argument, then `PLANTPAL_CONFIG`) is returned even if it
/// does not exist so the caller can report it. Platform locations are only
/// returned when the file is present.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // ~/.config/plantpal/config.toml (or the platform equivalent)
    if let Some(path) = dirs::config_dir().map(|d| d.join("plantpal").join(CONFIG_FILE_NAME)) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/plantpal").join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_parses_to_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_partial_relay_section() {
        let config: TomlConfig = toml::from_str(
            r#"
            [relay]
            port = 4100
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.port, Some(4100));
        assert_eq!(config.relay.api_key.as_deref(), Some("abc"));
        assert!(config.relay.upstream_url.is_none());
        assert!(config.client.relay_url.is_none());
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("2b10abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/nonexistent/plantpal.toml");
        assert_eq!(locate_config_file(Some(path)), Some(path.to_path_buf()));
    }
}
