//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! `STERITRACK_API_URL` overrides the configured base URL so deployments can
//! repoint the client without editing the TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub credentials: CredentialConfig,
}

/// Backend API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Credential vault settings
#[derive(Debug, Deserialize)]
pub struct CredentialConfig {
    pub path: PathBuf,
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        let mut config: ClientConfig =
            toml::from_str(&contents).map_err(|e| Error::Config(format!("parsing TOML: {e}")))?;

        // STERITRACK_API_URL overrides the configured base URL
        if let Ok(url) = std::env::var("STERITRACK_API_URL") {
            if !url.trim().is_empty() {
                config.api.base_url = url.trim().to_owned();
            }
        }

        // Validate base_url is a valid URL with http(s) scheme
        if !config.api.base_url.starts_with("http://")
            && !config.api.base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                config.api.base_url
            )));
        }

        // Validate timeout_secs is non-zero
        if config.api.timeout_secs == 0 {
            return Err(Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Resolve config file path from CLI arg or STERITRACK_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("STERITRACK_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("steritrack-client.toml")
    }
}
