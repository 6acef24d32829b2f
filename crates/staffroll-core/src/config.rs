//! Application configuration management.
//!
//! Configuration is stored at `~/.config/staffroll/config.json` and may be
//! overridden from the environment (a `.env` file is honored):
//!
//! - `STAFFROLL_API_BASE_URL`
//! - `STAFFROLL_REQUEST_TIMEOUT_SECS`
//! - `STAFFROLL_CREDENTIAL_BACKEND` (`file`, `keyring`, or `memory`)
//!
//! Blank environment values are ignored.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Application name used for config/data directory paths
const APP_NAME: &str = "staffroll";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_BASE_URL: &str = "STAFFROLL_API_BASE_URL";
const ENV_REQUEST_TIMEOUT_SECS: &str = "STAFFROLL_REQUEST_TIMEOUT_SECS";
const ENV_CREDENTIAL_BACKEND: &str = "STAFFROLL_CREDENTIAL_BACKEND";

/// Where the bearer token is kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl CredentialBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" => Some(CredentialBackend::File),
            "keyring" => Some(CredentialBackend::Keyring),
            "memory" => Some(CredentialBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub credential_backend: CredentialBackend,
    pub sign_in_path: String,
    pub sign_up_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            credential_backend: CredentialBackend::default(),
            sign_in_path: "/".to_string(),
            sign_up_path: "/signup".to_string(),
        }
    }
}

impl Config {
    /// Load the config file (defaults if missing), then apply environment overrides.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        debug!(api_base_url = %config.api_base_url, backend = ?config.credential_backend, "Config loaded");
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from `lookup` (the process environment in `load`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).and_then(|v| normalize_value(&v));

        if let Some(url) = value(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(secs) = value(ENV_REQUEST_TIMEOUT_SECS) {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!(value = %secs, "Ignoring invalid {}", ENV_REQUEST_TIMEOUT_SECS),
            }
        }
        if let Some(backend) = value(ENV_CREDENTIAL_BACKEND) {
            match CredentialBackend::parse(&backend) {
                Some(backend) => self.credential_backend = backend,
                None => warn!(value = %backend, "Ignoring unknown {}", ENV_CREDENTIAL_BACKEND),
            }
        }
    }

    /// Check that the base address is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported API base URL scheme: {}", url.scheme());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted credential for the file backend.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
