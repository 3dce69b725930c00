use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{config_invalid, PortalResult};

// Default configuration values
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_STORE: &str = "medportal.token.json";

/// Environment variable naming an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "MEDPORTAL_CONFIG_PATH";

/// Main configuration struct for the portal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// REST service settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// REST service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Upper bound on a token verification call, in seconds
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,
    /// File holding the bearer token between runs
    #[serde(default = "default_token_store_path")]
    pub token_store_path: PathBuf,
}

// Default functions
fn default_base_url() -> String {
    std::env::var("MEDPORTAL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

fn default_request_timeout() -> u64 {
    std::env::var("MEDPORTAL_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_verify_timeout() -> u64 {
    std::env::var("MEDPORTAL_VERIFY_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS)
}

fn default_token_store_path() -> PathBuf {
    std::env::var("MEDPORTAL_TOKEN_STORE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_STORE))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_timeout_secs: default_verify_timeout(),
            token_store_path: default_token_store_path(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AuthConfig {
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}

impl Config {
    /// Load from a JSON file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> PortalResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| config_invalid("config_path", format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| config_invalid("config_path", format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from the file named by `MEDPORTAL_CONFIG_PATH`, or defaults
    pub async fn from_env() -> PortalResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path)).await,
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> PortalResult<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(config_invalid("api.base_url", "must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(config_invalid(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(config_invalid(
                "api.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.auth.verify_timeout_secs == 0 {
            return Err(config_invalid(
                "auth.verify_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.auth.token_store_path.as_os_str().is_empty() {
            return Err(config_invalid("auth.token_store_path", "must not be empty"));
        }
        Ok(())
    }
}
