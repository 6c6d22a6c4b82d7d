//! Configuration types for the apidesk engine.
//!
//! The configuration lives in `.apidesk/config.json` and describes the
//! signed-in user, where remote definitions come from, and fetch limits.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::auth::{SCOPE_API_CREATE, SCOPE_API_PUBLISH, SCOPE_API_VIEW};

/// Environment variable that overrides [`Config::access_token`].
pub const TOKEN_ENV: &str = "APIDESK_TOKEN";

/// Main configuration for apidesk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The user the console acts as.
    #[serde(default)]
    pub user: UserProfile,

    /// Base URL of the publisher REST API (e.g. `https://gw.example.com/api/am/publisher/v1`).
    #[serde(default)]
    pub publisher_url: Option<String>,

    /// Bearer token for the publisher REST API.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Timeout in seconds for fetching an AsyncAPI definition.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

fn default_fetch_timeout() -> u64 {
    30
}

/// The user identity and the capability tags (scopes) it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    #[serde(default = "default_username")]
    pub username: String,

    /// Granted scopes, e.g. `apim:api_create`.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_username() -> String {
    "admin".into()
}

fn default_scopes() -> Vec<String> {
    vec![
        SCOPE_API_VIEW.into(),
        SCOPE_API_CREATE.into(),
        SCOPE_API_PUBLISH.into(),
    ]
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: default_username(),
            scopes: default_scopes(),
        }
    }
}

impl UserProfile {
    /// Create a profile with an explicit scope list.
    pub fn new(username: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            username: username.into(),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Whether the user holds the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// The access token, preferring the `APIDESK_TOKEN` environment variable.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.access_token.clone())
    }

    /// Fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: UserProfile::default(),
            publisher_url: None,
            access_token: None,
            fetch_timeout_seconds: default_fetch_timeout(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
