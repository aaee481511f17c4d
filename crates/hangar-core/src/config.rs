//! Hangar configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HangarError, Result};

/// Default generation endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/generate";

/// Default generation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HangarConfig {
    /// Generation service settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageSettings,
}

impl HangarConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.generator.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.generator.timeout_secs = secs;
        self
    }

    /// Set the bearer token sent to the generation service
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.generator.api_key = Some(key.into());
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.data_dir = Some(dir.into());
        self
    }

    /// Defaults overridden by the environment (a `.env` file is honoured)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::default().apply_env(|name| std::env::var(name).ok())
    }

    /// Apply `HANGAR_*` overrides read through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("HANGAR_GENERATOR_URL") {
            self.generator.endpoint = endpoint;
        }
        if let Some(timeout) = lookup("HANGAR_GENERATOR_TIMEOUT_SECS") {
            self.generator.timeout_secs = timeout.trim().parse().map_err(|_| {
                HangarError::InvalidConfig(format!(
                    "HANGAR_GENERATOR_TIMEOUT_SECS must be a number, got '{}'",
                    timeout
                ))
            })?;
        }
        if let Some(key) = lookup("HANGAR_API_KEY") {
            self.generator.api_key = Some(key);
        }
        if let Some(dir) = lookup("HANGAR_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.generator.endpoint.trim();
        if endpoint.is_empty() {
            return Err(HangarError::InvalidConfig(
                "generator endpoint is empty".to_string(),
            ));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HangarError::InvalidConfig(format!(
                "generator endpoint must be http(s): {}",
                endpoint
            )));
        }
        if self.generator.timeout_secs == 0 {
            return Err(HangarError::InvalidConfig(
                "generator timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// `POST` endpoint accepting `{"text": ...}`
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer token (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

/// Local storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Store directory; `~/.hangar/store` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}
