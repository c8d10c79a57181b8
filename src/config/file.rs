//! Configuration file handling

use super::Candidate;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Custom endpoints, appended after the built-in candidates
    #[serde(default)]
    pub endpoints: Vec<CustomEndpoint>,

    /// Disabled endpoints
    #[serde(default)]
    pub disabled_endpoints: DisabledEndpoints,

    /// Stored provider API keys (environment variables take precedence)
    #[serde(default)]
    pub keys: ApiKeys,
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Probe timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Monitor probe interval in seconds
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_seconds: u64,
}

fn default_timeout() -> u64 {
    5
}

fn default_monitor_interval() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            monitor_interval_seconds: default_monitor_interval(),
        }
    }
}

/// A user-supplied endpoint from the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomEndpoint {
    /// RPC URL
    pub url: String,
    /// Display name (defaults to the URL host)
    #[serde(default)]
    pub name: Option<String>,
}

impl CustomEndpoint {
    /// Convert to a runtime candidate
    pub fn to_candidate(&self) -> Candidate {
        match &self.name {
            Some(name) => Candidate::new(name, &self.url),
            None => Candidate::from_url(&self.url),
        }
    }
}

/// Disabled endpoints configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisabledEndpoints {
    /// List of URLs to disable
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Stored provider API keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub alchemy: Option<String>,
    #[serde(default)]
    pub infura: Option<String>,
    #[serde(default)]
    pub ankr: Option<String>,
    #[serde(default)]
    pub quicknode_url: Option<String>,
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rpc-sentinel")
            .join("config.toml")
    }

    /// Load from default path
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path();
        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Load from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Save to a specific path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::InvalidFile(format!("Failed to create directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save to default path
    pub fn save_default(&self) -> Result<()> {
        self.save(&Self::default_path())
    }

    /// Check if an endpoint URL is disabled
    pub fn is_endpoint_disabled(&self, url: &str) -> bool {
        self.disabled_endpoints.urls.iter().any(|u| u == url)
    }

    /// Store a provider credential and save
    pub fn set_key(&mut self, provider: &str, value: String) -> Result<()> {
        match provider.to_ascii_lowercase().as_str() {
            "alchemy" => self.keys.alchemy = Some(value),
            "infura" => self.keys.infura = Some(value),
            "ankr" => self.keys.ankr = Some(value),
            "quicknode" => self.keys.quicknode_url = Some(value),
            other => return Err(ConfigError::UnknownProvider(other.to_string()).into()),
        }
        self.save_default()
    }
}
