//! Configuration Management
//!
//! Loads the optional user configuration and applies environment overrides.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://eu.api.ovh.com";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint (scheme + host)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// OAuth2 access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Default cloud project ID
    #[serde(default)]
    pub cloud_project: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ovhcloud").join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .map(|path| Self::from_file(&path))
            .unwrap_or_default();
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Read a configuration file; a missing or unreadable file yields defaults
    pub fn from_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid configuration file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read configuration file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Override fields from `OVH_ENDPOINT`, `OVH_ACCESS_TOKEN`, `OVH_CLOUD_PROJECT`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(endpoint) = non_empty("OVH_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(token) = non_empty("OVH_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(project) = non_empty("OVH_CLOUD_PROJECT") {
            self.cloud_project = Some(project);
        }
    }

    /// Get effective endpoint (config > default), validated as an URL
    pub fn effective_endpoint(&self) -> Result<String> {
        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| Error::config(format!("invalid API endpoint {endpoint:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "invalid API endpoint {endpoint:?}: expected an http(s) URL"
            )));
        }
        Ok(endpoint.trim_end_matches('/').to_string())
    }

    pub fn effective_access_token(&self) -> Option<String> {
        self.access_token.clone()
    }

    /// Get effective cloud project (CLI > environment > config)
    pub fn effective_cloud_project(&self, flag: Option<&str>) -> Option<String> {
        flag.map(|p| p.to_string())
            .or_else(|| self.cloud_project.clone())
            .filter(|p| !p.is_empty())
    }
}
