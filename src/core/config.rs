//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// API base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "CATADM_CONFIG";

/// Environment variable for the API base URL (read by the CLI layer)
pub const API_URL_ENV: &str = "CATADM_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// catadm configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog REST API
    pub api_url: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order.
    ///
    /// A missing file is not an error; an unreadable one is logged and skipped.
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. User config file
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(file) => config.merge(file),
                    Err(e) => warn!("{}", e),
                }
            }
        }

        // 3. Environment and command-line overrides are applied by the caller
        //    through `with_api_url`

        config
    }

    /// Parse one config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Location of the config file: `$CATADM_CONFIG`, else the platform
    /// config directory (e.g. `~/.config/catadm/config.yaml`)
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        directories::ProjectDirs::from("", "", "catadm")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Apply a higher-priority API URL (environment or `--api-url`)
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = Some(url);
        }
        self
    }

    /// Effective API base URL
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Value of a config key by name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "api_url" => self.api_url.as_deref(),
            "default_format" => self.default_format.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.get("default_format"), None);
    }

    #[test]
    fn test_load_from_yaml() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_url: http://catalog:8080\ndefault_format: json\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url(), "http://catalog:8080");
        assert_eq!(config.get("default_format"), Some("json"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_url: [unclosed").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_override_precedence() {
        let mut config = Config {
            api_url: Some("http://file:1".to_string()),
            default_format: None,
        };
        config.merge(Config {
            api_url: None,
            default_format: Some("csv".to_string()),
        });
        assert_eq!(config.api_url(), "http://file:1");
        assert_eq!(config.get("default_format"), Some("csv"));

        let config = config.with_api_url(Some("http://flag:2".to_string()));
        assert_eq!(config.api_url(), "http://flag:2");

        let config = config.with_api_url(Some("  ".to_string()));
        assert_eq!(config.api_url(), "http://flag:2");
    }
}
