//! Configuration management for botdeck.
//!
//! Loads configuration from ${BOTDECK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for botdeck configuration and data directories.
    //!
    //! BOTDECK_HOME resolution order:
    //! 1. BOTDECK_HOME environment variable (if set)
    //! 2. ~/.config/botdeck (default)

    use std::path::PathBuf;

    /// Returns the user's home directory, if known.
    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            std::env::var_os("HOME").map(PathBuf::from)
        }
        #[cfg(not(unix))]
        {
            std::env::var_os("USERPROFILE").map(PathBuf::from)
        }
    }

    /// Returns the botdeck home directory.
    ///
    /// Checks BOTDECK_HOME env var first, falls back to ~/.config/botdeck
    pub fn botdeck_home() -> PathBuf {
        if let Ok(home) = std::env::var("BOTDECK_HOME") {
            return PathBuf::from(home);
        }

        home_dir()
            .map(|h| h.join(".config").join("botdeck"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        botdeck_home().join("config.toml")
    }

    /// Returns the path to the persisted credential cache.
    pub fn credentials_path() -> PathBuf {
        botdeck_home().join("credentials.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        botdeck_home().join("logs")
    }
}

/// Management API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the management API deployment.
    pub base_url: Option<String>,
    /// Request timeout in seconds. A hung request surfaces as a failed
    /// request instead of a permanently loading screen.
    pub timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Management API settings.
    pub api: ApiConfig,
}

impl Config {
    const DEFAULT_TIMEOUT_SECS: u32 = 15;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL with precedence: env > config.
    ///
    /// `BOTDECK_API_URL` wins over `api.base_url`; an error is returned if
    /// neither is set or the URL is malformed.
    pub fn resolved_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("BOTDECK_API_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        if let Some(config_url) = self.api.base_url.as_deref() {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        anyhow::bail!(
            "No management API URL configured. Set BOTDECK_API_URL or api.base_url in {}.",
            paths::config_path().display()
        )
    }

    /// Returns the request timeout for API calls.
    pub fn request_timeout(&self) -> Duration {
        let secs = if self.api.timeout_secs == 0 {
            Self::DEFAULT_TIMEOUT_SECS
        } else {
            self.api.timeout_secs
        };
        Duration::from_secs(u64::from(secs))
    }

    /// Writes the default config template to the default path, if absent.
    ///
    /// Returns true if the file was created.
    pub fn init_default() -> Result<bool> {
        let path = paths::config_path();
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, default_config_template())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid management API URL: {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_load_parses_api_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[api]\nbase_url = \"https://panel.example.com/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://panel.example.com/api")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = Config {
            api: ApiConfig {
                base_url: None,
                timeout_secs: 0,
            },
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert!(config.api.base_url.is_none());
    }
}
