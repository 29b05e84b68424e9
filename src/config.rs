//! Configuration module for planet-admin

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

/// Environment variable that overrides [`Config::base_url`]
pub const BASE_URL_ENV: &str = "PLANET_ADMIN_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the admin REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of posts requested per moderation page
    #[serde(default = "default_post_page_size")]
    pub post_page_size: u32,

    /// Number of users requested per management page
    #[serde(default = "default_user_page_size")]
    pub user_page_size: u32,

    /// Maximum number of undelivered effects kept per screen
    #[serde(default = "default_effect_capacity")]
    pub effect_capacity: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://113.44.47.220:8082".to_string()
}

fn default_post_page_size() -> u32 {
    10
}

fn default_user_page_size() -> u32 {
    20
}

fn default_effect_capacity() -> usize {
    32
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            post_page_size: default_post_page_size(),
            user_page_size: default_user_page_size(),
            effect_capacity: default_effect_capacity(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let mut config = Self::load_from(&path)?;
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.apply_base_url(&url);
        }
        Ok(config)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Replace the base URL, ignoring blank values
    pub fn apply_base_url(&mut self, url: &str) {
        let url = url.trim().trim_end_matches('/');
        if !url.is_empty() {
            self.base_url = url.to_string();
        }
    }

    /// Request timeout as a [`Duration`]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.post_page_size, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "user_page_size = 50\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.user_page_size, 50);
        assert_eq!(config.base_url, default_base_url());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.apply_base_url("https://admin.example.com/");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "https://admin.example.com");
    }

    #[test]
    fn test_blank_base_url_is_ignored() {
        let mut config = Config::default();
        config.apply_base_url("   ");
        assert_eq!(config.base_url, default_base_url());
    }
}
