//! Common paths for planet-admin data storage
//!
//! All data is stored under ~/.config/planet-admin/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted session (token + username)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Directory name under ~/.config
pub const APP_DIR: &str = "planet-admin";

/// Get the data directory (~/.config/planet-admin/)
///
/// This is consistent across all platforms for simplicity.
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join(APP_DIR);
    fs::create_dir_all(&dir).context("Failed to create planet-admin directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/planet-admin/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/planet-admin/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("session.enc"))
}
