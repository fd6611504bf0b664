//! Well-known directories.

use std::path::PathBuf;

const APP_NAME: &str = "docbot";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "DOCBOT_CONFIG_DIR";

/// Get the per-user config directory for docbot.
///
/// Checks `DOCBOT_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/docbot` on Linux, `~/Library/Application Support/docbot` on macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Directory for rolling JSON log files.
pub fn log_dir() -> PathBuf {
    config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
