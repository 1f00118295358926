//! Server settings persistence for Linenotes.
//!
//! Stores the database location and log filter in a JSON file at an
//! OS-appropriate location.

use linenotes_core::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// SQLite file holding the notes; created on first start.
    pub database_path: String,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path().to_string_lossy().to_string(),
            log_filter: "info".to_string(),
        }
    }
}

/// Returns the settings file location: `<config dir>/linenotes/settings.json`.
///
/// Falls back to the working directory when no config directory is known.
pub fn settings_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linenotes")
        .join("settings.json")
}

/// Returns the default database location: `<data dir>/linenotes/notes.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linenotes")
        .join("notes.db")
}

/// Loads settings from the default location.
pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_file_path())
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

/// Saves settings to the default location.
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    save_settings_to(&settings_file_path(), settings)
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
