//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Whether completed subtrees are shown in listings
//! - The default color for new projects
//! - How long notifications stay on screen
//!
//! Configuration is stored at `~/.config/taskboard/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_completed: bool,
    #[serde(default = "default_project_color")]
    pub default_project_color: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds a notification stays visible before auto-dismissal.
    #[serde(default = "default_display_secs")]
    pub display_secs: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskboard/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_true() -> bool {
    true
}
fn default_project_color() -> String {
    "#3b82f6".into()
}
fn default_display_secs() -> u32 {
    5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_completed: true,
            default_project_color: default_project_color(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            display_secs: default_display_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default file on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: "~/.config/taskboard/config.toml".into(),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: "~/.config/taskboard/config.toml".into(),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}
