pub mod board_db;
mod config;
pub mod migrations;

pub use board_db::BoardDb;
pub use config::Config;

use std::path::PathBuf;

/// Returns `~/.config/taskboard[-dev]/` based on TASKBOARD_ENV.
///
/// Set TASKBOARD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKBOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskboard-dev")
    } else {
        base_dir.join("taskboard")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
