mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig, TimerConfig};
pub use database::{DailySummary, Database};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `BABYLOG_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/babylog[-dev]/`, with the `-dev` suffix when `BABYLOG_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BABYLOG_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BABYLOG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("babylog-dev")
            } else {
                base_dir.join("babylog")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
