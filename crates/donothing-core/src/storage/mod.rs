mod config;
pub mod database;
pub mod migrations;
mod repository;

pub use config::{Config, ReminderConfig};
pub use database::Database;
pub use repository::{ChallengeRepository, MemoryRepository};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `DONOTHING_DATA_DIR` wins when set. Otherwise `~/.config/donothing[-dev]/`,
/// where the `-dev` suffix is selected with `DONOTHING_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("DONOTHING_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DONOTHING_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("donothing-dev")
            } else {
                base_dir.join("donothing")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
