//! Platform paths for configuration and saved state.
//!
//! ```text
//! ~/.config/cleverbot/         # Config directory
//! └── config.toml              # API key, endpoint, default timeout
//!
//! ~/.local/share/cleverbot/    # Data directory
//! └── state.json               # Default snapshot for the chat command
//! ```

use cleverbot_core::error::{CleverbotError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "cleverbot";

pub struct CleverbotPaths;

impl CleverbotPaths {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CleverbotError::configuration("Cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CleverbotError::configuration("Cannot find data directory"))
    }

    pub fn default_snapshot_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("state.json"))
    }
}
