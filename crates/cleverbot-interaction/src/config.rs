//! Client configuration.
//!
//! Sources, lowest precedence first:
//! 1. `~/.config/cleverbot/config.toml`
//! 2. `CLEVERBOT_KEY`, `CLEVERBOT_URL`, `CLEVERBOT_TIMEOUT` (seconds)
//! 3. Command-line flags
//!
//! ```toml
//! key = "..."
//! timeout = 30
//!
//! [moods]
//! mood1 = 80
//! ```

use cleverbot_core::client::API_URL;
use cleverbot_core::error::{CleverbotError, Result};
use cleverbot_core::state::{Moods, RootState};
use cleverbot_infrastructure::CleverbotPaths;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ENV_KEY: &str = "CLEVERBOT_KEY";
pub const ENV_URL: &str = "CLEVERBOT_URL";
pub const ENV_TIMEOUT: &str = "CLEVERBOT_TIMEOUT";

/// One source of settings; unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub moods: Moods,
}

impl ConfigLayer {
    /// Reads a TOML layer; `None` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let layer = toml::from_str(&content).map_err(|e| {
            CleverbotError::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(Some(layer))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds a layer from a variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout = get(ENV_TIMEOUT)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|e| {
                    CleverbotError::configuration(format!("{ENV_TIMEOUT}={raw:?} is not a number: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            key: get(ENV_KEY).filter(|key| !key.is_empty()),
            url: get(ENV_URL).filter(|url| !url.is_empty()),
            timeout,
            moods: Moods::default(),
        })
    }

    /// Layers `over` on top of `self`.
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            key: over.key.or(self.key),
            url: over.url.or(self.url),
            timeout: over.timeout.or(self.timeout),
            moods: over.moods.or(&self.moods),
        }
    }
}

/// Resolved settings for one client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub key: String,
    pub url: String,
    pub timeout: Option<Duration>,
    pub moods: Moods,
}

impl ClientConfig {
    /// Merges layers in order, later ones winning.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when no layer provides a key or the timeout
    /// is negative.
    pub fn resolve(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self> {
        let merged = layers
            .into_iter()
            .fold(ConfigLayer::default(), ConfigLayer::merge);

        let key = merged.key.ok_or_else(|| {
            CleverbotError::configuration(format!(
                "No API key configured; set {ENV_KEY} or pass --key"
            ))
        })?;
        let timeout = merged
            .timeout
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| CleverbotError::configuration(format!("Invalid timeout {secs}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            key,
            url: merged.url.unwrap_or_else(|| API_URL.to_string()),
            timeout,
            moods: merged.moods,
        })
    }

    /// Loads the config file and environment, then applies `overrides`.
    pub fn load(overrides: ConfigLayer) -> Result<Self> {
        let mut layers = Vec::new();
        if let Ok(path) = CleverbotPaths::config_file()
            && let Some(file) = ConfigLayer::from_file(&path)?
        {
            layers.push(file);
        }
        layers.push(ConfigLayer::from_env()?);
        layers.push(overrides);
        Self::resolve(layers)
    }

    /// A fresh root state carrying these settings.
    pub fn root_state(&self) -> RootState {
        let mut state = RootState::new(self.key.clone());
        state.timeout = self.timeout;
        state.moods = self.moods;
        state
    }
}
