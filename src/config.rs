//! Runtime configuration.
//!
//! Loaded from an optional TOML file; every field has a default, so an
//! empty file is valid. The number range is fixed and not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::feedback::phrase::DEFAULT_PHRASE_MODEL;
use crate::state::history::HISTORY_VIEW_MAX;

/// Default reveal delay in milliseconds.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 500;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Pause between starting a draw and revealing the number
    pub reveal_delay_ms: u64,

    /// Entries shown in the recent-draws view
    pub history_len: usize,

    /// Fixed RNG seed for a reproducible session
    pub seed: Option<u64>,

    /// Fetch a lucky phrase after each draw
    pub phrases: bool,

    pub phrase_model: String,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            history_len: HISTORY_VIEW_MAX,
            seed: None,
            phrases: false,
            phrase_model: DEFAULT_PHRASE_MODEL.to_string(),
        }
    }
}

impl DrawConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_len == 0 || self.history_len > HISTORY_VIEW_MAX {
            return Err(ConfigError::Invalid {
                field: "history_len",
                reason: format!("must be between 1 and {}", HISTORY_VIEW_MAX),
            });
        }
        if self.phrase_model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "phrase_model",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}
