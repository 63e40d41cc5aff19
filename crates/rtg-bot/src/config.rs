//! Application configuration.

use crate::error::{AppError, AppResult};
use rtg_mm::MakerConfig;
use serde::{Deserialize, Serialize};

/// Event replay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON-lines event file. `--events` overrides it.
    #[serde(default)]
    pub events_path: Option<String>,

    /// Capacity of the reader → engine channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Interval for periodic session summaries (seconds). 0 disables.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_stats_interval_secs() -> u64 {
    60
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            events_path: None,
            channel_capacity: default_channel_capacity(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub maker: MakerConfig,

    #[serde(default)]
    pub replay: ReplayConfig,
}

impl AppConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.maker
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.replay.channel_capacity == 0 {
            return Err(AppError::Config(
                "replay.channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
