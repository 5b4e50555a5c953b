//! Configuration types for the dashboard engine.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DateError, StatusSelection, normalize_date};

/// Default cadence between playback ticks.
fn default_tick_interval_ms() -> u64 {
    1500
}

/// Timeline playback parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between automatic advances while playing.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl PlaybackConfig {
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Initial status selection.
    #[serde(default)]
    pub statuses: StatusSelection,
    /// Fallback "as of" date when the dataset is empty. Today (UTC) if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_date: Option<String>,
}

impl DashboardConfig {
    /// Resolve the fallback date.
    pub fn resolve_default_date(&self) -> Result<NaiveDate, ConfigError> {
        match &self.default_date {
            Some(raw) => normalize_date(raw).map_err(ConfigError::InvalidDefaultDate),
            None => Ok(Utc::now().date_naive()),
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playback.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        self.resolve_default_date()?;
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Tick interval must be non-zero")]
    InvalidTickInterval,
    #[error("Invalid default date: {0}")]
    InvalidDefaultDate(#[source] DateError),
}
