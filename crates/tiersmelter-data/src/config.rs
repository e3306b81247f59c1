//! Runtime settings loaded from `smelter.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```toml
//! ticks_per_second = 20
//! station_kind = "blast_furnace"
//! data_dir = "plugin_data/tiersmelter"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tiersmelter_core::fixed::DEFAULT_TICKS_PER_SECOND;
use tiersmelter_core::sim::SimulationStrategy;
use tiersmelter_core::smelter::SmelterSettings;
use tiersmelter_core::station::StationKind;

pub const CONFIG_FILE: &str = "smelter.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmelterConfig {
    /// Host ticks per second
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,

    /// Station kind that takes part in tiered smelting
    #[serde(default)]
    pub station_kind: StationKind,

    /// Ring buffer capacity per event kind
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Directory holding `tiers.*` and `stations.*`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub strategy: SimulationStrategy,
}

fn default_ticks_per_second() -> u32 {
    DEFAULT_TICKS_PER_SECOND
}
fn default_event_capacity() -> usize {
    1024
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for SmelterConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
            station_kind: StationKind::default(),
            event_capacity: default_event_capacity(),
            data_dir: default_data_dir(),
            strategy: SimulationStrategy::default(),
        }
    }
}

impl SmelterConfig {
    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ValidationError(
                "ticks_per_second must be > 0".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "event_capacity must be > 0".into(),
            ));
        }
        if let SimulationStrategy::Delta { fixed_timestep: 0 } = self.strategy {
            return Err(ConfigError::ValidationError(
                "strategy.delta.fixed_timestep must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn to_settings(&self) -> SmelterSettings {
        SmelterSettings {
            ticks_per_second: self.ticks_per_second,
            station_kind: self.station_kind,
            event_capacity: self.event_capacity,
            strategy: self.strategy.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
