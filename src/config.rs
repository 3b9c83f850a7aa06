use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{Direction, EngineError, EngineSettings};

pub const CONFIG_ENV_VAR: &str = "SNAKE_CONFIG";
pub const STORE_ENV_VAR: &str = "SNAKE_STORE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid engine settings: {0}")]
    Engine(#[from] EngineError),
    #[error("fixed schedule interval must be at least 1 ms")]
    ZeroInterval,
}

/// How ticks are driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Once per redraw; redraws stop while the window is minimized.
    FrameSync,
    /// On a timer, regardless of visibility.
    FixedInterval { interval_ms: u64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub initial_length: u32,
    pub initial_speed: f64,
    pub initial_direction: Direction,
    pub schedule: ScheduleMode,
    pub store_path: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 30,
            height: 15,
            initial_length: 3,
            initial_speed: 0.006,
            initial_direction: Direction::Right,
            schedule: ScheduleMode::FrameSync,
            store_path: PathBuf::from("snake-scores.json"),
            window_width: 800,
            window_height: 460,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the file named by `SNAKE_CONFIG` and the
    /// `SNAKE_STORE` path override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(store) = env::var_os(STORE_ENV_VAR) {
            config.store_path = PathBuf::from(store);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_settings().validate()?;
        if self.schedule == (ScheduleMode::FixedInterval { interval_ms: 0 }) {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            width: self.width,
            height: self.height,
            initial_length: self.initial_length,
            initial_speed: self.initial_speed,
            initial_direction: self.initial_direction,
        }
    }
}
