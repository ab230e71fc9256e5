//! Runtime configuration.
//!
//! Every knob has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "log": { "level": "debug", "fail_fast": false },
//!   "duplicate_policy": "lenient",
//!   "snap_radius": 250.0,
//!   "tile_size": 1.0,
//!   "window": { "width": 1920, "height": 1080, "title": "hospy", "target_fps": 240 }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ecs::DuplicatePolicy;
use crate::error::{Error, Result};

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Threshold as understood by `log::LevelFilter` (`"off"` … `"trace"`).
    /// `RUST_LOG` overrides it.
    pub level: String,
    /// Abort the process after an error-level record.
    pub fail_fast: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            fail_fast: true,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| Error::Config(format!("unknown log level `{}`", self.level)))
    }
}

/// Window the backend should open. Headless backends ignore it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "hospy".to_owned(),
            target_fps: 240,
        }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub log: LogConfig,
    pub duplicate_policy: DuplicatePolicy,
    /// How far a released card looks for a slot.
    pub snap_radius: f32,
    /// Edge length of a walkability tile.
    pub tile_size: f32,
    pub window: WindowConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            duplicate_policy: DuplicatePolicy::Strict,
            snap_radius: 250.0,
            tile_size: 1.0,
            window: WindowConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.log.level_filter()?;
        if !(self.snap_radius.is_finite() && self.snap_radius >= 0.0) {
            return Err(Error::Config(format!(
                "snap_radius must be a non-negative number, got {}",
                self.snap_radius
            )));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(Error::Config(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        Ok(())
    }
}
