// SPDX-License-Identifier: GPL-3.0-only

//! Startup configuration
//!
//! Read once at startup from `--config <path>` or
//! `$XDG_CONFIG_HOME/kinect-mesh/config.json`. Missing fields take their
//! defaults and out-of-range values are clamped. Live edits are never written
//! back.

use crate::app::Tunables;
use crate::backends::sensor::SensorPreference;
use crate::constants::APP_DIR_NAME;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Config file name inside the app config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which sensor to open
    pub sensor: SensorPreference,
    /// Initial values for the live tunables
    pub tunables: Tunables,
}

impl Config {
    /// `$XDG_CONFIG_HOME/kinect-mesh/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse a config file and clamp its values into range
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&text)?;
        config.tunables.sanitize();
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load the explicit path, or the default path when it exists
    ///
    /// An explicit path that cannot be read is an error. A broken default
    /// config only logs a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Ok(Self::default())
            }),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}
