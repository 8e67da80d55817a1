//! `pipemind.toml` loading with environment overrides.

use std::path::{Path, PathBuf};

use pipeline::PipemindError;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "PIPEMIND_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "pipemind.toml";

const INPUT_DIR_ENV: &str = "PIPEMIND_INPUT_DIR";
const ROOM_MAPS_DIR_ENV: &str = "PIPEMIND_ROOM_MAPS_DIR";
const STATE_FILE_ENV: &str = "PIPEMIND_STATE_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base directory for text inputs.
    pub input_dir: PathBuf,

    /// Destination for exported room networks.
    pub room_maps_dir: PathBuf,

    /// Where line selector cursors are persisted between runs. `None` keeps
    /// them for the lifetime of the process only.
    pub state_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            room_maps_dir: PathBuf::from("room_maps"),
            state_file: None,
        }
    }
}

impl Config {
    /// Parses a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipemindError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PipemindError::Configuration {
            message: format!("Failed to read config file {}: {e}", path.display()),
        })?;
        Self::parse(&content).map_err(|e| PipemindError::Configuration {
            message: format!("{}: {e}", path.display()),
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads from `PIPEMIND_CONFIG` (or `./pipemind.toml`), applies the
    /// process environment and validates the result.
    pub fn from_env() -> Result<Self, PipemindError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replaces fields with values returned by `lookup` for their env keys.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(INPUT_DIR_ENV) {
            self.input_dir = v.into();
        }
        if let Some(v) = lookup(ROOM_MAPS_DIR_ENV) {
            self.room_maps_dir = v.into();
        }
        if let Some(v) = lookup(STATE_FILE_ENV) {
            self.state_file = (!v.trim().is_empty()).then(|| v.into());
        }
    }

    pub fn validate(&self) -> Result<(), PipemindError> {
        for (key, dir) in [("input_dir", &self.input_dir), ("room_maps_dir", &self.room_maps_dir)] {
            if dir.as_os_str().is_empty() {
                return Err(PipemindError::Configuration {
                    message: format!("{key} must not be empty"),
                });
            }
        }
        Ok(())
    }
}
