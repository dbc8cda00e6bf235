//! Home configuration: where state lives and how levels move.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a [`HomeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Settings for the simulated home.
///
/// Every field has a default, so `{}` is a valid config.
///
/// # Example
/// ```
/// let cfg = domotica_home::load_config_from_str(r#"{"level_step": 5}"#).unwrap();
/// assert_eq!(cfg.level_step, 5);
/// assert_eq!(cfg.default_volume, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// JSON snapshot file for device state.
    pub state_file: PathBuf,
    /// Maximum number of history entries kept in the snapshot.
    pub history_limit: usize,
    /// Amount `SUBIR`/`BAJAR` move a level.
    pub level_step: u64,
    /// Initial volume level.
    pub default_volume: u64,
    /// Initial brightness level.
    pub default_brightness: u64,
    /// Lowest level `BAJAR` can take brightness to.
    pub brightness_floor: u64,
    /// Simulated battery reading; `None` means "unavailable".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<u64>,
    /// Directory holding `<device>.png` pictograms.
    pub pictogram_dir: PathBuf,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("estado_dispositivos.json"),
            history_limit: 100,
            level_step: 10,
            default_volume: 50,
            default_brightness: 70,
            brightness_floor: 10,
            battery_percent: None,
            pictogram_dir: PathBuf::from("img"),
        }
    }
}

/// Parse and validate a config from JSON text.
pub fn load_config_from_str(s: &str) -> Result<HomeConfig, ConfigError> {
    let config: HomeConfig = serde_json::from_str(s)?;

    if config.state_file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "state_file".into(),
            reason: "must not be empty".into(),
        });
    }
    if config.history_limit == 0 {
        return Err(ConfigError::InvalidField {
            field: "history_limit".into(),
            reason: "must be >= 1".into(),
        });
    }
    if !(1..=100).contains(&config.level_step) {
        return Err(ConfigError::InvalidField {
            field: "level_step".into(),
            reason: format!("{} is outside 1..=100", config.level_step),
        });
    }

    // -- Percent fields --
    for (field, value) in [
        ("default_volume", Some(config.default_volume)),
        ("default_brightness", Some(config.default_brightness)),
        ("brightness_floor", Some(config.brightness_floor)),
        ("battery_percent", config.battery_percent),
    ] {
        if let Some(v) = value
            && v > 100
        {
            return Err(ConfigError::InvalidField {
                field: field.into(),
                reason: format!("{v} exceeds 100"),
            });
        }
    }

    Ok(config)
}

/// Read, parse, and validate a config file.
pub fn load_config(path: &Path) -> Result<HomeConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&text)
}
