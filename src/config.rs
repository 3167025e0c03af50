use chrono::Duration;
use std::path::PathBuf;
use tracing::info;

use crate::repo::store::{FileStore, InMemoryStore, StoreBackend};

pub const DEFAULT_TANKS_KEY: &str = "aquamind_tanks";
pub const DEFAULT_READINGS_KEY: &str = "aquamind_water_parameters";
pub const DEFAULT_NEW_TANK_DAYS: i64 = 7;

/// Runtime configuration for the tank and reading services
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Collection key holding the serialized tank array
    pub tanks_key: String,
    /// Collection key holding the serialized reading array
    pub readings_key: String,
    /// Directory for the file-backed store; `None` keeps data in memory
    pub data_dir: Option<PathBuf>,
    /// How many days after creation a tank is flagged as new
    pub new_tank_window_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tanks_key: DEFAULT_TANKS_KEY.to_string(),
            readings_key: DEFAULT_READINGS_KEY.to_string(),
            data_dir: None,
            new_tank_window_days: DEFAULT_NEW_TANK_DAYS,
        }
    }
}

impl Config {
    /// Create a new Config instance from environment variables.
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a Config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let tanks_key = match lookup("AQUARIUM_TANKS_KEY") {
            Some(value) => non_blank("AQUARIUM_TANKS_KEY", value)?,
            None => defaults.tanks_key,
        };

        let readings_key = match lookup("AQUARIUM_READINGS_KEY") {
            Some(value) => non_blank("AQUARIUM_READINGS_KEY", value)?,
            None => defaults.readings_key,
        };

        if tanks_key == readings_key {
            return Err(ConfigError::InvalidValue {
                var: "AQUARIUM_READINGS_KEY".to_string(),
                value: readings_key,
                reason: "must differ from the tanks key".to_string(),
            });
        }

        let data_dir = lookup("AQUARIUM_DATA_DIR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let new_tank_window_days = match lookup("AQUARIUM_NEW_TANK_DAYS") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "AQUARIUM_NEW_TANK_DAYS".to_string(),
                    value: value.clone(),
                    reason: "expected a non-negative whole number of days".to_string(),
                })?,
            None => defaults.new_tank_window_days,
        };

        Ok(Config {
            tanks_key,
            readings_key,
            data_dir,
            new_tank_window_days,
        })
    }

    pub fn new_tank_window(&self) -> Duration {
        Duration::days(self.new_tank_window_days)
    }

    /// File-backed store under `data_dir` when set, otherwise in memory.
    /// Clone the result to share it between the tank and reading services.
    pub fn open_store(&self) -> StoreBackend {
        match &self.data_dir {
            Some(dir) => {
                info!(data_dir = %dir.display(), "Using file store");
                StoreBackend::File(FileStore::new(dir.clone()))
            }
            None => {
                info!("Using in-memory store");
                StoreBackend::Memory(InMemoryStore::new())
            }
        }
    }
}

fn non_blank(var: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}
