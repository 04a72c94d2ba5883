// fmcw_sim/src/error.rs

use fmcw_core::error::ConfigError;
use thiserror::Error;

/// Everything that can stop a scenario from running.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("prefab '{0}' not found in catalog")]
    UnknownPrefab(String),

    #[error("sensor configuration rejected: {0}")]
    Sensor(#[from] ConfigError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
