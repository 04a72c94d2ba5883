// fmcw_sim/src/simulation/config/mod.rs

//! This module handles loading and resolving all simulation configuration
//! from disk, including the prefab catalog system.

mod catalog;
mod resolver;

pub mod structs;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::Path;

use crate::error::SimError;

// Re-export public types
pub use catalog::PrefabCatalog;
pub use resolver::resolve_sensor_config;
pub use structs::{EgoConfig, ObjectConfig, ScenarioConfig, SensorSection, ShapeConfig, Simulation};

/// Loads a scenario file. A missing file is an error, not an empty scenario.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    if !path.is_file() {
        return Err(SimError::InvalidScenario(format!(
            "scenario file not found: {}",
            path.display()
        )));
    }
    tracing::info!("Loading scenario from: {}", path.display());
    let config = Figment::new().merge(Toml::file(path)).extract()?;
    Ok(config)
}

/// Renders a resolved sensor configuration as TOML.
pub fn dump_sensor_config(config: &fmcw_core::config::SensorConfig) -> Result<String, SimError> {
    Ok(toml::to_string_pretty(config)?)
}
