// fmcw_sim/src/simulation/config/structs.rs

use figment::value::Dict;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Scenario ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub sensor: SensorSection,

    #[serde(default)]
    pub ego: EgoConfig,

    // The TOML has `[[objects]]`, which becomes a Vec of ObjectConfig structs.
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Seed of the sensor's noise generator. Overrides the prefab's seed, but
    /// not one set directly in `[sensor]`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Time between sensor steps, seconds.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Duration of the simulation in seconds.
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,
    /// Range the default sensor parameters are derived from.
    #[serde(default = "default_nominal_range")]
    pub nominal_range: f64,
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    /// Master switch of the sensor's own log output.
    #[serde(default = "default_logging")]
    pub logging: bool,
    /// Sensor log categories to enable. Empty keeps the defaults.
    #[serde(default)]
    pub log_categories: Vec<String>,
}

fn default_step_size() -> f64 {
    0.05
}
fn default_duration() -> f64 {
    1.0
}
fn default_nominal_range() -> f64 {
    150.0
}
fn default_instance_name() -> String {
    "fmcw_sensor".to_string()
}
fn default_logging() -> bool {
    true
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            step_size: default_step_size(),
            duration_seconds: default_duration(),
            nominal_range: default_nominal_range(),
            instance_name: default_instance_name(),
            logging: default_logging(),
            log_categories: Vec::new(),
        }
    }
}

/// The `[sensor]` table: an optional catalog prefab plus field overrides.
///
/// Any key other than `from` is a `SensorConfig` field and is checked when
/// the layers are extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(flatten)]
    pub overrides: Dict,
}

/// The vehicle carrying the sensor. Moves at constant velocity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EgoConfig {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub yaw_deg: f64,
    #[serde(default)]
    pub velocity: [f64; 3],
    /// Sensor mounting offset in the vehicle frame.
    #[serde(default)]
    pub mount_offset: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectConfig {
    pub name: String,
    pub shape: ShapeConfig,
    pub position: [f64; 3],
    #[serde(default)]
    pub yaw_deg: f64,
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default = "default_reflectivity")]
    pub reflectivity: f64,
}

fn default_reflectivity() -> f64 {
    1.0
}

/// `shape = { type = "Box", size = [4.5, 1.8, 1.5] }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeConfig {
    Sphere { radius: f64 },
    /// Length, width and height along the object's x, y and z.
    Box { size: [f64; 3] },
}
