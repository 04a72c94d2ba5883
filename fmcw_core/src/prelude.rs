// fmcw_core/src/prelude.rs

// --- Entry point ---
pub use crate::sensor_model::SensorModel;

// --- Configuration and errors ---
pub use crate::config::{
    ModelParameters, SensorConfig, SensorParameters, SpectrumKind, ThresholdPolicy, DEFAULT_SEED,
};
pub use crate::error::ConfigError;
pub use crate::utils::window::WindowKind;

// --- Logging ---
pub use crate::logging::{category, LogSink, Logger, MemorySink, TracingSink};

// --- Scene input and sensor output ---
pub use crate::messages::{Detection, SceneObject, SceneSnapshot, SensorOutput, Shape};
pub use crate::types::{Beam, BeamDivergence, BeamIndex, FieldOfView};

// --- Pipeline strategies ---
pub use crate::models::perception::ray_caster::AnalyticRayCaster;
pub use crate::models::perception::{RayCaster, RayHit, SensorRay, SignalSynthesizer, SpectrumEstimator};
