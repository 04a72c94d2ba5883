// fmcw_core/src/types.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

// --- Core Type Aliases ---
pub type BeamIndex = u32;

// =========================================================================
// == Beam Geometry ==
// =========================================================================

/// One nominal sensing direction of the sensor.
///
/// Angles are in radians in the sensor frame (+X forward, +Y left, +Z up).
/// `beam_idx` is a stable identity: the same configuration always produces the
/// same index for the same direction, across steps and across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Beam {
    /// Azimuth, positive towards +Y.
    pub horizontal_angle: f64,
    /// Elevation, positive towards +Z.
    pub vertical_angle: f64,
    pub beam_idx: BeamIndex,
}

impl Beam {
    /// Unit vector of the nominal beam direction in the sensor frame.
    pub fn direction(&self) -> Vector3<f64> {
        direction_from_angles(self.horizontal_angle, self.vertical_angle)
    }
}

/// Half-angle spread (radians) of a single beam's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamDivergence {
    pub horizontal_angle: f64,
    pub vertical_angle: f64,
}

impl BeamDivergence {
    pub fn from_degrees(horizontal_deg: f64, vertical_deg: f64) -> Self {
        Self {
            horizontal_angle: horizontal_deg.to_radians(),
            vertical_angle: vertical_deg.to_radians(),
        }
    }
}

/// Nominal field-of-view bounds and beam counts, the input of the beam pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOfView {
    pub azimuth_min_deg: f64,
    pub azimuth_max_deg: f64,
    pub elevation_min_deg: f64,
    pub elevation_max_deg: f64,
    pub horizontal_beams: u32,
    pub vertical_beams: u32,
}

impl FieldOfView {
    /// A field of view centred on the boresight.
    pub fn symmetric(
        horizontal_fov_deg: f64,
        vertical_fov_deg: f64,
        horizontal_beams: u32,
        vertical_beams: u32,
    ) -> Self {
        Self {
            azimuth_min_deg: -horizontal_fov_deg / 2.0,
            azimuth_max_deg: horizontal_fov_deg / 2.0,
            elevation_min_deg: -vertical_fov_deg / 2.0,
            elevation_max_deg: vertical_fov_deg / 2.0,
            horizontal_beams,
            vertical_beams,
        }
    }

    pub fn beam_count(&self) -> usize {
        self.horizontal_beams as usize * self.vertical_beams as usize
    }
}

/// Converts an (azimuth, elevation) pair into a unit direction vector.
pub fn direction_from_angles(azimuth: f64, elevation: f64) -> Vector3<f64> {
    let (sin_el, cos_el) = elevation.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();
    Vector3::new(cos_el * cos_az, cos_el * sin_az, sin_el)
}
