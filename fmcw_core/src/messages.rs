// fmcw_core/src/messages.rs

use crate::types::{direction_from_angles, BeamIndex};
use nalgebra::{Isometry3, Point3, Vector3};
use serde::Serialize;

// =========================================================================
// == Scene Input (ground truth, consumed not owned) ==
// =========================================================================

/// Geometry of a ground-truth object, in the object's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere {
        radius: f64,
    },
    /// A box centred on the object origin; extents along local x, y, z.
    Box {
        length: f64,
        width: f64,
        height: f64,
    },
}

/// One ground-truth entity of the scene snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: u64,
    pub shape: Shape,
    /// Pose of the object in the world frame.
    pub pose: Isometry3<f64>,
    /// Linear velocity in the world frame, m/s.
    pub velocity: Vector3<f64>,
    /// Scalar material reflectivity, 1.0 is a perfect reflector.
    pub reflectivity: f64,
}

impl SceneObject {
    pub fn new(id: u64, shape: Shape, pose: Isometry3<f64>) -> Self {
        Self {
            id,
            shape,
            pose,
            velocity: Vector3::zeros(),
            reflectivity: 1.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Self {
        self.reflectivity = reflectivity;
        self
    }
}

/// The idealised scene handed to the sensor each step.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Simulated time of the snapshot, seconds.
    pub timestamp: f64,
    /// Pose of the sensor frame in the world.
    pub sensor_pose: Isometry3<f64>,
    /// Linear velocity of the sensor in the world frame.
    pub sensor_velocity: Vector3<f64>,
    pub objects: Vec<SceneObject>,
}

impl SceneSnapshot {
    /// A scene with the sensor at the world origin, at rest, and nothing in it.
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            sensor_pose: Isometry3::identity(),
            sensor_velocity: Vector3::zeros(),
            objects: Vec::new(),
        }
    }

    pub fn with_objects(mut self, objects: Vec<SceneObject>) -> Self {
        self.objects = objects;
        self
    }
}

// =========================================================================
// == Sensor Output ==
// =========================================================================

/// One reported observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub beam_idx: BeamIndex,
    /// Measured range, m.
    pub range: f64,
    /// Measured radial velocity, m/s. Positive means receding.
    pub radial_velocity: f64,
    /// Azimuth of the reporting beam, rad.
    pub azimuth: f64,
    /// Elevation of the reporting beam, rad.
    pub elevation: f64,
    /// Relative signal strength (normalised spectrum magnitude).
    pub strength: f64,
}

impl Detection {
    /// The detection as a point in the sensor frame.
    pub fn position(&self) -> Point3<f64> {
        Point3::from(direction_from_angles(self.azimuth, self.elevation) * self.range)
    }
}

/// Everything the sensor reports for one step.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SensorOutput {
    pub timestamp: f64,
    pub detections: Vec<Detection>,
}

impl SensorOutput {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Detections reported by one beam, strongest first.
    pub fn for_beam(&self, beam_idx: BeamIndex) -> impl Iterator<Item = &Detection> {
        self.detections.iter().filter(move |d| d.beam_idx == beam_idx)
    }
}
