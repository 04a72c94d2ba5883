// fmcw_sim/src/simulation/scenario.rs

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::simulation::config::{EgoConfig, ObjectConfig, ScenarioConfig, ShapeConfig};
use fmcw_core::messages::{SceneObject, SceneSnapshot, Shape};

/// A kinematic world: every actor keeps its initial heading and velocity.
#[derive(Debug, Clone)]
pub struct Scenario {
    ego: EgoConfig,
    objects: Vec<ObjectConfig>,
}

impl Scenario {
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            ego: config.ego.clone(),
            objects: config.objects.clone(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The ground truth at time `t`, with the sensor at its mounting point on
    /// the ego vehicle.
    pub fn snapshot_at(&self, t: f64) -> SceneSnapshot {
        let ego_pose = pose_at(self.ego.position, self.ego.velocity, self.ego.yaw_deg, t);
        let sensor_pose = ego_pose * Translation3::from(Vector3::from(self.ego.mount_offset));

        let objects = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, object)| {
                SceneObject::new(
                    i as u64,
                    to_shape(object.shape),
                    pose_at(object.position, object.velocity, object.yaw_deg, t),
                )
                .with_velocity(Vector3::from(object.velocity))
                .with_reflectivity(object.reflectivity)
            })
            .collect();

        SceneSnapshot {
            timestamp: t,
            sensor_pose,
            sensor_velocity: Vector3::from(self.ego.velocity),
            objects,
        }
    }
}

fn pose_at(position: [f64; 3], velocity: [f64; 3], yaw_deg: f64, t: f64) -> Isometry3<f64> {
    let position = Vector3::from(position) + Vector3::from(velocity) * t;
    Isometry3::from_parts(
        Translation3::from(position),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw_deg.to_radians()),
    )
}

fn to_shape(shape: ShapeConfig) -> Shape {
    match shape {
        ShapeConfig::Sphere { radius } => Shape::Sphere { radius },
        ShapeConfig::Box {
            size: [length, width, height],
        } => Shape::Box {
            length,
            width,
            height,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scenario() -> Scenario {
        Scenario::new(&ScenarioConfig {
            ego: EgoConfig {
                position: [0.0, 0.0, 0.0],
                yaw_deg: 90.0,
                velocity: [0.0, 5.0, 0.0],
                mount_offset: [2.0, 0.0, 0.5],
            },
            objects: vec![ObjectConfig {
                name: "lead".into(),
                shape: ShapeConfig::Box {
                    size: [4.0, 2.0, 1.5],
                },
                position: [0.0, 30.0, 0.0],
                yaw_deg: 90.0,
                velocity: [0.0, 3.0, 0.0],
                reflectivity: 0.8,
            }],
            ..ScenarioConfig::default()
        })
    }

    #[test]
    fn test_objects_move_at_constant_velocity() {
        let snapshot = scenario().snapshot_at(2.0);
        let lead = &snapshot.objects[0];
        assert_abs_diff_eq!(lead.pose.translation.vector, Vector3::new(0.0, 36.0, 0.0), epsilon = 1e-12);
        assert_eq!(lead.velocity, Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(lead.reflectivity, 0.8);
        assert_eq!(
            lead.shape,
            Shape::Box {
                length: 4.0,
                width: 2.0,
                height: 1.5
            }
        );
        assert_eq!(snapshot.timestamp, 2.0);
    }

    #[test]
    fn test_sensor_mount_follows_ego_heading() {
        let snapshot = scenario().snapshot_at(1.0);
        // Ego faces +Y, so a forward mount offset lands on +Y.
        assert_abs_diff_eq!(
            snapshot.sensor_pose.translation.vector,
            Vector3::new(0.0, 7.0, 0.5),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            snapshot.sensor_pose.rotation * Vector3::x(),
            Vector3::y(),
            epsilon = 1e-12
        );
        assert_eq!(snapshot.sensor_velocity, Vector3::new(0.0, 5.0, 0.0));
    }
}
