// fmcw_core/src/models/perception/ray_caster.rs

use crate::messages::{SceneObject, SceneSnapshot, Shape};
use crate::models::perception::{RayCaster, RayHit, SensorRay};
use nalgebra::{Point3, Unit, Vector3};

/// Hits closer than this are treated as starting on the surface.
const MIN_HIT_DISTANCE: f64 = 1e-9;

/// Closed-form ray caster for the scene's primitive shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticRayCaster;

/// A surface intersection in world coordinates.
#[derive(Debug, Clone, Copy)]
struct Intersection {
    distance: f64,
    normal: Unit<Vector3<f64>>,
}

impl RayCaster for AnalyticRayCaster {
    fn cast(
        &self,
        ray: &SensorRay,
        scene: &SceneSnapshot,
        min_range: f64,
        max_range: f64,
    ) -> Option<RayHit> {
        // 1. Bring the ray into the world frame.
        let origin = Point3::from(scene.sensor_pose.translation.vector);
        let direction = scene.sensor_pose.rotation * ray.direction;

        // 2. Nearest positive hit over all objects. A closer object occludes
        //    everything behind it, even if it is itself out of range.
        let (object, hit) = scene
            .objects
            .iter()
            .filter_map(|object| intersect(object, &origin, &direction).map(|hit| (object, hit)))
            .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))?;

        if !(hit.distance >= min_range && hit.distance <= max_range) {
            return None;
        }

        // 3. Kinematics and return weight at the hit point.
        let relative_velocity = object.velocity - scene.sensor_velocity;
        let cos_incidence = direction.dot(&hit.normal).abs();

        Some(RayHit {
            ray_id: ray.id,
            range: hit.distance,
            radial_velocity: relative_velocity.dot(&direction),
            reflectivity_weight: object.reflectivity.max(0.0) * cos_incidence,
        })
    }
}

fn intersect(
    object: &SceneObject,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<Intersection> {
    let hit = match object.shape {
        Shape::Sphere { radius } => intersect_sphere(object, radius, origin, direction),
        Shape::Box {
            length,
            width,
            height,
        } => intersect_box(
            object,
            Vector3::new(length, width, height) * 0.5,
            origin,
            direction,
        ),
    }?;
    hit.distance.is_finite().then_some(hit)
}

fn intersect_sphere(
    object: &SceneObject,
    radius: f64,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<Intersection> {
    if !(radius > 0.0) {
        return None;
    }
    let center = Point3::from(object.pose.translation.vector);
    let oc = *origin - center;
    let b = oc.dot(direction);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    // Entry point first; from inside the sphere only the exit is visible.
    let distance = [-b - root, -b + root]
        .into_iter()
        .find(|&t| t > MIN_HIT_DISTANCE)?;

    let point = *origin + direction * distance;
    Some(Intersection {
        distance,
        normal: Unit::new_normalize(point - center),
    })
}

/// Slab test in the box's local frame.
fn intersect_box(
    object: &SceneObject,
    half_extents: Vector3<f64>,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<Intersection> {
    if half_extents.iter().any(|&h| !(h > 0.0)) {
        return None;
    }
    let local_origin = object.pose.inverse_transform_point(origin);
    let local_direction = object.pose.inverse_transform_vector(direction);

    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    let mut enter_axis = 0;
    let mut exit_axis = 0;

    for axis in 0..3 {
        let o = local_origin[axis];
        let d = local_direction[axis];
        let h = half_extents[axis];

        if d.abs() < 1e-12 {
            // Parallel to this slab: either always inside it or never.
            if o.abs() > h {
                return None;
            }
            continue;
        }

        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > t_enter {
            t_enter = near;
            enter_axis = axis;
        }
        if far < t_exit {
            t_exit = far;
            exit_axis = axis;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    let (distance, axis, sign) = if t_enter > MIN_HIT_DISTANCE {
        (t_enter, enter_axis, -local_direction[enter_axis].signum())
    } else if t_exit > MIN_HIT_DISTANCE {
        (t_exit, exit_axis, local_direction[exit_axis].signum())
    } else {
        return None;
    };

    let mut local_normal = Vector3::zeros();
    local_normal[axis] = sign;
    Some(Intersection {
        distance,
        normal: Unit::new_normalize(object.pose.rotation * local_normal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};
    use std::f64::consts::FRAC_PI_4;

    fn forward_ray() -> SensorRay {
        SensorRay {
            id: 7,
            direction: Vector3::x(),
        }
    }

    fn scene_with(objects: Vec<SceneObject>) -> SceneSnapshot {
        SceneSnapshot::empty(0.0).with_objects(objects)
    }

    fn wall_at(id: u64, x_face: f64) -> SceneObject {
        SceneObject::new(
            id,
            Shape::Box {
                length: 1.0,
                width: 10.0,
                height: 10.0,
            },
            Isometry3::translation(x_face + 0.5, 0.0, 0.0),
        )
    }

    #[test]
    fn test_sphere_hit_range_and_weight() {
        let sphere = SceneObject::new(
            1,
            Shape::Sphere { radius: 2.0 },
            Isometry3::translation(12.0, 0.0, 0.0),
        )
        .with_reflectivity(0.5);
        let hit = AnalyticRayCaster
            .cast(&forward_ray(), &scene_with(vec![sphere]), 0.5, 100.0)
            .expect("ray should hit the sphere");

        assert_eq!(hit.ray_id, 7);
        assert_abs_diff_eq!(hit.range, 10.0, epsilon = 1e-9);
        // Head-on incidence keeps the full reflectivity.
        assert_abs_diff_eq!(hit.reflectivity_weight, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_box_face_hit() {
        let hit = AnalyticRayCaster
            .cast(&forward_ray(), &scene_with(vec![wall_at(1, 25.0)]), 0.5, 100.0)
            .unwrap();
        assert_abs_diff_eq!(hit.range, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.reflectivity_weight, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotated_box_incidence() {
        // A thin plate yawed by 45 degrees reflects with cos(45).
        let plate = SceneObject::new(
            1,
            Shape::Box {
                length: 0.1,
                width: 10.0,
                height: 10.0,
            },
            Isometry3::from_parts(
                Translation3::new(20.0, 0.0, 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
            ),
        );
        let hit = AnalyticRayCaster
            .cast(&forward_ray(), &scene_with(vec![plate]), 0.5, 100.0)
            .unwrap();
        assert_abs_diff_eq!(hit.reflectivity_weight, FRAC_PI_4.cos(), epsilon = 1e-9);
        assert!(hit.range < 20.0 && hit.range > 19.9);
    }

    #[test]
    fn test_nearest_object_wins() {
        let scene = scene_with(vec![wall_at(1, 40.0), wall_at(2, 15.0), wall_at(3, 30.0)]);
        let hit = AnalyticRayCaster.cast(&forward_ray(), &scene, 0.5, 100.0).unwrap();
        assert_abs_diff_eq!(hit.range, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range_is_no_hit_and_occludes() {
        let caster = AnalyticRayCaster;
        assert!(caster
            .cast(&forward_ray(), &scene_with(vec![wall_at(1, 50.01)]), 0.5, 50.0)
            .is_none());
        // An object closer than min_range hides the wall behind it.
        let scene = scene_with(vec![wall_at(1, 0.2), wall_at(2, 10.0)]);
        assert!(caster.cast(&forward_ray(), &scene, 0.5, 50.0).is_none());
    }

    #[test]
    fn test_objects_behind_sensor_are_ignored() {
        let scene = scene_with(vec![wall_at(1, -20.0)]);
        assert!(AnalyticRayCaster.cast(&forward_ray(), &scene, 0.5, 50.0).is_none());
    }

    #[test]
    fn test_radial_velocity_sign() {
        let receding = wall_at(1, 20.0).with_velocity(Vector3::new(3.0, 1.0, 0.0));
        let hit = AnalyticRayCaster
            .cast(&forward_ray(), &scene_with(vec![receding]), 0.5, 100.0)
            .unwrap();
        assert_abs_diff_eq!(hit.radial_velocity, 3.0, epsilon = 1e-12);

        // Sensor driving towards a static wall sees it approach.
        let mut scene = scene_with(vec![wall_at(1, 20.0)]);
        scene.sensor_velocity = Vector3::new(5.0, 0.0, 0.0);
        let hit = AnalyticRayCaster.cast(&forward_ray(), &scene, 0.5, 100.0).unwrap();
        assert_abs_diff_eq!(hit.radial_velocity, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sensor_pose_is_applied() {
        // Sensor at x=5 looking along +Y sees the sphere at y=10.
        let mut scene = scene_with(vec![SceneObject::new(
            1,
            Shape::Sphere { radius: 1.0 },
            Isometry3::translation(5.0, 10.0, 0.0),
        )]);
        scene.sensor_pose = Isometry3::from_parts(
            Translation3::new(5.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        );
        let hit = AnalyticRayCaster.cast(&forward_ray(), &scene, 0.5, 100.0).unwrap();
        assert_abs_diff_eq!(hit.range, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let scene = scene_with(vec![
            SceneObject::new(1, Shape::Sphere { radius: 0.0 }, Isometry3::translation(5.0, 0.0, 0.0)),
            SceneObject::new(
                2,
                Shape::Box {
                    length: -1.0,
                    width: 1.0,
                    height: 1.0,
                },
                Isometry3::translation(6.0, 0.0, 0.0),
            ),
        ]);
        assert!(AnalyticRayCaster.cast(&forward_ray(), &scene, 0.5, 100.0).is_none());
    }

    #[test]
    fn test_sample_beam_collects_hits() {
        let rays = vec![
            forward_ray(),
            SensorRay {
                id: 8,
                direction: -Vector3::x(),
            },
        ];
        let hits = AnalyticRayCaster.sample_beam(&rays, &scene_with(vec![wall_at(1, 10.0)]), 0.5, 100.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ray_id, 7);
    }
}
