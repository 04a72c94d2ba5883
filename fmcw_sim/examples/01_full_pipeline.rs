// fmcw_sim/examples/01_full_pipeline.rs

//! A full end-to-end run of the sensor model without any files on disk.
//!
//! This example demonstrates how to:
//! 1. Derive a sensor configuration from a nominal range and tweak it.
//! 2. Build a `SensorModel` with an in-memory log sink.
//! 3. Step it through a hand-built scene and print the detections.
//!
//! To run this example:
//! `cargo run --example 01_full_pipeline`

use std::sync::Arc;

use fmcw_core::prelude::*;
use nalgebra::{Isometry3, Vector3};

fn main() -> Result<(), ConfigError> {
    // --- 1. Configuration ---
    let config = SensorConfig {
        field_of_view: FieldOfView::symmetric(30.0, 6.0, 15, 3),
        ..SensorConfig::from_nominal_range(120.0)
    };

    // --- 2. Model ---
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new("front_radar", sink.clone(), true);
    let mut sensor = SensorModel::from_config(&config, logger)?;
    println!(
        "{} beams, {:.3} m per bin",
        sensor.beams().len(),
        sensor.sensor_params().range_per_bin()
    );

    // --- 3. Scene: a car ahead closing in, a pedestrian-sized sphere to the left ---
    let car = SceneObject::new(
        1,
        Shape::Box {
            length: 4.5,
            width: 1.8,
            height: 1.5,
        },
        Isometry3::translation(35.0, 0.0, 0.0),
    )
    .with_velocity(Vector3::new(-4.0, 0.0, 0.0));
    let pedestrian = SceneObject::new(2, Shape::Sphere { radius: 0.4 }, Isometry3::translation(18.0, 3.0, 0.0))
        .with_reflectivity(0.3);

    for i in 0..5 {
        let t = i as f64 * 0.1;
        let scene = SceneSnapshot::empty(t).with_objects(vec![
            SceneObject {
                pose: Isometry3::translation(35.0 - 4.0 * t, 0.0, 0.0),
                ..car.clone()
            },
            pedestrian.clone(),
        ]);

        let output = sensor.step(&scene, t);
        println!("t={t:.1}s: {} detections", output.detections.len());
        for d in &output.detections {
            let p = d.position();
            println!(
                "  beam {:>3}: r={:6.2} m v={:5.2} m/s at ({:.1}, {:.1}, {:.1})",
                d.beam_idx, d.range, d.radial_velocity, p.x, p.y, p.z
            );
        }
    }

    println!("{} log records buffered", sink.records().len());
    Ok(())
}
