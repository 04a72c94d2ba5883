// fmcw_sim/src/simulation/runner.rs

use std::sync::Arc;

use fmcw_core::prelude::*;

use crate::error::SimError;
use crate::simulation::config::ScenarioConfig;
use crate::simulation::scenario::Scenario;

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outputs: Vec<SensorOutput>,
}

impl RunReport {
    pub fn total_detections(&self) -> usize {
        self.outputs.iter().map(|o| o.detections.len()).sum()
    }
}

/// Step times `0, dt, 2 dt, ...` up to and including `duration`.
pub fn step_times(step_size: f64, duration: f64) -> Result<Vec<f64>, SimError> {
    if !(step_size.is_finite() && step_size > 0.0) {
        return Err(SimError::InvalidScenario(format!(
            "step_size must be finite and positive, got {step_size}"
        )));
    }
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(SimError::InvalidScenario(format!(
            "duration_seconds must be finite and non-negative, got {duration}"
        )));
    }
    // Tolerate the rounding of e.g. 1.0 / 0.1.
    let steps = (duration / step_size + 1e-9).floor() as usize;
    Ok((0..=steps).map(|i| i as f64 * step_size).collect())
}

/// Builds the sensor from `sensor_config` and steps it through the scenario.
pub fn run_scenario(
    config: &ScenarioConfig,
    sensor_config: &SensorConfig,
    sink: Arc<dyn LogSink>,
) -> Result<RunReport, SimError> {
    let simulation = &config.simulation;
    let times = step_times(simulation.step_size, simulation.duration_seconds)?;

    let mut logger = Logger::new(simulation.instance_name.as_str(), sink, simulation.logging);
    if !simulation.log_categories.is_empty() {
        logger = logger.with_categories(simulation.log_categories.iter().map(String::as_str));
    }

    let mut sensor = SensorModel::from_config(sensor_config, logger)?;
    let scenario = Scenario::new(config);

    tracing::info!(
        beams = sensor.beams().len(),
        objects = scenario.object_count(),
        steps = times.len(),
        "Starting scenario run"
    );

    let mut report = RunReport::default();
    for t in times {
        let output = sensor.step(&scenario.snapshot_at(t), t);
        tracing::debug!(t, detections = output.detections.len(), "Sensor step");
        report.outputs.push(output);
    }

    tracing::info!(
        detections = report.total_detections(),
        "Scenario run complete"
    );
    Ok(report)
}
