// fmcw_core/src/models/perception/synthesis.rs

use crate::config::{ModelParameters, SensorParameters};
use crate::models::perception::{RayHit, SignalSynthesizer};
use crate::types::SPEED_OF_LIGHT;
use std::f64::consts::TAU;

/// Beat frequency of a return at `range` for a chirp of slope `kappa`.
pub fn beat_frequency(range: f64, kappa: f64) -> f64 {
    2.0 * range * kappa / SPEED_OF_LIGHT
}

/// Amplitude of one ray's return: `P_ray * w / R^2`.
///
/// Non-positive or non-finite ranges carry no energy.
pub fn return_amplitude(power_per_ray_w: f64, weight: f64, range: f64) -> f64 {
    if !(range.is_finite() && range > 0.0) {
        return 0.0;
    }
    power_per_ray_w * weight / (range * range)
}

/// Sums one cosine tone per ray hit into a real beat signal.
#[derive(Debug, Clone)]
pub struct BeatSignalSynthesizer {
    kappa: f64,
    sample_frequency: f64,
    fft_size: usize,
    power_per_ray_w: f64,
}

impl BeatSignalSynthesizer {
    pub fn new(model: &ModelParameters, sensor: &SensorParameters) -> Self {
        Self {
            kappa: sensor.kappa,
            sample_frequency: sensor.sample_frequency,
            fft_size: sensor.fft_size,
            power_per_ray_w: model.emitted_power_per_ray_w(),
        }
    }
}

impl SignalSynthesizer for BeatSignalSynthesizer {
    fn synthesize(&self, hits: &[RayHit]) -> Vec<f64> {
        let mut signal = vec![0.0; self.fft_size];

        for hit in hits {
            let amplitude = return_amplitude(self.power_per_ray_w, hit.reflectivity_weight, hit.range);
            if amplitude == 0.0 {
                continue;
            }
            // Phase advance per sample, in radians.
            let omega = TAU * beat_frequency(hit.range, self.kappa) / self.sample_frequency;
            for (n, sample) in signal.iter_mut().enumerate() {
                *sample += amplitude * (omega * n as f64).cos();
            }
        }
        signal
    }
}
