// fmcw_core/src/models/perception/spectrum.rs

//! Spectrum estimation strategies.
//!
//! Both strategies return the first `num_fft_bins` complex bins divided by the
//! window's coherent gain, so a single return of amplitude `A` peaks at `~A`
//! whichever path produced it.

use crate::config::{ModelParameters, SensorParameters, SpectrumKind};
use crate::models::perception::synthesis::{beat_frequency, return_amplitude, BeatSignalSynthesizer};
use crate::models::perception::{RayHit, SignalSynthesizer, SpectrumEstimator};
use crate::utils::window::coherent_gain;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

/// Builds the estimator selected by `sensor.spectrum`.
pub fn spectrum_estimator(
    model: &ModelParameters,
    sensor: &SensorParameters,
) -> Box<dyn SpectrumEstimator> {
    match sensor.spectrum {
        SpectrumKind::Fft => Box::new(FftSpectrum::new(
            Box::new(BeatSignalSynthesizer::new(model, sensor)),
            sensor,
        )),
        SpectrumKind::Kernel => Box::new(KernelSpectrum::new(model, sensor)),
    }
}

// =========================================================================
// == Time-domain path ==
// =========================================================================

/// Synthesizes the beat signal, windows it and runs a forward FFT.
#[derive(Clone)]
pub struct FftSpectrum {
    synthesizer: Box<dyn SignalSynthesizer>,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    gain: f64,
    num_bins: usize,
}

impl fmt::Debug for FftSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftSpectrum")
            .field("synthesizer", &self.synthesizer)
            .field("fft_size", &self.window.len())
            .field("num_bins", &self.num_bins)
            .finish()
    }
}

impl FftSpectrum {
    pub fn new(synthesizer: Box<dyn SignalSynthesizer>, sensor: &SensorParameters) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            synthesizer,
            fft: planner.plan_fft_forward(sensor.fft_size),
            window: sensor.window_function.clone(),
            gain: coherent_gain(&sensor.window_function),
            num_bins: sensor.num_fft_bins,
        }
    }
}

impl SpectrumEstimator for FftSpectrum {
    fn estimate(&self, hits: &[RayHit]) -> Vec<Complex64> {
        let signal = self.synthesizer.synthesize(hits);
        let mut buffer: Vec<Complex64> = signal
            .iter()
            .zip(&self.window)
            .map(|(s, w)| Complex64::new(s * w, 0.0))
            .collect();
        // A synthesizer that returns a short frame is zero-padded.
        buffer.resize(self.window.len(), Complex64::new(0.0, 0.0));

        self.fft.process(&mut buffer);
        buffer.truncate(self.num_bins);
        for bin in &mut buffer {
            *bin /= self.gain;
        }
        buffer
    }
}

// =========================================================================
// == Direct bin accumulation ==
// =========================================================================

/// Adds each ray's windowed tone response straight into the bins it affects.
///
/// The window's frequency response `W(d) = sum_n w[n] exp(-j 2 pi d n / N)` is
/// tabulated once over `d` in `[-bin_affect_range, +bin_affect_range]` with
/// `window_data_per_bin` samples per bin. A ray whose beat frequency sits at
/// fractional bin `p` contributes `A/2 * W(k - p)` to every bin `k` within
/// `bin_affect_range` of `p`. The negative-frequency image is ignored.
#[derive(Debug, Clone)]
pub struct KernelSpectrum {
    response: Vec<Complex64>,
    samples_per_bin: usize,
    bin_affect_range: usize,
    num_bins: usize,
    gain: f64,
    kappa: f64,
    f_res: f64,
    power_per_ray_w: f64,
}

impl KernelSpectrum {
    pub fn new(model: &ModelParameters, sensor: &SensorParameters) -> Self {
        let samples_per_bin = sensor.window_data_per_bin.max(1);
        let half_width = sensor.bin_affect_range * samples_per_bin;
        let n = sensor.window_function.len() as f64;

        let response = (0..=2 * half_width)
            .map(|i| {
                let offset = (i as f64 - half_width as f64) / samples_per_bin as f64;
                sensor
                    .window_function
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| Complex64::from_polar(w, -TAU * offset * k as f64 / n))
                    .sum()
            })
            .collect();

        Self {
            response,
            samples_per_bin,
            bin_affect_range: sensor.bin_affect_range,
            num_bins: sensor.num_fft_bins,
            gain: coherent_gain(&sensor.window_function),
            kappa: sensor.kappa,
            f_res: sensor.f_res,
            power_per_ray_w: model.emitted_power_per_ray_w(),
        }
    }

    /// Tabulated response at a bin offset, nearest sample.
    fn response_at(&self, offset: f64) -> Option<Complex64> {
        let index = ((offset + self.bin_affect_range as f64) * self.samples_per_bin as f64).round();
        if index < 0.0 {
            return None;
        }
        self.response.get(index as usize).copied()
    }
}

impl SpectrumEstimator for KernelSpectrum {
    fn estimate(&self, hits: &[RayHit]) -> Vec<Complex64> {
        let mut spectrum = vec![Complex64::new(0.0, 0.0); self.num_bins];
        let reach = self.bin_affect_range as f64;

        for hit in hits {
            let amplitude = return_amplitude(self.power_per_ray_w, hit.reflectivity_weight, hit.range);
            if amplitude == 0.0 {
                continue;
            }
            let position = beat_frequency(hit.range, self.kappa) / self.f_res;
            let first = (position - reach).ceil().max(0.0) as usize;
            let last = (position + reach).floor();
            if last < 0.0 {
                continue;
            }
            let last = (last as usize).min(self.num_bins.saturating_sub(1));

            for k in first..=last {
                if let Some(w) = self.response_at(k as f64 - position) {
                    spectrum[k] += w * (0.5 * amplitude / self.gain);
                }
            }
        }
        spectrum
    }
}
