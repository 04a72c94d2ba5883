// fmcw_core/src/config.rs

//! Parameter sets of the sensor.
//!
//! `SensorConfig` is the raw, human-facing description (degrees, milliwatts,
//! optional derived values). It is turned into the two validated parameter
//! sets used by the pipeline: `ModelParameters` (ray geometry) and
//! `SensorParameters` (signal processing). Derived quantities are computed
//! exactly once, here, and the invariants between them are checked before any
//! step can run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::perception::beam_pattern::calculate_beam_pattern;
use crate::types::{Beam, BeamDivergence, FieldOfView, SPEED_OF_LIGHT};
use crate::utils::stats::{median, relative_eq};
use crate::utils::window::{coherent_gain, WindowKind};

/// Relative tolerance for the derived-value invariants.
const INVARIANT_TOLERANCE: f64 = 1e-9;

/// Seed used by `SensorConfig::from_nominal_range`.
pub const DEFAULT_SEED: u64 = 0x5EED;

// =========================================================================
// == Processing Policies ==
// =========================================================================

/// How a spectrum bin is judged to contain a target.
///
/// This is the knob that directly controls the detection count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum ThresholdPolicy {
    /// A bin must exceed an absolute (normalised) magnitude.
    Fixed { magnitude: f64 },
    /// A bin must exceed `factor` times the median magnitude of its beam's
    /// spectrum, and never less than `min_magnitude`.
    NoiseFloor { factor: f64, min_magnitude: f64 },
}

impl ThresholdPolicy {
    /// The detection threshold for one beam's magnitude spectrum.
    pub fn threshold(&self, magnitudes: &[f64]) -> f64 {
        match *self {
            ThresholdPolicy::Fixed { magnitude } => magnitude,
            ThresholdPolicy::NoiseFloor {
                factor,
                min_magnitude,
            } => (factor * median(magnitudes)).max(min_magnitude),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ThresholdPolicy::Fixed { magnitude } if !(magnitude.is_finite() && magnitude > 0.0) => {
                Err(ConfigError::InvalidThreshold(format!(
                    "fixed magnitude must be finite and positive, got {magnitude}"
                )))
            }
            ThresholdPolicy::NoiseFloor {
                factor,
                min_magnitude,
            } if !(factor.is_finite()
                && factor >= 1.0
                && min_magnitude.is_finite()
                && min_magnitude > 0.0) =>
            {
                Err(ConfigError::InvalidThreshold(format!(
                    "noise floor needs factor >= 1 and min_magnitude > 0, got factor={factor}, min_magnitude={min_magnitude}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::NoiseFloor {
            factor: 10.0,
            min_magnitude: 1e-9,
        }
    }
}

/// Which strategy turns ray hits into a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SpectrumKind {
    /// Synthesize the time-domain beat signal, window it and FFT it.
    #[default]
    Fft,
    /// Add each ray's windowed tone response directly into the spectrum bins.
    Kernel,
}

// =========================================================================
// == Raw Configuration ==
// =========================================================================

/// The complete configuration of one sensor instance, as read from a
/// scenario or prefab file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    /// Seed of the noise generator. `None` seeds from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub field_of_view: FieldOfView,
    /// Half-angle beam spread [horizontal, vertical] in degrees.
    pub beam_divergence_deg: [f64; 2],
    /// Sub-ray grid per beam [horizontal, vertical].
    pub rays_per_beam: [u32; 2],
    pub emitted_power_per_beam_mw: f64,

    /// Standard deviation of the range noise, in meters.
    pub distance_noise_std: f64,
    /// Standard deviation of the radial velocity noise, in m/s.
    pub velocity_noise_std: f64,

    pub wavelength_m: f64,
    pub min_range: f64,
    pub max_range: f64,

    pub sample_frequency: f64,
    pub bandwidth: f64,
    pub fft_size: usize,
    /// Defaults to `fft_size / 2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_fft_bins: Option<usize>,
    /// Defaults to `fft_size / sample_frequency`, one FFT frame per ramp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp_duration: Option<f64>,

    #[serde(default)]
    pub window: WindowKind,
    #[serde(default = "default_window_data_per_bin")]
    pub window_data_per_bin: usize,
    #[serde(default = "default_bin_affect_range")]
    pub bin_affect_range: usize,

    #[serde(default)]
    pub threshold: ThresholdPolicy,
    /// Peaks weaker than the strongest peak of the beam by more than this are
    /// treated as leakage.
    #[serde(default = "default_dynamic_range_db")]
    pub dynamic_range_db: f64,
    /// Probability that a spectral peak is reported at all.
    #[serde(default = "default_detection_probability")]
    pub detection_probability: f64,
    #[serde(default)]
    pub spectrum: SpectrumKind,
}

fn default_window_data_per_bin() -> usize {
    16
}
fn default_bin_affect_range() -> usize {
    4
}
fn default_dynamic_range_db() -> f64 {
    60.0
}
fn default_detection_probability() -> f64 {
    1.0
}

impl SensorConfig {
    /// Derives a complete configuration from the nominal range alone.
    ///
    /// A 77 GHz-class FMCW front end: 20 MHz sampling, 1024-point frames and a
    /// bandwidth chosen so the last usable bin sits 25 % beyond the nominal
    /// range.
    pub fn from_nominal_range(nominal_range: f64) -> Self {
        let fft_size = 1024;
        let num_fft_bins = fft_size / 2;
        let sample_frequency = 20.0e6;
        let unambiguous_range = 1.25 * nominal_range;
        let bandwidth = num_fft_bins as f64 * SPEED_OF_LIGHT / (2.0 * unambiguous_range);

        Self {
            seed: Some(DEFAULT_SEED),
            field_of_view: FieldOfView::symmetric(60.0, 8.0, 32, 4),
            beam_divergence_deg: [0.5, 0.5],
            rays_per_beam: [3, 3],
            emitted_power_per_beam_mw: 1000.0,
            distance_noise_std: 0.05,
            velocity_noise_std: 0.1,
            wavelength_m: 0.0039,
            min_range: 0.5,
            max_range: nominal_range,
            sample_frequency,
            bandwidth,
            fft_size,
            num_fft_bins: None,
            ramp_duration: None,
            window: WindowKind::BlackmanHarris,
            window_data_per_bin: default_window_data_per_bin(),
            bin_affect_range: default_bin_affect_range(),
            threshold: ThresholdPolicy::default(),
            dynamic_range_db: default_dynamic_range_db(),
            detection_probability: default_detection_probability(),
            spectrum: SpectrumKind::Fft,
        }
    }
}

// =========================================================================
// == Ray Geometry Parameters ==
// =========================================================================

/// Ray-geometry configuration.
///
/// The ray counts and the per-ray power are private: they can only change
/// together through `set_ray_sampling` / `set_emitted_power_per_beam_mw`, so
/// `rays_per_beam` and `emitted_power_per_ray_w` are always consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub beam_config: Vec<Beam>,
    pub beam_divergence: BeamDivergence,
    pub field_of_view: FieldOfView,

    emitted_power_per_beam_mw: f64,
    emitted_power_per_ray_w: f64,

    rays_per_beam_horizontal: u32,
    rays_per_beam_vertical: u32,
    rays_per_beam: u32,

    pub distance_noise_std: f64,
    pub velocity_noise_std: f64,
}

impl ModelParameters {
    /// Builds the parameter set and its beam table. Call `validate` before use.
    pub fn new(
        field_of_view: FieldOfView,
        beam_divergence: BeamDivergence,
        emitted_power_per_beam_mw: f64,
        rays_per_beam_horizontal: u32,
        rays_per_beam_vertical: u32,
        distance_noise_std: f64,
        velocity_noise_std: f64,
    ) -> Self {
        let mut params = Self {
            beam_config: calculate_beam_pattern(&field_of_view),
            beam_divergence,
            field_of_view,
            emitted_power_per_beam_mw,
            emitted_power_per_ray_w: 0.0,
            rays_per_beam_horizontal: 0,
            rays_per_beam_vertical: 0,
            rays_per_beam: 0,
            distance_noise_std,
            velocity_noise_std,
        };
        params.set_ray_sampling(rays_per_beam_horizontal, rays_per_beam_vertical);
        params
    }

    pub fn from_config(config: &SensorConfig) -> Result<Self, ConfigError> {
        let params = Self::new(
            config.field_of_view,
            BeamDivergence::from_degrees(config.beam_divergence_deg[0], config.beam_divergence_deg[1]),
            config.emitted_power_per_beam_mw,
            config.rays_per_beam[0],
            config.rays_per_beam[1],
            config.distance_noise_std,
            config.velocity_noise_std,
        );
        params.validate()?;
        Ok(params)
    }

    /// Changes the sub-ray grid and re-derives everything that depends on it.
    pub fn set_ray_sampling(&mut self, horizontal: u32, vertical: u32) {
        self.rays_per_beam_horizontal = horizontal;
        self.rays_per_beam_vertical = vertical;
        self.rays_per_beam = horizontal.saturating_mul(vertical);
        self.update_power_per_ray();
    }

    pub fn set_emitted_power_per_beam_mw(&mut self, power_mw: f64) {
        self.emitted_power_per_beam_mw = power_mw;
        self.update_power_per_ray();
    }

    fn update_power_per_ray(&mut self) {
        // mW -> W, split evenly over the sub-rays.
        self.emitted_power_per_ray_w = if self.rays_per_beam == 0 {
            0.0
        } else {
            self.emitted_power_per_beam_mw / 1000.0 / self.rays_per_beam as f64
        };
    }

    pub fn emitted_power_per_beam_mw(&self) -> f64 {
        self.emitted_power_per_beam_mw
    }
    pub fn emitted_power_per_ray_w(&self) -> f64 {
        self.emitted_power_per_ray_w
    }
    pub fn rays_per_beam_horizontal(&self) -> u32 {
        self.rays_per_beam_horizontal
    }
    pub fn rays_per_beam_vertical(&self) -> u32 {
        self.rays_per_beam_vertical
    }
    pub fn rays_per_beam(&self) -> u32 {
        self.rays_per_beam
    }

    /// Checks every invariant of the ray-geometry parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = &self.field_of_view;
        check_axis("azimuth", fov.azimuth_min_deg, fov.azimuth_max_deg)?;
        check_axis("elevation", fov.elevation_min_deg, fov.elevation_max_deg)?;

        let div = &self.beam_divergence;
        if !(div.horizontal_angle.is_finite()
            && div.vertical_angle.is_finite()
            && div.horizontal_angle >= 0.0
            && div.vertical_angle >= 0.0)
        {
            return Err(ConfigError::InvalidDivergence {
                horizontal: div.horizontal_angle,
                vertical: div.vertical_angle,
            });
        }

        if self.rays_per_beam_horizontal == 0 {
            return Err(ConfigError::NonPositive {
                name: "rays_per_beam_horizontal",
                value: 0.0,
            });
        }
        if self.rays_per_beam_vertical == 0 {
            return Err(ConfigError::NonPositive {
                name: "rays_per_beam_vertical",
                value: 0.0,
            });
        }
        let expected_rays = self
            .rays_per_beam_horizontal
            .checked_mul(self.rays_per_beam_vertical)
            .ok_or(ConfigError::TooManyRays {
                horizontal: self.rays_per_beam_horizontal,
                vertical: self.rays_per_beam_vertical,
            })?;
        if self.rays_per_beam != expected_rays {
            return Err(ConfigError::RayCountMismatch {
                rays_per_beam: self.rays_per_beam,
                horizontal: self.rays_per_beam_horizontal,
                vertical: self.rays_per_beam_vertical,
            });
        }

        check_positive("emitted_power_per_beam_mW", self.emitted_power_per_beam_mw)?;
        let expected = self.emitted_power_per_beam_mw / 1000.0 / self.rays_per_beam as f64;
        if !relative_eq(self.emitted_power_per_ray_w, expected, INVARIANT_TOLERANCE) {
            return Err(ConfigError::RayPowerMismatch {
                per_ray: self.emitted_power_per_ray_w,
                per_beam_mw: self.emitted_power_per_beam_mw,
                rays_per_beam: self.rays_per_beam,
            });
        }

        check_noise("distance_noise_std", self.distance_noise_std)?;
        check_noise("velocity_noise_std", self.velocity_noise_std)?;
        Ok(())
    }
}

// =========================================================================
// == Signal Processing Parameters ==
// =========================================================================

/// Signal-processing configuration. Plain data; `validate` enforces the
/// relations between the fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorParameters {
    pub wavelength_m: f64,
    pub min_range: f64,
    pub max_range: f64,

    pub ramp_duration: f64,
    pub sample_frequency: f64,
    pub bandwidth: f64,
    /// Width of one frequency bin, Hz.
    pub f_res: f64,
    /// Chirp slope, Hz/s.
    pub kappa: f64,

    // fourier tracing parameters
    pub window_data_per_bin: usize,
    pub bin_affect_range: usize,
    pub window_function: Vec<f64>,
    pub fft_size: usize,
    pub num_fft_bins: usize,

    // detection policy
    pub threshold: ThresholdPolicy,
    pub dynamic_range_db: f64,
    pub detection_probability: f64,
    pub spectrum: SpectrumKind,
}

impl SensorParameters {
    /// Derives `f_res`, `kappa`, the ramp duration and the window, then validates.
    pub fn from_config(config: &SensorConfig) -> Result<Self, ConfigError> {
        if config.fft_size < 2 {
            return Err(ConfigError::FftSizeTooSmall(config.fft_size));
        }
        let fft_size = config.fft_size;
        let ramp_duration = config
            .ramp_duration
            .unwrap_or(fft_size as f64 / config.sample_frequency);

        let params = Self {
            wavelength_m: config.wavelength_m,
            min_range: config.min_range,
            max_range: config.max_range,
            ramp_duration,
            sample_frequency: config.sample_frequency,
            bandwidth: config.bandwidth,
            f_res: config.sample_frequency / fft_size as f64,
            kappa: config.bandwidth / ramp_duration,
            window_data_per_bin: config.window_data_per_bin,
            bin_affect_range: config.bin_affect_range,
            window_function: config.window.coefficients(fft_size),
            fft_size,
            num_fft_bins: config.num_fft_bins.unwrap_or(fft_size / 2),
            threshold: config.threshold,
            dynamic_range_db: config.dynamic_range_db,
            detection_probability: config.detection_probability,
            spectrum: config.spectrum,
        };
        params.validate()?;
        Ok(params)
    }

    /// Range covered by one frequency bin: `c * f_res / (2 * kappa)`.
    pub fn range_per_bin(&self) -> f64 {
        SPEED_OF_LIGHT * self.f_res / (2.0 * self.kappa)
    }

    /// Range of a (fractional) bin position.
    pub fn bin_to_range(&self, bin: f64) -> f64 {
        bin * self.range_per_bin()
    }

    /// Fractional bin position of a range.
    pub fn range_to_bin(&self, range: f64) -> f64 {
        range / self.range_per_bin()
    }

    /// Checks every invariant of the signal-processing parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 2 {
            return Err(ConfigError::FftSizeTooSmall(self.fft_size));
        }
        check_positive("wavelength_m", self.wavelength_m)?;
        check_positive("sample_frequency", self.sample_frequency)?;
        check_positive("bandwidth", self.bandwidth)?;
        check_positive("ramp_duration", self.ramp_duration)?;
        check_positive("f_res", self.f_res)?;
        check_positive("kappa", self.kappa)?;

        if !(self.min_range.is_finite()
            && self.max_range.is_finite()
            && self.min_range >= 0.0
            && self.min_range < self.max_range)
        {
            return Err(ConfigError::InvalidRange {
                min_range: self.min_range,
                max_range: self.max_range,
            });
        }

        let expected_f_res = self.sample_frequency / self.fft_size as f64;
        if !relative_eq(self.f_res, expected_f_res, INVARIANT_TOLERANCE) {
            return Err(ConfigError::FrequencyResolutionMismatch {
                f_res: self.f_res,
                expected: expected_f_res,
            });
        }

        let expected_kappa = self.bandwidth / self.ramp_duration;
        if !relative_eq(self.kappa, expected_kappa, INVARIANT_TOLERANCE) {
            return Err(ConfigError::ChirpSlopeMismatch {
                kappa: self.kappa,
                expected: expected_kappa,
            });
        }

        let limit = self.fft_size / 2;
        if self.num_fft_bins == 0 || self.num_fft_bins > limit {
            return Err(ConfigError::TooManyBins {
                num_fft_bins: self.num_fft_bins,
                limit,
            });
        }

        if self.window_function.len() != self.fft_size {
            return Err(ConfigError::WindowLengthMismatch {
                len: self.window_function.len(),
                fft_size: self.fft_size,
            });
        }
        check_positive("window coherent gain", coherent_gain(&self.window_function))?;

        if self.window_data_per_bin == 0 {
            return Err(ConfigError::NonPositive {
                name: "window_data_per_bin",
                value: 0.0,
            });
        }

        self.threshold.validate()?;
        if !(self.dynamic_range_db.is_finite() && self.dynamic_range_db >= 0.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "dynamic_range_db must be finite and non-negative, got {}",
                self.dynamic_range_db
            )));
        }
        if !(0.0..=1.0).contains(&self.detection_probability) {
            return Err(ConfigError::InvalidProbability(self.detection_probability));
        }

        let last_bin_range = self.bin_to_range((self.num_fft_bins - 1) as f64);
        if self.max_range > last_bin_range {
            return Err(ConfigError::RangeBeyondBins {
                max_range: self.max_range,
                limit: last_bin_range,
            });
        }
        Ok(())
    }
}

// --- Validation helpers ---

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn check_noise(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidNoise { name, value })
    }
}

fn check_axis(axis: &'static str, min_deg: f64, max_deg: f64) -> Result<(), ConfigError> {
    if min_deg.is_finite() && max_deg.is_finite() && min_deg <= max_deg {
        Ok(())
    } else {
        Err(ConfigError::InvalidFieldOfView {
            axis,
            min_deg,
            max_deg,
        })
    }
}
