// fmcw_core/src/error.rs

use thiserror::Error;

/// Every way a parameter set can violate its invariants.
///
/// Each variant names the broken invariant and carries the offending values,
/// so the message alone is enough to fix the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("fft_size must be at least 2, got {0}")]
    FftSizeTooSmall(usize),

    #[error("invalid range window: min_range={min_range} m, max_range={max_range} m")]
    InvalidRange { min_range: f64, max_range: f64 },

    #[error("f_res={f_res} Hz does not match sample_frequency / fft_size = {expected} Hz")]
    FrequencyResolutionMismatch { f_res: f64, expected: f64 },

    #[error("kappa={kappa} Hz/s does not match bandwidth / ramp_duration = {expected} Hz/s")]
    ChirpSlopeMismatch { kappa: f64, expected: f64 },

    #[error("num_fft_bins={num_fft_bins} must be between 1 and fft_size / 2 = {limit}")]
    TooManyBins { num_fft_bins: usize, limit: usize },

    #[error("window_function has {len} coefficients but fft_size is {fft_size}")]
    WindowLengthMismatch { len: usize, fft_size: usize },

    #[error("max_range={max_range} m lies beyond the last usable bin at {limit} m")]
    RangeBeyondBins { max_range: f64, limit: f64 },

    #[error("rays_per_beam={rays_per_beam} is not {horizontal} x {vertical}")]
    RayCountMismatch {
        rays_per_beam: u32,
        horizontal: u32,
        vertical: u32,
    },

    #[error("{horizontal} x {vertical} rays per beam overflows the ray count")]
    TooManyRays { horizontal: u32, vertical: u32 },

    #[error(
        "emitted_power_per_ray_w={per_ray} W does not match {per_beam_mw} mW over {rays_per_beam} rays"
    )]
    RayPowerMismatch {
        per_ray: f64,
        per_beam_mw: f64,
        rays_per_beam: u32,
    },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidNoise { name: &'static str, value: f64 },

    #[error("beam divergence must be finite and non-negative, got ({horizontal}, {vertical}) rad")]
    InvalidDivergence { horizontal: f64, vertical: f64 },

    #[error("{axis} field of view is inverted or not finite: [{min_deg}, {max_deg}] deg")]
    InvalidFieldOfView {
        axis: &'static str,
        min_deg: f64,
        max_deg: f64,
    },

    #[error("detection_probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("invalid detection threshold: {0}")]
    InvalidThreshold(String),
}
