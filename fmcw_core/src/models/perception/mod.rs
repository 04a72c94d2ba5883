// fmcw_core/src/models/perception/mod.rs

pub mod assembler;
pub mod beam_pattern;
pub mod noise;
pub mod range_doppler;
pub mod ray_caster;
pub mod spectrum;
pub mod synthesis;

use crate::messages::SceneSnapshot;
use dyn_clone::DynClone;
use nalgebra::Vector3;
use rustfft::num_complex::Complex64;
use std::fmt::Debug;

/// Represents a single sub-ray of a beam.
/// The direction is in the SENSOR's local coordinate frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRay {
    /// Identifier of this ray within its beam.
    pub id: u32,
    /// The direction vector of the ray. Unit length.
    pub direction: Vector3<f64>,
}

/// The geometric return of one sub-ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The ID of the ray that produced this hit.
    pub ray_id: u32,
    /// Distance from the sensor to the hit surface, m.
    pub range: f64,
    /// Relative velocity projected on the ray, m/s. Positive = receding.
    pub radial_velocity: f64,
    /// Reflectivity times the cosine of the incidence angle.
    pub reflectivity_weight: f64,
}

// =========================================================================
// == Pipeline Strategies ==
// =========================================================================

/// Casts sub-rays against a scene snapshot.
///
/// Implementations must be pure: the same rays and scene always produce the
/// same hits, whatever thread calls them.
pub trait RayCaster: Send + Sync + DynClone + Debug {
    /// Nearest hit of one ray, or `None` if the ray misses or the nearest
    /// surface lies outside `[min_range, max_range]`.
    fn cast(
        &self,
        ray: &SensorRay,
        scene: &SceneSnapshot,
        min_range: f64,
        max_range: f64,
    ) -> Option<RayHit>;

    /// All hits of one beam's sub-rays.
    fn sample_beam(
        &self,
        rays: &[SensorRay],
        scene: &SceneSnapshot,
        min_range: f64,
        max_range: f64,
    ) -> Vec<RayHit> {
        rays.iter()
            .filter_map(|ray| self.cast(ray, scene, min_range, max_range))
            .collect()
    }
}

/// Turns one beam's hits into a sampled beat signal of `fft_size` samples.
pub trait SignalSynthesizer: Send + Sync + DynClone + Debug {
    fn synthesize(&self, hits: &[RayHit]) -> Vec<f64>;
}

/// Turns one beam's hits into the first `num_fft_bins` bins of its
/// normalised spectrum.
pub trait SpectrumEstimator: Send + Sync + DynClone + Debug {
    fn estimate(&self, hits: &[RayHit]) -> Vec<Complex64>;
}

// Make the trait objects cloneable.
dyn_clone::clone_trait_object!(RayCaster);
dyn_clone::clone_trait_object!(SignalSynthesizer);
dyn_clone::clone_trait_object!(SpectrumEstimator);
