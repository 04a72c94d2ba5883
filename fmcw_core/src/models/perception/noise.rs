// fmcw_core/src/models/perception/noise.rs

use crate::models::perception::range_doppler::Candidate;
use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

/// Returns `measurand + N(0, std)`.
///
/// A zero standard deviation returns the measurand untouched and draws
/// nothing from `rng`. The result is not clamped.
pub fn add_noise<F, R>(measurand: F, std: F, rng: &mut R) -> F
where
    F: Float,
    StandardNormal: Distribution<F>,
    R: Rng + ?Sized,
{
    if std == F::zero() {
        return measurand;
    }
    match Normal::new(F::zero(), std) {
        Ok(distribution) => measurand + distribution.sample(rng),
        // Rejected by validation before any step runs.
        Err(_) => measurand,
    }
}

/// Perturbs candidate range and velocity with independent Gaussian noise.
#[derive(Debug, Clone, Copy)]
pub struct NoiseInjector {
    pub distance_std: f64,
    pub velocity_std: f64,
}

impl NoiseInjector {
    pub fn new(distance_std: f64, velocity_std: f64) -> Self {
        Self {
            distance_std,
            velocity_std,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, candidate: Candidate, rng: &mut R) -> Candidate {
        Candidate {
            range: add_noise(candidate.range, self.distance_std, rng),
            radial_velocity: add_noise(candidate.radial_velocity, self.velocity_std, rng),
            strength: candidate.strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_stats(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var.sqrt())
    }

    #[test]
    fn test_noise_is_calibrated() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let std = 0.3;
        let samples: Vec<f64> = (0..20_000).map(|_| add_noise(10.0, std, &mut rng)).collect();
        let (mean, sample_std) = sample_stats(&samples);

        // Standard error of the mean is std / sqrt(N) ~ 0.002.
        assert_abs_diff_eq!(mean, 10.0, epsilon = 0.01);
        assert!((sample_std - std).abs() / std < 0.02, "sample std {sample_std}");
    }

    #[test]
    fn test_zero_std_is_identity_and_draws_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut reference = rng.clone();
        assert_eq!(add_noise(3.5f64, 0.0, &mut rng), 3.5);
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_works_for_f32() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let noisy: f32 = add_noise(1.0f32, 0.1, &mut rng);
        assert!(noisy.is_finite());
        assert_ne!(noisy, 1.0);
    }

    #[test]
    fn test_injector_keeps_strength() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let candidate = Candidate {
            range: 20.0,
            radial_velocity: -1.0,
            strength: 0.4,
        };
        let noisy = NoiseInjector::new(0.05, 0.1).apply(candidate, &mut rng);
        assert_eq!(noisy.strength, 0.4);
        assert_ne!(noisy.range, candidate.range);
        assert_ne!(noisy.radial_velocity, candidate.radial_velocity);

        let exact = NoiseInjector::new(0.0, 0.0).apply(candidate, &mut rng);
        assert_eq!(exact, candidate);
    }
}
