// fmcw_core/src/models/perception/range_doppler.rs

use crate::config::{ModelParameters, SensorParameters, ThresholdPolicy};
use crate::models::perception::synthesis::{beat_frequency, return_amplitude};
use crate::models::perception::RayHit;
use rustfft::num_complex::Complex64;

/// A detection candidate of one beam, before noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub range: f64,
    pub radial_velocity: f64,
    /// Normalised magnitude of the peak bin.
    pub strength: f64,
}

/// Turns one beam's spectrum into range/velocity candidates.
///
/// Peaks are local maxima above the threshold policy. The strongest peak of a
/// cluster claims every other peak within `bin_affect_range` bins, and
/// survivors more than `dynamic_range_db` below the beam's strongest peak are
/// discarded as sidelobes.
#[derive(Debug, Clone)]
pub struct RangeDopplerProcessor {
    threshold: ThresholdPolicy,
    dynamic_range_db: f64,
    bin_affect_range: usize,
    range_per_bin: f64,
    kappa: f64,
    f_res: f64,
    power_per_ray_w: f64,
}

impl RangeDopplerProcessor {
    pub fn new(model: &ModelParameters, sensor: &SensorParameters) -> Self {
        Self {
            threshold: sensor.threshold,
            dynamic_range_db: sensor.dynamic_range_db,
            bin_affect_range: sensor.bin_affect_range,
            range_per_bin: sensor.range_per_bin(),
            kappa: sensor.kappa,
            f_res: sensor.f_res,
            power_per_ray_w: model.emitted_power_per_ray_w(),
        }
    }

    /// Candidates of one beam, strongest first.
    pub fn extract(&self, spectrum: &[Complex64], hits: &[RayHit]) -> Vec<Candidate> {
        let magnitudes: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
        let threshold = self.threshold.threshold(&magnitudes);

        // 1. Local maxima above the threshold.
        let mut peaks: Vec<usize> = (0..magnitudes.len())
            .filter(|&k| magnitudes[k] > threshold && is_local_max(&magnitudes, k))
            .collect();
        peaks.sort_by(|&a, &b| magnitudes[b].total_cmp(&magnitudes[a]));

        // 2. Merge leakage into the strongest peak of each cluster.
        let mut accepted: Vec<usize> = Vec::with_capacity(peaks.len());
        for k in peaks {
            if accepted.iter().all(|&a| a.abs_diff(k) > self.bin_affect_range) {
                accepted.push(k);
            }
        }

        // 3. Dynamic-range cut against the strongest peak.
        let Some(&strongest) = accepted.first() else {
            return Vec::new();
        };
        let floor = magnitudes[strongest] * 10f64.powf(-self.dynamic_range_db / 20.0);

        // 4. Sub-bin refinement and velocity of the dominant ray.
        accepted
            .into_iter()
            .filter(|&k| magnitudes[k] >= floor)
            .map(|k| {
                let bin = k as f64 + gaussian_offset(&magnitudes, k);
                Candidate {
                    range: bin * self.range_per_bin,
                    radial_velocity: self.dominant_velocity(bin, hits),
                    strength: magnitudes[k],
                }
            })
            .collect()
    }

    /// Radial velocity of the strongest ray whose beat frequency falls within
    /// `bin_affect_range` bins of `bin`, or 0.0 if none does.
    fn dominant_velocity(&self, bin: f64, hits: &[RayHit]) -> f64 {
        let reach = self.bin_affect_range as f64;
        hits.iter()
            .filter(|hit| (beat_frequency(hit.range, self.kappa) / self.f_res - bin).abs() <= reach)
            .map(|hit| {
                let amplitude = return_amplitude(self.power_per_ray_w, hit.reflectivity_weight, hit.range);
                (amplitude, hit.radial_velocity)
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(0.0, |(_, velocity)| velocity)
    }
}

/// Plateaus report their leftmost bin only.
fn is_local_max(magnitudes: &[f64], k: usize) -> bool {
    let m = magnitudes[k];
    let left_ok = k == 0 || m > magnitudes[k - 1];
    let right_ok = magnitudes.get(k + 1).map_or(true, |&r| m >= r);
    left_ok && right_ok
}

/// Fractional bin offset of the true peak, from a parabola through the log
/// magnitudes of the bin and its neighbours. Clamped to half a bin; zero at the
/// spectrum edges or where the fit is not concave.
fn gaussian_offset(magnitudes: &[f64], k: usize) -> f64 {
    if k == 0 || k + 1 >= magnitudes.len() {
        return 0.0;
    }
    let (a, b, c) = (magnitudes[k - 1], magnitudes[k], magnitudes[k + 1]);
    if !(a > 0.0 && b > 0.0 && c > 0.0) {
        return 0.0;
    }
    let (la, lb, lc) = (a.ln(), b.ln(), c.ln());
    let curvature = la - 2.0 * lb + lc;
    if !(curvature < 0.0) {
        return 0.0;
    }
    (0.5 * (la - lc) / curvature).clamp(-0.5, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorConfig;
    use crate::models::perception::spectrum::spectrum_estimator;
    use crate::models::perception::SpectrumEstimator;
    use approx::assert_abs_diff_eq;

    struct Fixture {
        sensor: SensorParameters,
        estimator: Box<dyn SpectrumEstimator>,
        processor: RangeDopplerProcessor,
    }

    fn fixture() -> Fixture {
        let config = SensorConfig::from_nominal_range(200.0);
        let model = ModelParameters::from_config(&config).unwrap();
        let sensor = SensorParameters::from_config(&config).unwrap();
        Fixture {
            estimator: spectrum_estimator(&model, &sensor),
            processor: RangeDopplerProcessor::new(&model, &sensor),
            sensor,
        }
    }

    fn hit(range: f64, radial_velocity: f64, weight: f64) -> RayHit {
        RayHit {
            ray_id: 0,
            range,
            radial_velocity,
            reflectivity_weight: weight,
        }
    }

    #[test]
    fn test_single_target_range_and_velocity() {
        let f = fixture();
        let hits = [hit(57.3, -4.2, 1.0)];
        let candidates = f.processor.extract(&f.estimator.estimate(&hits), &hits);

        assert_eq!(candidates.len(), 1);
        // Gaussian interpolation lands well inside one bin.
        assert_abs_diff_eq!(candidates[0].range, 57.3, epsilon = 0.25 * f.sensor.range_per_bin());
        assert_abs_diff_eq!(candidates[0].radial_velocity, -4.2, epsilon = 1e-12);
        assert!(candidates[0].strength > 0.0);
    }

    #[test]
    fn test_no_hits_no_candidates() {
        let f = fixture();
        let candidates = f.processor.extract(&f.estimator.estimate(&[]), &[]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_two_separated_targets_strongest_first() {
        let f = fixture();
        let hits = [hit(30.0, 1.0, 1.0), hit(90.0, -2.0, 1.0)];
        let candidates = f.processor.extract(&f.estimator.estimate(&hits), &hits);

        assert_eq!(candidates.len(), 2);
        // The nearer target is louder.
        assert!(candidates[0].strength > candidates[1].strength);
        assert_abs_diff_eq!(candidates[0].range, 30.0, epsilon = f.sensor.range_per_bin());
        assert_abs_diff_eq!(candidates[0].radial_velocity, 1.0);
        assert_abs_diff_eq!(candidates[1].range, 90.0, epsilon = f.sensor.range_per_bin());
        assert_abs_diff_eq!(candidates[1].radial_velocity, -2.0);
    }

    #[test]
    fn test_close_returns_merge_into_one_target() {
        // Sub-rays of one surface spread over a fraction of a bin.
        let f = fixture();
        let rpb = f.sensor.range_per_bin();
        let hits = [
            hit(40.0, 3.0, 0.9),
            hit(40.0 + 0.2 * rpb, 3.1, 1.0),
            hit(40.0 + 0.4 * rpb, 3.2, 0.8),
        ];
        let candidates = f.processor.extract(&f.estimator.estimate(&hits), &hits);
        assert_eq!(candidates.len(), 1);
        // Velocity comes from the loudest contributing ray.
        assert_abs_diff_eq!(candidates[0].radial_velocity, 3.1);
    }

    #[test]
    fn test_fixed_threshold_controls_detection_count() {
        let config = SensorConfig {
            threshold: ThresholdPolicy::Fixed { magnitude: 1.0 },
            ..SensorConfig::from_nominal_range(200.0)
        };
        let model = ModelParameters::from_config(&config).unwrap();
        let sensor = SensorParameters::from_config(&config).unwrap();
        let processor = RangeDopplerProcessor::new(&model, &sensor);
        let estimator = spectrum_estimator(&model, &sensor);

        // 1/9 W at 50 m is far below a unit threshold.
        let hits = [hit(50.0, 0.0, 1.0)];
        assert!(processor.extract(&estimator.estimate(&hits), &hits).is_empty());
    }

    #[test]
    fn test_gaussian_offset_edges() {
        assert_eq!(gaussian_offset(&[1.0, 2.0, 1.0], 0), 0.0);
        assert_eq!(gaussian_offset(&[1.0, 2.0, 1.0], 2), 0.0);
        assert_abs_diff_eq!(gaussian_offset(&[1.0, 2.0, 1.0], 1), 0.0, epsilon = 1e-12);
        // Zero neighbour means no log fit.
        assert_eq!(gaussian_offset(&[0.0, 2.0, 1.0], 1), 0.0);
        assert!(gaussian_offset(&[1.0, 2.0, 1.9], 1) > 0.0);
        assert!(gaussian_offset(&[1.0, 2.0, 1.9], 1) <= 0.5);
    }

    #[test]
    fn test_local_max_plateau_reports_once() {
        let m = [0.0, 2.0, 2.0, 1.0];
        let maxima: Vec<usize> = (0..m.len()).filter(|&k| is_local_max(&m, k)).collect();
        assert_eq!(maxima, vec![1]);
    }
}
