// fmcw_core/src/models/perception/assembler.rs

use crate::config::SensorParameters;
use crate::messages::Detection;
use crate::models::perception::range_doppler::Candidate;
use crate::types::Beam;

/// The noised candidates of one beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamCandidates {
    pub beam: Beam,
    pub candidates: Vec<Candidate>,
}

/// Collects every beam's candidates into the step's detection list.
#[derive(Debug, Clone, Copy)]
pub struct DetectionAssembler {
    min_range: f64,
    max_range: f64,
}

impl DetectionAssembler {
    pub fn new(sensor: &SensorParameters) -> Self {
        Self {
            min_range: sensor.min_range,
            max_range: sensor.max_range,
        }
    }

    /// Drops candidates whose noised range left `[min_range, max_range]`, then
    /// orders by beam index and, within a beam, by descending strength.
    pub fn assemble(&self, beams: Vec<BeamCandidates>) -> Vec<Detection> {
        let mut detections: Vec<Detection> = beams
            .into_iter()
            .flat_map(|BeamCandidates { beam, candidates }| {
                candidates.into_iter().map(move |c| Detection {
                    beam_idx: beam.beam_idx,
                    range: c.range,
                    radial_velocity: c.radial_velocity,
                    azimuth: beam.horizontal_angle,
                    elevation: beam.vertical_angle,
                    strength: c.strength,
                })
            })
            .filter(|d| d.range >= self.min_range && d.range <= self.max_range)
            .collect();

        detections.sort_by(|a, b| {
            a.beam_idx
                .cmp(&b.beam_idx)
                .then_with(|| b.strength.total_cmp(&a.strength))
        });
        detections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> DetectionAssembler {
        DetectionAssembler {
            min_range: 1.0,
            max_range: 100.0,
        }
    }

    fn beam(idx: u32) -> Beam {
        Beam {
            horizontal_angle: 0.1 * idx as f64,
            vertical_angle: 0.0,
            beam_idx: idx,
        }
    }

    fn candidate(range: f64, strength: f64) -> Candidate {
        Candidate {
            range,
            radial_velocity: 0.0,
            strength,
        }
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(assembler().assemble(Vec::new()).is_empty());
        let silent = vec![BeamCandidates {
            beam: beam(0),
            candidates: Vec::new(),
        }];
        assert!(assembler().assemble(silent).is_empty());
    }

    #[test]
    fn test_out_of_range_candidates_dropped() {
        let detections = assembler().assemble(vec![BeamCandidates {
            beam: beam(3),
            candidates: vec![
                candidate(0.99, 1.0),
                candidate(1.0, 0.5),
                candidate(100.0, 0.4),
                candidate(100.01, 0.3),
            ],
        }]);
        assert_eq!(detections.len(), 2);
        assert!(detections.iter().all(|d| (1.0..=100.0).contains(&d.range)));
    }

    #[test]
    fn test_ordered_by_beam_then_strength() {
        let detections = assembler().assemble(vec![
            BeamCandidates {
                beam: beam(2),
                candidates: vec![candidate(10.0, 0.1), candidate(20.0, 0.9)],
            },
            BeamCandidates {
                beam: beam(0),
                candidates: vec![candidate(30.0, 0.2), candidate(40.0, 0.7)],
            },
        ]);
        let order: Vec<(u32, f64)> = detections.iter().map(|d| (d.beam_idx, d.strength)).collect();
        assert_eq!(order, vec![(0, 0.7), (0, 0.2), (2, 0.9), (2, 0.1)]);
        // Beam angles are carried over.
        assert_eq!(detections[2].azimuth, 0.2);
    }
}
