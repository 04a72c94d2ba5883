// fmcw_core/src/models/perception/beam_pattern.rs

use crate::models::perception::SensorRay;
use crate::types::{direction_from_angles, Beam, BeamDivergence, FieldOfView};

/// Builds the static beam table from the field of view.
///
/// Beams are ordered row-major: elevation rows from bottom to top, and within
/// a row azimuth from right (-) to left (+). `beam_idx` is the position in that
/// order, so it is stable for a given configuration. A zero beam count on
/// either axis yields an empty table.
pub fn calculate_beam_pattern(fov: &FieldOfView) -> Vec<Beam> {
    let azimuths = axis_angles(fov.azimuth_min_deg, fov.azimuth_max_deg, fov.horizontal_beams);
    let elevations = axis_angles(
        fov.elevation_min_deg,
        fov.elevation_max_deg,
        fov.vertical_beams,
    );

    let mut beams = Vec::with_capacity(azimuths.len() * elevations.len());
    for &vertical_angle in &elevations {
        for &horizontal_angle in &azimuths {
            beams.push(Beam {
                horizontal_angle,
                vertical_angle,
                beam_idx: beams.len() as u32,
            });
        }
    }
    beams
}

/// Evenly spaced angles (radians) covering `[min_deg, max_deg]` inclusive.
/// A single beam sits in the middle of the bounds.
fn axis_angles(min_deg: f64, max_deg: f64, count: u32) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(0.5 * (min_deg + max_deg)).to_radians()],
        n => {
            let step = (max_deg - min_deg) / (n - 1) as f64;
            (0..n)
                .map(|i| (min_deg + i as f64 * step).to_radians())
                .collect()
        }
    }
}

/// Angular offsets (horizontal, vertical) of the sub-rays of one beam.
///
/// A fixed grid spanning `[-divergence, +divergence]` on each axis; one ray on
/// an axis means no offset on that axis.
pub fn sub_ray_offsets(
    divergence: &BeamDivergence,
    rays_horizontal: u32,
    rays_vertical: u32,
) -> Vec<(f64, f64)> {
    let horizontal = grid_offsets(divergence.horizontal_angle, rays_horizontal);
    let vertical = grid_offsets(divergence.vertical_angle, rays_vertical);

    vertical
        .iter()
        .flat_map(|&dv| horizontal.iter().map(move |&dh| (dh, dv)))
        .collect()
}

fn grid_offsets(half_angle: f64, count: u32) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|i| -half_angle + 2.0 * half_angle * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// The sub-rays of one beam, in the sensor frame.
pub fn beam_rays(beam: &Beam, offsets: &[(f64, f64)]) -> Vec<SensorRay> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, &(dh, dv))| SensorRay {
            id: i as u32,
            direction: direction_from_angles(
                beam.horizontal_angle + dh,
                beam.vertical_angle + dv,
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_beam_count_and_contiguous_indices() {
        for (n_h, n_v) in [(1, 1), (5, 1), (8, 3), (32, 4)] {
            let fov = FieldOfView::symmetric(40.0, 10.0, n_h, n_v);
            let beams = calculate_beam_pattern(&fov);
            assert_eq!(beams.len(), (n_h * n_v) as usize);
            for (i, beam) in beams.iter().enumerate() {
                assert_eq!(beam.beam_idx as usize, i);
            }
        }
    }

    #[test]
    fn test_row_major_order() {
        let beams = calculate_beam_pattern(&FieldOfView::symmetric(20.0, 10.0, 3, 2));
        // First row is the lowest elevation, azimuth ascending.
        assert!(beams[0].horizontal_angle < beams[1].horizontal_angle);
        assert_eq!(beams[0].vertical_angle, beams[2].vertical_angle);
        assert!(beams[3].vertical_angle > beams[0].vertical_angle);
        assert_abs_diff_eq!(beams[0].horizontal_angle, (-10.0f64).to_radians(), epsilon = 1e-12);
        assert_abs_diff_eq!(beams[5].vertical_angle, 5.0f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_fov_gives_symmetric_grid() {
        let beams = calculate_beam_pattern(&FieldOfView::symmetric(60.0, 8.0, 7, 4));
        let n = beams.len();
        for i in 0..n {
            let mirror = &beams[n - 1 - i];
            assert_abs_diff_eq!(beams[i].horizontal_angle, -mirror.horizontal_angle, epsilon = 1e-12);
            assert_abs_diff_eq!(beams[i].vertical_angle, -mirror.vertical_angle, epsilon = 1e-12);
        }
        // Odd horizontal count puts a beam on the boresight.
        assert_abs_diff_eq!(beams[3].horizontal_angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_beam_sits_on_boresight_of_offset_fov() {
        let fov = FieldOfView {
            azimuth_min_deg: 10.0,
            azimuth_max_deg: 30.0,
            elevation_min_deg: -2.0,
            elevation_max_deg: 2.0,
            horizontal_beams: 1,
            vertical_beams: 1,
        };
        let beams = calculate_beam_pattern(&fov);
        assert_eq!(beams.len(), 1);
        assert_abs_diff_eq!(beams[0].horizontal_angle, 20.0f64.to_radians(), epsilon = 1e-12);
        assert_abs_diff_eq!(beams[0].vertical_angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_beams_is_empty_not_error() {
        assert!(calculate_beam_pattern(&FieldOfView::symmetric(60.0, 8.0, 0, 4)).is_empty());
        assert!(calculate_beam_pattern(&FieldOfView::symmetric(60.0, 8.0, 16, 0)).is_empty());
    }

    #[test]
    fn test_sub_ray_grid_spans_divergence() {
        let div = BeamDivergence::from_degrees(1.0, 0.5);
        let offsets = sub_ray_offsets(&div, 3, 2);
        assert_eq!(offsets.len(), 6);
        assert_abs_diff_eq!(offsets[0].0, -div.horizontal_angle, epsilon = 1e-15);
        assert_abs_diff_eq!(offsets[1].0, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(offsets[2].0, div.horizontal_angle, epsilon = 1e-15);
        assert_abs_diff_eq!(offsets[0].1, -div.vertical_angle, epsilon = 1e-15);
        assert_abs_diff_eq!(offsets[5].1, div.vertical_angle, epsilon = 1e-15);

        let single = sub_ray_offsets(&div, 1, 1);
        assert_eq!(single, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_beam_rays_are_unit_vectors_around_nominal() {
        let beam = Beam {
            horizontal_angle: 0.2,
            vertical_angle: -0.05,
            beam_idx: 0,
        };
        let offsets = sub_ray_offsets(&BeamDivergence::from_degrees(0.5, 0.5), 3, 3);
        let rays = beam_rays(&beam, &offsets);
        assert_eq!(rays.len(), 9);
        for ray in &rays {
            assert_abs_diff_eq!(ray.direction.norm(), 1.0, epsilon = 1e-12);
        }
        // The centre ray is the nominal direction.
        assert_abs_diff_eq!((rays[4].direction - beam.direction()).norm(), 0.0, epsilon = 1e-12);
    }
}
