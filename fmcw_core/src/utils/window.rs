// fmcw_core/src/utils/window.rs

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// The window families the sensor can be configured with.
///
/// All windows are generated in their periodic (DFT-even) form, which is the
/// right choice when the window feeds an FFT of the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WindowKind {
    Rectangular,
    Hann,
    Hamming,
    /// 4-term Blackman-Harris, sidelobes below -92 dB, main lobe +-4 bins.
    #[default]
    BlackmanHarris,
}

impl WindowKind {
    /// Cosine-sum coefficients `a_k` of the window: `w[n] = sum (-1)^k a_k cos(2 pi k n / N)`.
    fn cosine_terms(self) -> &'static [f64] {
        match self {
            WindowKind::Rectangular => &[1.0],
            WindowKind::Hann => &[0.5, 0.5],
            WindowKind::Hamming => &[0.54, 0.46],
            WindowKind::BlackmanHarris => &[0.35875, 0.48829, 0.14128, 0.01168],
        }
    }

    /// Generates `len` window coefficients.
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        let terms = self.cosine_terms();
        (0..len)
            .map(|n| {
                let phase = TAU * n as f64 / len as f64;
                terms
                    .iter()
                    .enumerate()
                    .map(|(k, a)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * a * (k as f64 * phase).cos()
                    })
                    .sum()
            })
            .collect()
    }
}

/// Coherent gain of a real sinusoid through the window, i.e. the factor that
/// maps a unit-amplitude tone to its peak FFT magnitude.
pub fn coherent_gain(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / 2.0
}
