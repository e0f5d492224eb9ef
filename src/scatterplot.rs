//! Poincaré-plot geometry
//!
//! Builds the lag-1 scatterplot of an interval sequence and derives its
//! dispersion geometry: SD1 (short-term variability, perpendicular to the
//! identity line), SD2 (long-term variability, along it), their ratio, the
//! CSI/CVI indices and the fitted ellipse.
//!
//! CSI here is the documented simplification (CSI = SD2), kept for output
//! compatibility with existing consumers.

use crate::types::{PoincareEllipse, PoincarePoint, ScatterplotData};

/// Minimum sequence length that produces a non-empty plot
pub const MIN_SCATTERPLOT_SAMPLES: usize = 2;

/// Poincaré-plot analyzer
pub struct ScatterplotAnalyzer;

impl ScatterplotAnalyzer {
    /// Build the plot and its geometry for an interval sequence.
    ///
    /// Sequences shorter than 2 yield the zero-value result rather than an
    /// error; the minimum-window precondition lives at the entry points.
    pub fn build_scatterplot(values: &[u32]) -> ScatterplotData {
        if values.len() < MIN_SCATTERPLOT_SAMPLES {
            return ScatterplotData::default();
        }

        let points: Vec<PoincarePoint> = values
            .windows(2)
            .map(|w| PoincarePoint {
                rr_n: w[0],
                rr_next: w[1],
            })
            .collect();

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.rr_n as f64).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.rr_next as f64).sum::<f64>() / n;

        let sd1 = short_term_dispersion(&points);
        let sd2 = long_term_dispersion(&points, mean_x + mean_y);

        let sd1_sd2_ratio = if sd2 == 0.0 { 0.0 } else { sd1 / sd2 };
        let cvi = if sd1 * sd2 > 0.0 {
            (sd1 * sd2).ln()
        } else {
            0.0
        };

        ScatterplotData {
            points,
            sd1,
            sd2,
            sd1_sd2_ratio,
            csi: sd2,
            cvi,
            ellipse: PoincareEllipse {
                center_x: mean_x,
                center_y: mean_y,
                sd1,
                sd2,
                area: std::f64::consts::PI * sd1 * sd2,
            },
        }
    }
}

/// SD1: dispersion of the pair differences around their mean, halved
/// under the square root. Population divisor over the pair count.
fn short_term_dispersion(points: &[PoincarePoint]) -> f64 {
    let n = points.len() as f64;
    let mean = points
        .iter()
        .map(|p| p.rr_next as f64 - p.rr_n as f64)
        .sum::<f64>()
        / n;

    let variance = points
        .iter()
        .map(|p| {
            let d = (p.rr_next as f64 - p.rr_n as f64) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (variance / 2.0).sqrt()
}

/// SD2: dispersion of the pair sums around twice the combined mean
/// (`mean_x + mean_y`), halved under the square root.
fn long_term_dispersion(points: &[PoincarePoint], double_center: f64) -> f64 {
    let n = points.len() as f64;
    let variance = points
        .iter()
        .map(|p| {
            let d = (p.rr_n as f64 + p.rr_next as f64) - double_center;
            d * d
        })
        .sum::<f64>()
        / n;
    (variance / 2.0).sqrt()
}
