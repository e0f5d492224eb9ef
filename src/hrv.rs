//! Time-domain HRV metrics
//!
//! Computes RMSSD, SDNN, pNN50, the HRV triangular index and TINN from a
//! raw interval sequence. Frequency-domain power is not computed here and
//! the corresponding fields stay 0.
//!
//! Two formulas are documented simplifications kept for output
//! compatibility: TINN is `max - min` rather than a triangular
//! interpolation, and SDNN uses the population divisor.

use crate::types::HrvMetrics;

/// Minimum sequence length the entry points require before invoking HRV
pub const MIN_HRV_SAMPLES: usize = 10;

/// Threshold for a successive difference to count toward pNN50 (ms)
const NN50_THRESHOLD_MS: i64 = 50;

/// Fixed bin width of the triangular-index histogram (ms)
const TRIANGULAR_BIN_WIDTH_MS: i64 = 8;

/// Time-domain HRV calculator
pub struct HrvCalculator;

impl HrvCalculator {
    /// Compute the time-domain metrics for an interval sequence.
    ///
    /// Total over any input: sequences with fewer than 2 samples yield the
    /// all-zero metrics. The ≥10-sample requirement is enforced by the
    /// engine entry points, not here.
    pub fn calculate(values: &[u32]) -> HrvMetrics {
        if values.len() < 2 {
            return HrvMetrics::default();
        }

        let (rmssd, pnn50) = successive_difference_metrics(values);

        HrvMetrics {
            rmssd,
            sdnn: population_std_dev(values),
            pnn50,
            triangular_index: triangular_index(values),
            tinn: tinn(values),
            ..Default::default()
        }
    }
}

/// RMSSD and pNN50 in one pass over the adjacent pairs
fn successive_difference_metrics(values: &[u32]) -> (f64, f64) {
    let pair_count = values.len() - 1;
    let mut sum_sq = 0.0;
    let mut over_threshold = 0usize;

    for w in values.windows(2) {
        let diff = w[1] as i64 - w[0] as i64;
        sum_sq += (diff * diff) as f64;
        if diff.abs() > NN50_THRESHOLD_MS {
            over_threshold += 1;
        }
    }

    let rmssd = (sum_sq / pair_count as f64).sqrt();
    let pnn50 = 100.0 * over_threshold as f64 / pair_count as f64;
    (rmssd, pnn50)
}

/// Population-divisor standard deviation of the interval values
fn population_std_dev(values: &[u32]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Triangular index: total count divided by the tallest bin of a
/// fixed-width (8 ms) histogram. 0 when the histogram is degenerate.
fn triangular_index(values: &[u32]) -> f64 {
    let min = values.iter().copied().min().unwrap_or(0) as i64;
    let max = values.iter().copied().max().unwrap_or(0) as i64;
    let bin_count = ((max - min) / TRIANGULAR_BIN_WIDTH_MS + 1) as usize;

    let mut heights = vec![0usize; bin_count];
    for &v in values {
        let index = ((v as i64 - min) / TRIANGULAR_BIN_WIDTH_MS) as usize;
        heights[index] += 1;
    }

    match heights.iter().copied().max() {
        Some(tallest) if tallest > 0 => values.len() as f64 / tallest as f64,
        _ => 0.0,
    }
}

/// Simplified TINN: the spread of the interval values
fn tinn(values: &[u32]) -> f64 {
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    (max - min) as f64
}
