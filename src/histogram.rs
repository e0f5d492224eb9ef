//! Histogram construction
//!
//! This module bins a raw interval sequence into a standard histogram, or
//! the successive differences between adjacent intervals into a
//! differential histogram. Binning is integer arithmetic over `i64` so the
//! same path serves raw values and (possibly negative) differences.
//!
//! When no bin count is requested, the count is chosen by Sturges' rule
//! `round(1 + log2(n))` and clamped to a per-histogram band: the
//! differential band is tighter because difference magnitudes are smaller
//! and less dispersed than the raw intervals.

use crate::statistics::StatisticsCalculator;
use crate::types::{
    DifferentialHistogramData, DifferentialStatistics, HistogramBin, HistogramData,
};

/// Adaptive bin-count band for the standard histogram
const STANDARD_BINS_MIN: usize = 15;
const STANDARD_BINS_MAX: usize = 30;

/// Adaptive bin-count band for the differential histogram
const DIFFERENTIAL_BINS_MIN: usize = 10;
const DIFFERENTIAL_BINS_MAX: usize = 25;

/// Histogram builder for interval and difference distributions
pub struct HistogramBuilder;

impl HistogramBuilder {
    /// Bin a raw interval sequence.
    ///
    /// `bins_count` of 0 requests the adaptive count. An empty sequence
    /// yields the empty result (`bins: [], total_count: 0, bin_width: 0`).
    pub fn build_histogram(values: &[u32], bins_count: usize) -> HistogramData {
        if values.is_empty() {
            return HistogramData::default();
        }

        let bins_count = if bins_count == 0 {
            sturges(values.len()).clamp(STANDARD_BINS_MIN, STANDARD_BINS_MAX)
        } else {
            bins_count
        };

        let series: Vec<i64> = values.iter().map(|&v| v as i64).collect();
        let (bins, bin_width) = bin_series(&series, bins_count);

        HistogramData {
            bins,
            total_count: values.len(),
            bin_width,
            statistics: StatisticsCalculator::summarize(values),
        }
    }

    /// Bin the successive differences `values[i+1] - values[i]`.
    ///
    /// Sequences shorter than 2 yield the empty result. The embedded
    /// statistics use the population divisor and include the RMSSD of the
    /// difference series.
    pub fn build_differential_histogram(
        values: &[u32],
        bins_count: usize,
    ) -> DifferentialHistogramData {
        if values.len() < 2 {
            return DifferentialHistogramData::default();
        }

        let differences: Vec<i64> = values
            .windows(2)
            .map(|w| w[1] as i64 - w[0] as i64)
            .collect();

        let bins_count = if bins_count == 0 {
            sturges(differences.len()).clamp(DIFFERENTIAL_BINS_MIN, DIFFERENTIAL_BINS_MAX)
        } else {
            bins_count
        };

        let (bins, bin_width) = bin_series(&differences, bins_count);
        let statistics = difference_statistics(&differences);

        DifferentialHistogramData {
            bins,
            total_count: differences.len(),
            bin_width,
            statistics,
        }
    }
}

/// Sturges' rule: `round(1 + log2(n))`
fn sturges(n: usize) -> usize {
    (1.0 + (n as f64).log2()).round() as usize
}

/// Bin an integer series into `bins_count` equal-width bins.
///
/// `bin_width = max(1, (max - min) / bins_count)` with integer (floor)
/// division; indices past the top edge are clamped into the last bin, so
/// rounding overflow accumulates there rather than being dropped.
fn bin_series(series: &[i64], bins_count: usize) -> (Vec<HistogramBin>, i64) {
    let min = series.iter().copied().min().unwrap_or(0);
    let max = series.iter().copied().max().unwrap_or(0);
    let bin_width = ((max - min) / bins_count as i64).max(1);

    let mut counts = vec![0usize; bins_count];
    for &v in series {
        let index = (((v - min) / bin_width) as usize).min(bins_count - 1);
        counts[index] += 1;
    }

    let total = series.len() as f64;
    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let range_start = min + i as i64 * bin_width;
            HistogramBin {
                range_start,
                range_end: range_start + bin_width,
                count,
                frequency: count as f64 / total,
            }
        })
        .collect();

    (bins, bin_width)
}

/// Population-divisor statistics plus RMSSD over a difference series
fn difference_statistics(differences: &[i64]) -> DifferentialStatistics {
    let count = differences.len();
    if count == 0 {
        return DifferentialStatistics::default();
    }

    let n = count as f64;
    let mean = differences.iter().sum::<i64>() as f64 / n;
    let variance = differences
        .iter()
        .map(|&d| {
            let dev = d as f64 - mean;
            dev * dev
        })
        .sum::<f64>()
        / n;
    let mean_square = differences.iter().map(|&d| (d * d) as f64).sum::<f64>() / n;

    DifferentialStatistics {
        mean,
        std_dev: variance.sqrt(),
        min: differences.iter().copied().min().unwrap_or(0) as f64,
        max: differences.iter().copied().max().unwrap_or(0) as f64,
        count,
        rmssd: mean_square.sqrt(),
    }
}
