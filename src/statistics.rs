//! Descriptive statistics
//!
//! This module reduces a raw interval sequence to its summary statistics.
//! The standard deviation here is the sample variant (n-1 divisor); the HRV
//! and differential-histogram paths deliberately use the population variant
//! instead, and the two are kept separate.

use crate::types::StatisticalSummary;

/// Summary-statistics calculator for raw interval sequences
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Compute mean, sample standard deviation, min, max and count.
    ///
    /// An empty sequence yields the all-zero summary. A single value has a
    /// standard deviation of 0.
    pub fn summarize(values: &[u32]) -> StatisticalSummary {
        if values.is_empty() {
            return StatisticalSummary::default();
        }

        let count = values.len();
        let mut sum: u64 = 0;
        let mut min = values[0];
        let mut max = values[0];

        for &v in values {
            sum += v as u64;
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }

        let mean = sum as f64 / count as f64;
        let std_dev = sample_std_dev(values, mean);

        StatisticalSummary {
            mean,
            std_dev,
            min: min as f64,
            max: max as f64,
            count,
        }
    }
}

/// Sample standard deviation (n-1 divisor); 0 for fewer than two values
fn sample_std_dev(values: &[u32], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
