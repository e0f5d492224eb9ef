//! Trend analysis
//!
//! This module aggregates raw samples into fixed time windows and analyzes
//! the window means for direction, linear correlation against time, and a
//! coarse hour-of-day seasonality profile.

use crate::types::{
    AggregatedWindow, AnalysisPeriod, OverallTrend, RrSample, RrTrendAnalysis, TimeRange,
    TrendDirection, TrendPoint,
};
use chrono::{DateTime, Timelike, Utc};
use std::collections::BTreeMap;

/// Deadband for per-point direction: changes within ±10 ms are stable
const DIRECTION_DEADBAND_MS: f64 = 10.0;

/// Correlation magnitude above which the overall trend is directional
const TREND_CORRELATION_THRESHOLD: f64 = 0.3;

/// Trend analyzer over pre-aggregated windows
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Analyze a window sequence for direction, correlation and seasonality.
    ///
    /// An empty sequence yields the defined insufficient-data result:
    /// no points, a stable overall trend, and zero correlation.
    pub fn analyze_trends(windows: &[AggregatedWindow], range: &TimeRange) -> RrTrendAnalysis {
        let period = AnalysisPeriod::from_duration(range.duration());

        if windows.is_empty() {
            return RrTrendAnalysis {
                points: Vec::new(),
                period,
                overall_trend: OverallTrend::Stable,
                correlation: 0.0,
                seasonality: [0.0; 24],
                trend_strength: 0.0,
            };
        }

        let points = direction_points(windows);
        let correlation = index_correlation(windows);

        let overall_trend = if correlation > TREND_CORRELATION_THRESHOLD {
            OverallTrend::Increasing
        } else if correlation < -TREND_CORRELATION_THRESHOLD {
            OverallTrend::Decreasing
        } else {
            OverallTrend::Stable
        };

        RrTrendAnalysis {
            points,
            period,
            overall_trend,
            correlation,
            seasonality: hourly_seasonality(windows),
            trend_strength: correlation.abs(),
        }
    }
}

/// Group samples into fixed windows and average each group.
///
/// Each sample's timestamp is truncated to its window boundary; groups are
/// returned ascending by window start. Part of the engine core: stores may
/// precompute the same aggregation, and this is its reference behavior.
pub fn aggregate_windows(samples: &[RrSample], window_minutes: u32) -> Vec<AggregatedWindow> {
    if window_minutes == 0 {
        return Vec::new();
    }
    let window_secs = window_minutes as i64 * 60;

    let mut groups: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for sample in samples {
        let boundary = sample.timestamp.timestamp().div_euclid(window_secs) * window_secs;
        let entry = groups.entry(boundary).or_insert((0.0, 0));
        entry.0 += sample.value_ms as f64;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .filter_map(|(boundary, (sum, count))| {
            DateTime::<Utc>::from_timestamp(boundary, 0).map(|time| AggregatedWindow {
                time,
                mean_ms: sum / count as f64,
            })
        })
        .collect()
}

/// Per-window direction against the previous window, with a deadband
fn direction_points(windows: &[AggregatedWindow]) -> Vec<TrendPoint> {
    windows
        .iter()
        .enumerate()
        .map(|(i, window)| {
            let direction = if i == 0 {
                TrendDirection::Stable
            } else {
                let diff = window.mean_ms - windows[i - 1].mean_ms;
                if diff > DIRECTION_DEADBAND_MS {
                    TrendDirection::Up
                } else if diff < -DIRECTION_DEADBAND_MS {
                    TrendDirection::Down
                } else {
                    TrendDirection::Stable
                }
            };
            TrendPoint {
                time: window.time,
                value: window.mean_ms,
                direction,
            }
        })
        .collect()
}

/// Pearson correlation of window index (0, 1, 2, ...) against window mean.
///
/// 0 when the denominator vanishes (fewer than two windows, or a series
/// with no variance).
fn index_correlation(windows: &[AggregatedWindow]) -> f64 {
    let n = windows.len() as f64;
    if windows.len() < 2 {
        return 0.0;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;

    for (i, window) in windows.iter().enumerate() {
        let x = i as f64;
        let y = window.mean_ms;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
        sum_yy += y * y;
    }

    let denominator =
        ((n * sum_xx - sum_x * sum_x) * (n * sum_yy - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Mean window value per hour of day; hours with no windows stay 0
fn hourly_seasonality(windows: &[AggregatedWindow]) -> [f64; 24] {
    let mut sums = [0.0f64; 24];
    let mut counts = [0usize; 24];

    for window in windows {
        let hour = window.time.hour() as usize;
        sums[hour] += window.mean_ms;
        counts[hour] += 1;
    }

    let mut seasonality = [0.0f64; 24];
    for hour in 0..24 {
        if counts[hour] > 0 {
            seasonality[hour] = sums[hour] / counts[hour] as f64;
        }
    }
    seasonality
}
