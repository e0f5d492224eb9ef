//! Per-endpoint time-range bounds
//!
//! Every consumer-facing operation validates its range against these
//! bounds before any data is fetched. The combined analysis is bounded
//! tighter than the per-metric operations because it fans out into every
//! analyzer at once.

use crate::error::AnalysisError;
use crate::types::TimeRange;
use chrono::Duration;

/// Statistics summary: 5 minutes to 30 days
pub const STATISTICS_MIN_RANGE_MINUTES: i64 = 5;
pub const STATISTICS_MAX_RANGE_MINUTES: i64 = 30 * 24 * 60;

/// HRV metrics: at least 5 minutes of data
pub const HRV_MIN_RANGE_MINUTES: i64 = 5;

/// Differential histogram and Poincaré plot: at least 10 minutes
pub const DIFFERENTIAL_MIN_RANGE_MINUTES: i64 = 10;
pub const SCATTERPLOT_MIN_RANGE_MINUTES: i64 = 10;

/// Raw interval listing: at most 7 days
pub const LISTING_MAX_RANGE_MINUTES: i64 = 7 * 24 * 60;

/// Complete analysis: 2 minutes to 24 hours
pub const COMPLETE_MIN_RANGE_MINUTES: i64 = 2;
pub const COMPLETE_MAX_RANGE_MINUTES: i64 = 24 * 60;

/// Histogram endpoints accept 0 (adaptive) through 50 bins
pub const HISTOGRAM_MAX_BINS: usize = 50;

/// Trend endpoint window bounds (minutes); the minimum range is twice the window
pub const TREND_WINDOW_MIN_MINUTES: u32 = 1;
pub const TREND_WINDOW_MAX_MINUTES: u32 = 60;

/// Reject inverted ranges
pub fn check_ordered(range: &TimeRange) -> Result<(), AnalysisError> {
    if range.from > range.to {
        return Err(AnalysisError::InvalidTimeRange {
            from: range.from,
            to: range.to,
        });
    }
    Ok(())
}

/// Reject ranges shorter than `min_minutes`
pub fn check_min_span(range: &TimeRange, min_minutes: i64) -> Result<(), AnalysisError> {
    if range.duration() < Duration::minutes(min_minutes) {
        return Err(AnalysisError::TimeRangeTooSmall { min_minutes });
    }
    Ok(())
}

/// Reject ranges longer than `max_minutes`
pub fn check_max_span(range: &TimeRange, max_minutes: i64) -> Result<(), AnalysisError> {
    if range.duration() > Duration::minutes(max_minutes) {
        return Err(AnalysisError::TimeRangeTooLarge { max_minutes });
    }
    Ok(())
}
