//! Core types for the RR-interval analytics engine
//!
//! This module defines the data structures that flow through the engine:
//! raw samples, analysis options, and the result value objects produced by
//! each analyzer. Result objects are immutable once constructed and are
//! serialized verbatim by consumers.

use crate::error::AnalysisError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound of the physiologically valid R-R band (ms)
pub const MIN_VALID_RR_MS: u32 = 300;

/// Upper bound of the physiologically valid R-R band (ms)
pub const MAX_VALID_RR_MS: u32 = 2000;

/// A single R-R interval measurement as stored by ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrSample {
    /// Interval between consecutive R peaks (milliseconds)
    pub value_ms: u32,
    /// When the beat pair was observed (UTC)
    pub timestamp: DateTime<Utc>,
    /// Owner of the measurement
    pub user_id: Uuid,
    /// Device that produced the measurement
    pub device_id: String,
}

impl RrSample {
    /// Whether the interval falls inside the physiological band.
    ///
    /// Ingestion filters on this before persisting; the analyzers assume
    /// their input already satisfies it.
    pub fn is_valid(&self) -> bool {
        (MIN_VALID_RR_MS..=MAX_VALID_RR_MS).contains(&self.value_ms)
    }
}

/// Half-ordered pair of instants delimiting an analysis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Span of the range; negative if the range is inverted
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// Whether an instant falls inside the range (inclusive on both ends)
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from <= t && t <= self.to
    }
}

/// Tunable parameters for a complete analysis request.
///
/// Every field is validated at the engine boundary; out-of-range values are
/// rejected with [`AnalysisError::ParameterOutOfRange`], never clamped.
/// A bin count of `0` requests adaptive (Sturges) binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Width of the pre-aggregated windows returned alongside the result (minutes, 1-60)
    pub aggregation_interval_minutes: u32,
    /// Width of the windows fed into trend analysis (minutes, 5-120)
    pub trend_window_minutes: u32,
    /// Bin count for the standard histogram (5-100, or 0 = adaptive)
    pub histogram_bins: usize,
    /// Bin count for the successive-difference histogram (5-100, or 0 = adaptive)
    pub diff_histogram_bins: usize,
    /// Accepted for forward compatibility; frequency-domain power is not computed
    pub include_frequency_domain: bool,
    /// Whether the raw value sequence is echoed back in the result
    pub include_raw_data: bool,
    /// Cap on the number of raw values analyzed (100-100000)
    pub max_data_points: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            aggregation_interval_minutes: 5,
            trend_window_minutes: 15,
            histogram_bins: 25,
            diff_histogram_bins: 20,
            include_frequency_domain: false,
            include_raw_data: true,
            max_data_points: 10_000,
        }
    }
}

impl AnalysisOptions {
    /// Validate every field against its documented bound.
    ///
    /// Bin counts accept `0` (adaptive) in addition to their 5-100 band.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_range(
            "aggregation_interval_minutes",
            self.aggregation_interval_minutes as i64,
            1,
            60,
        )?;
        check_range("trend_window_minutes", self.trend_window_minutes as i64, 5, 120)?;
        if self.histogram_bins != 0 {
            check_range("histogram_bins", self.histogram_bins as i64, 5, 100)?;
        }
        if self.diff_histogram_bins != 0 {
            check_range("diff_histogram_bins", self.diff_histogram_bins as i64, 5, 100)?;
        }
        check_range("max_data_points", self.max_data_points as i64, 100, 100_000)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), AnalysisError> {
    if value < min || value > max {
        return Err(AnalysisError::ParameterOutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Descriptive statistics over one value sequence.
///
/// `std_dev` is the sample standard deviation (n-1 divisor) when
/// `count > 1`, and 0 otherwise. All fields are 0 for an empty sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// One histogram bin over `[range_start, range_end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub range_start: i64,
    pub range_end: i64,
    pub count: usize,
    /// Share of the total count falling into this bin (0-1)
    pub frequency: f64,
}

/// Distribution of raw interval values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistogramData {
    pub bins: Vec<HistogramBin>,
    pub total_count: usize,
    pub bin_width: i64,
    /// The statistics the histogram was built from
    pub statistics: StatisticalSummary,
}

/// Statistics over the successive-difference series.
///
/// Unlike [`StatisticalSummary`], `std_dev` here uses the population
/// divisor (n). Both divisors are intentional; see the repository design
/// notes on the divisor discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DifferentialStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Root mean square of the successive differences
    pub rmssd: f64,
}

/// Distribution of successive differences between adjacent intervals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DifferentialHistogramData {
    pub bins: Vec<HistogramBin>,
    pub total_count: usize,
    pub bin_width: i64,
    pub statistics: DifferentialStatistics,
}

/// Time-domain heart-rate-variability metrics.
///
/// Frequency-domain fields are carried for API compatibility and are
/// always 0; spectral analysis is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HrvMetrics {
    pub rmssd: f64,
    pub sdnn: f64,
    pub pnn50: f64,
    pub triangular_index: f64,
    pub tinn: f64,
    pub vlf_power: f64,
    pub lf_power: f64,
    pub hf_power: f64,
    pub lf_hf_ratio: f64,
    pub total_power: f64,
}

/// One pre-aggregated window: the mean interval over a fixed time slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWindow {
    /// Window start (truncated to the window boundary, UTC)
    pub time: DateTime<Utc>,
    /// Arithmetic mean of the interval values in the window (ms)
    pub mean_ms: f64,
}

/// Direction of change between adjacent trend points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Overall direction of the analyzed period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// Human-scale label for the analyzed span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPeriod {
    ShortTerm,
    Daily,
    Weekly,
    LongTerm,
}

impl AnalysisPeriod {
    /// Bucket a span into a period label
    pub fn from_duration(span: Duration) -> Self {
        if span < Duration::hours(1) {
            AnalysisPeriod::ShortTerm
        } else if span < Duration::hours(24) {
            AnalysisPeriod::Daily
        } else if span < Duration::days(7) {
            AnalysisPeriod::Weekly
        } else {
            AnalysisPeriod::LongTerm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPeriod::ShortTerm => "short_term",
            AnalysisPeriod::Daily => "daily",
            AnalysisPeriod::Weekly => "weekly",
            AnalysisPeriod::LongTerm => "long_term",
        }
    }
}

/// One point of the trend series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: DateTime<Utc>,
    /// Mean interval of the underlying window (ms)
    pub value: f64,
    pub direction: TrendDirection,
}

/// Trend analysis over a sequence of aggregated windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrTrendAnalysis {
    pub points: Vec<TrendPoint>,
    pub period: AnalysisPeriod,
    pub overall_trend: OverallTrend,
    /// Pearson correlation of window index vs window mean, in [-1, 1]
    pub correlation: f64,
    /// Mean interval per hour of day; hours without data are 0
    pub seasonality: [f64; 24],
    /// Absolute value of the correlation
    pub trend_strength: f64,
}

/// One Poincaré point: an interval plotted against its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoincarePoint {
    pub rr_n: u32,
    pub rr_next: u32,
}

/// Fitted ellipse of the Poincaré cloud
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoincareEllipse {
    pub center_x: f64,
    pub center_y: f64,
    pub sd1: f64,
    pub sd2: f64,
    pub area: f64,
}

/// Poincaré-plot geometry over a raw interval sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScatterplotData {
    pub points: Vec<PoincarePoint>,
    /// Short-term variability: dispersion perpendicular to the identity line
    pub sd1: f64,
    /// Long-term variability: dispersion along the identity line
    pub sd2: f64,
    pub sd1_sd2_ratio: f64,
    /// Cardiac sympathetic index (simplified: equals SD2)
    pub csi: f64,
    /// Cardiac vagal index: ln(SD1 * SD2), 0 for degenerate geometry
    pub cvi: f64,
    pub ellipse: PoincareEllipse,
}

/// Coverage and sampling-quality figures for one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataQualityMetrics {
    pub total_samples: usize,
    pub valid_samples: usize,
    pub invalid_samples: usize,
    /// 100 * valid / total; 0 when no samples were returned
    pub quality_percentage: f64,
    /// Not observable through the value-only read interface; always 0
    pub missing_gaps: usize,
    /// Not observable through the value-only read interface; always 0
    pub largest_gap_seconds: f64,
    /// Samples per second across the requested span
    pub avg_sampling_rate_hz: f64,
}

/// Everything one complete-analysis request produces.
///
/// Constructed fresh per request, never persisted, never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteAnalysisData {
    pub user_id: Uuid,
    pub range: TimeRange,
    pub options: AnalysisOptions,
    pub statistics: StatisticalSummary,
    pub hrv: HrvMetrics,
    pub histogram: HistogramData,
    pub differential_histogram: DifferentialHistogramData,
    pub scatterplot: ScatterplotData,
    pub trend: RrTrendAnalysis,
    /// Echo of the analyzed values; empty when `include_raw_data` is off
    pub raw_values: Vec<u32>,
    /// Mean interval per aggregation window across the range
    pub aggregated_data: Vec<AggregatedWindow>,
    pub quality: DataQualityMetrics,
    pub processing_time_ms: u64,
}
