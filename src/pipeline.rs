//! Analysis orchestration
//!
//! This module provides the public API of the engine. Each method
//! reproduces the validation bounds of the consumer endpoint it backs,
//! fetches from the injected [`RrSource`], and hands the sequences to the
//! pure analyzers. Validation always happens before the fetch; the
//! analyzers themselves never error.

use crate::bounds;
use crate::error::AnalysisError;
use crate::histogram::HistogramBuilder;
use crate::hrv::{HrvCalculator, MIN_HRV_SAMPLES};
use crate::scatterplot::ScatterplotAnalyzer;
use crate::source::RrSource;
use crate::statistics::StatisticsCalculator;
use crate::trend::TrendAnalyzer;
use crate::types::{
    AnalysisOptions, CompleteAnalysisData, DataQualityMetrics, DifferentialHistogramData,
    HistogramData, HrvMetrics, RrTrendAnalysis, ScatterplotData, StatisticalSummary, TimeRange,
};
use std::time::Instant;
use uuid::Uuid;

/// Stateless orchestrator over an injected data source.
///
/// Holds no mutable state; one instance may serve any number of
/// concurrent requests.
pub struct AnalysisEngine<'a> {
    source: &'a dyn RrSource,
}

impl<'a> AnalysisEngine<'a> {
    pub fn new(source: &'a dyn RrSource) -> Self {
        Self { source }
    }

    /// Raw interval listing. Range at most 7 days; an empty result is an
    /// error rather than an empty page.
    pub fn raw_intervals(
        &self,
        user_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<u32>, AnalysisError> {
        bounds::check_ordered(range)?;
        bounds::check_max_span(range, bounds::LISTING_MAX_RANGE_MINUTES)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        if values.is_empty() {
            return Err(AnalysisError::NoValidData);
        }
        Ok(values)
    }

    /// Summary statistics. Range between 5 minutes and 30 days.
    pub fn interval_statistics(
        &self,
        user_id: Uuid,
        range: &TimeRange,
    ) -> Result<StatisticalSummary, AnalysisError> {
        bounds::check_ordered(range)?;
        bounds::check_min_span(range, bounds::STATISTICS_MIN_RANGE_MINUTES)?;
        bounds::check_max_span(range, bounds::STATISTICS_MAX_RANGE_MINUTES)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        if values.is_empty() {
            return Err(AnalysisError::NoValidData);
        }
        Ok(StatisticsCalculator::summarize(&values))
    }

    /// Interval distribution. `bins_count` of 0 requests adaptive binning;
    /// an empty fetch yields the defined empty histogram.
    pub fn histogram(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        bins_count: usize,
    ) -> Result<HistogramData, AnalysisError> {
        bounds::check_ordered(range)?;
        check_bins(bins_count)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        Ok(HistogramBuilder::build_histogram(&values, bins_count))
    }

    /// Successive-difference distribution. Range at least 10 minutes.
    pub fn differential_histogram(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        bins_count: usize,
    ) -> Result<DifferentialHistogramData, AnalysisError> {
        bounds::check_ordered(range)?;
        bounds::check_min_span(range, bounds::DIFFERENTIAL_MIN_RANGE_MINUTES)?;
        check_bins(bins_count)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        Ok(HistogramBuilder::build_differential_histogram(
            &values, bins_count,
        ))
    }

    /// Time-domain HRV metrics. Range at least 5 minutes and at least 10
    /// samples in the result.
    pub fn hrv(&self, user_id: Uuid, range: &TimeRange) -> Result<HrvMetrics, AnalysisError> {
        bounds::check_ordered(range)?;
        bounds::check_min_span(range, bounds::HRV_MIN_RANGE_MINUTES)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        if values.len() < MIN_HRV_SAMPLES {
            return Err(AnalysisError::InsufficientData {
                required: MIN_HRV_SAMPLES,
                actual: values.len(),
            });
        }
        Ok(HrvCalculator::calculate(&values))
    }

    /// Trend analysis at a caller-chosen window size. The range must cover
    /// at least two windows; an empty window sequence degrades to the
    /// insufficient-data shape.
    pub fn trends(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        window_minutes: u32,
    ) -> Result<RrTrendAnalysis, AnalysisError> {
        bounds::check_ordered(range)?;
        if !(bounds::TREND_WINDOW_MIN_MINUTES..=bounds::TREND_WINDOW_MAX_MINUTES)
            .contains(&window_minutes)
        {
            return Err(AnalysisError::ParameterOutOfRange {
                name: "window_size_minutes",
                value: window_minutes as i64,
                min: bounds::TREND_WINDOW_MIN_MINUTES as i64,
                max: bounds::TREND_WINDOW_MAX_MINUTES as i64,
            });
        }
        bounds::check_min_span(range, 2 * window_minutes as i64)?;

        let windows = self
            .source
            .fetch_aggregated_windows(user_id, range, window_minutes)?;
        Ok(TrendAnalyzer::analyze_trends(&windows, range))
    }

    /// Poincaré-plot geometry. Range at least 10 minutes; short input
    /// yields the zero-value shape.
    pub fn scatterplot(
        &self,
        user_id: Uuid,
        range: &TimeRange,
    ) -> Result<ScatterplotData, AnalysisError> {
        bounds::check_ordered(range)?;
        bounds::check_min_span(range, bounds::SCATTERPLOT_MIN_RANGE_MINUTES)?;

        let values = self.source.fetch_raw_values(user_id, range)?;
        Ok(ScatterplotAnalyzer::build_scatterplot(&values))
    }

    /// The combined analysis: every analyzer over one fetch, plus
    /// data-quality figures and the processing time.
    ///
    /// Range between 2 minutes and 24 hours. Options are validated here,
    /// at the boundary, and never silently adjusted. An empty fetch
    /// produces the defined empty/zero form of every sub-result; callers
    /// rely on this for safe rendering.
    pub fn analyze_complete(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        options: Option<AnalysisOptions>,
    ) -> Result<CompleteAnalysisData, AnalysisError> {
        let started = Instant::now();

        bounds::check_ordered(range)?;
        bounds::check_min_span(range, bounds::COMPLETE_MIN_RANGE_MINUTES)?;
        bounds::check_max_span(range, bounds::COMPLETE_MAX_RANGE_MINUTES)?;

        let options = options.unwrap_or_default();
        options.validate()?;

        let mut raw_values = self.source.fetch_raw_values(user_id, range)?;
        raw_values.truncate(options.max_data_points);

        let aggregated_data = self.source.fetch_aggregated_windows(
            user_id,
            range,
            options.aggregation_interval_minutes,
        )?;
        let trend_windows =
            self.source
                .fetch_aggregated_windows(user_id, range, options.trend_window_minutes)?;

        let statistics = StatisticsCalculator::summarize(&raw_values);
        let hrv = if raw_values.len() >= MIN_HRV_SAMPLES {
            HrvCalculator::calculate(&raw_values)
        } else {
            HrvMetrics::default()
        };
        let histogram = HistogramBuilder::build_histogram(&raw_values, options.histogram_bins);
        let differential_histogram =
            HistogramBuilder::build_differential_histogram(&raw_values, options.diff_histogram_bins);
        let scatterplot = ScatterplotAnalyzer::build_scatterplot(&raw_values);
        let trend = TrendAnalyzer::analyze_trends(&trend_windows, range);

        let quality = build_quality(raw_values.len(), range);
        if !options.include_raw_data {
            raw_values.clear();
        }

        Ok(CompleteAnalysisData {
            user_id,
            range: *range,
            options,
            statistics,
            hrv,
            histogram,
            differential_histogram,
            scatterplot,
            trend,
            raw_values,
            aggregated_data,
            quality,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn check_bins(bins_count: usize) -> Result<(), AnalysisError> {
    if bins_count > bounds::HISTOGRAM_MAX_BINS {
        return Err(AnalysisError::ParameterOutOfRange {
            name: "bins_count",
            value: bins_count as i64,
            min: 0,
            max: bounds::HISTOGRAM_MAX_BINS as i64,
        });
    }
    Ok(())
}

/// Coverage figures for one request.
///
/// The read interface returns bare values, so every returned sample counts
/// as valid and gap detection is not possible; the gap fields stay 0.
fn build_quality(count: usize, range: &TimeRange) -> DataQualityMetrics {
    let duration_secs = range.duration().num_milliseconds() as f64 / 1000.0;
    DataQualityMetrics {
        total_samples: count,
        valid_samples: count,
        invalid_samples: 0,
        quality_percentage: if count > 0 { 100.0 } else { 0.0 },
        missing_gaps: 0,
        largest_gap_seconds: 0.0,
        avg_sampling_rate_hz: if duration_secs > 0.0 {
            count as f64 / duration_secs
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use crate::types::{AggregatedWindow, RrSample};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    /// One sample per second over `minutes`, values cycling 790-809 ms
    fn steady_samples(user_id: Uuid, minutes: i64) -> Vec<RrSample> {
        (0..minutes * 60)
            .map(|i| RrSample {
                value_ms: 790 + (i % 20) as u32,
                timestamp: base_time() + Duration::seconds(i),
                user_id,
                device_id: "strap".to_string(),
            })
            .collect()
    }

    fn minute_range(minutes: i64) -> TimeRange {
        TimeRange::new(base_time(), base_time() + Duration::minutes(minutes))
    }

    /// Source that records how often it is hit, to prove validation
    /// happens before any fetch.
    struct CountingSource {
        inner: InMemorySource,
        fetches: Cell<usize>,
    }

    impl CountingSource {
        fn new(samples: Vec<RrSample>) -> Self {
            Self {
                inner: InMemorySource::new(samples),
                fetches: Cell::new(0),
            }
        }
    }

    impl RrSource for CountingSource {
        fn fetch_raw_values(
            &self,
            user_id: Uuid,
            range: &TimeRange,
        ) -> Result<Vec<u32>, AnalysisError> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner.fetch_raw_values(user_id, range)
        }

        fn fetch_aggregated_windows(
            &self,
            user_id: Uuid,
            range: &TimeRange,
            interval_minutes: u32,
        ) -> Result<Vec<AggregatedWindow>, AnalysisError> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner
                .fetch_aggregated_windows(user_id, range, interval_minutes)
        }
    }

    #[test]
    fn test_inverted_range_fails_before_any_fetch() {
        let user = Uuid::new_v4();
        let source = CountingSource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);
        let inverted = TimeRange::new(base_time() + Duration::hours(1), base_time());

        assert_eq!(
            engine.raw_intervals(user, &inverted).unwrap_err().code(),
            "invalid_time_range"
        );
        assert_eq!(
            engine
                .interval_statistics(user, &inverted)
                .unwrap_err()
                .code(),
            "invalid_time_range"
        );
        assert_eq!(
            engine.hrv(user, &inverted).unwrap_err().code(),
            "invalid_time_range"
        );
        assert_eq!(
            engine.trends(user, &inverted, 15).unwrap_err().code(),
            "invalid_time_range"
        );
        assert_eq!(
            engine.scatterplot(user, &inverted).unwrap_err().code(),
            "invalid_time_range"
        );
        assert_eq!(
            engine
                .analyze_complete(user, &inverted, None)
                .unwrap_err()
                .code(),
            "invalid_time_range"
        );
        assert_eq!(source.fetches.get(), 0);
    }

    #[test]
    fn test_invalid_options_fail_before_any_fetch() {
        let user = Uuid::new_v4();
        let source = CountingSource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let options = AnalysisOptions {
            max_data_points: 5,
            ..Default::default()
        };
        let err = engine
            .analyze_complete(user, &minute_range(10), Some(options))
            .unwrap_err();

        assert_eq!(err.code(), "parameter_out_of_range");
        assert_eq!(source.fetches.get(), 0);
    }

    #[test]
    fn test_complete_analysis_happy_path() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let result = engine
            .analyze_complete(user, &minute_range(10), None)
            .unwrap();

        assert_eq!(result.user_id, user);
        assert_eq!(result.statistics.count, 600);
        assert_eq!(result.raw_values.len(), 600);
        assert_eq!(result.scatterplot.points.len(), 599);
        assert_eq!(result.histogram.total_count, 600);
        assert_eq!(result.differential_histogram.total_count, 599);
        assert!(result.hrv.rmssd > 0.0);
        assert!(result.hrv.sdnn > 0.0);

        // Ten minutes of 5-minute aggregation windows.
        assert_eq!(result.aggregated_data.len(), 2);
        assert!(!result.trend.points.is_empty());

        assert_eq!(result.quality.total_samples, 600);
        assert_eq!(result.quality.valid_samples, 600);
        assert_eq!(result.quality.invalid_samples, 0);
        assert_eq!(result.quality.quality_percentage, 100.0);
        assert!((result.quality.avg_sampling_rate_hz - 1.0).abs() < 1e-9);
        assert_eq!(result.quality.missing_gaps, 0);
    }

    #[test]
    fn test_complete_analysis_empty_fetch_degrades_to_zero_shapes() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(Vec::new());
        let engine = AnalysisEngine::new(&source);

        let result = engine
            .analyze_complete(user, &minute_range(30), None)
            .unwrap();

        assert_eq!(result.statistics, StatisticalSummary::default());
        assert_eq!(result.hrv, HrvMetrics::default());
        assert!(result.histogram.bins.is_empty());
        assert!(result.differential_histogram.bins.is_empty());
        assert!(result.scatterplot.points.is_empty());
        assert!(result.trend.points.is_empty());
        assert!(result.raw_values.is_empty());
        assert!(result.aggregated_data.is_empty());
        assert_eq!(result.quality.quality_percentage, 0.0);
    }

    #[test]
    fn test_complete_analysis_range_bounds() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(Vec::new());
        let engine = AnalysisEngine::new(&source);

        let err = engine
            .analyze_complete(user, &minute_range(1), None)
            .unwrap_err();
        assert_eq!(err.code(), "time_range_too_small");

        let err = engine
            .analyze_complete(user, &minute_range(25 * 60), None)
            .unwrap_err();
        assert_eq!(err.code(), "time_range_too_large");

        // Exactly 24 hours is allowed.
        assert!(engine
            .analyze_complete(user, &minute_range(24 * 60), None)
            .is_ok());
    }

    #[test]
    fn test_include_raw_data_off_suppresses_only_the_echo() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let options = AnalysisOptions {
            include_raw_data: false,
            ..Default::default()
        };
        let result = engine
            .analyze_complete(user, &minute_range(10), Some(options))
            .unwrap();

        assert!(result.raw_values.is_empty());
        assert_eq!(result.statistics.count, 600);
        assert_eq!(result.histogram.total_count, 600);
    }

    #[test]
    fn test_max_data_points_caps_the_sequence() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let options = AnalysisOptions {
            max_data_points: 100,
            ..Default::default()
        };
        let result = engine
            .analyze_complete(user, &minute_range(10), Some(options))
            .unwrap();

        assert_eq!(result.statistics.count, 100);
        assert_eq!(result.raw_values.len(), 100);
        assert_eq!(result.scatterplot.points.len(), 99);
    }

    #[test]
    fn test_complete_analysis_is_idempotent_apart_from_timing() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let first = engine
            .analyze_complete(user, &minute_range(10), None)
            .unwrap();
        let second = engine
            .analyze_complete(user, &minute_range(10), None)
            .unwrap();

        assert_eq!(first.statistics, second.statistics);
        assert_eq!(first.hrv, second.hrv);
        assert_eq!(first.histogram, second.histogram);
        assert_eq!(first.differential_histogram, second.differential_histogram);
        assert_eq!(first.scatterplot, second.scatterplot);
        assert_eq!(first.trend, second.trend);
        assert_eq!(first.quality, second.quality);
    }

    #[test]
    fn test_hrv_endpoint_guards() {
        let user = Uuid::new_v4();
        let few: Vec<RrSample> = steady_samples(user, 10).into_iter().take(9).collect();
        let source = InMemorySource::new(few);
        let engine = AnalysisEngine::new(&source);

        let err = engine.hrv(user, &minute_range(4)).unwrap_err();
        assert_eq!(err.code(), "time_range_too_small");

        match engine.hrv(user, &minute_range(10)).unwrap_err() {
            AnalysisError::InsufficientData { required, actual } => {
                assert_eq!(required, 10);
                assert_eq!(actual, 9);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_statistics_endpoint_bounds_and_empty() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(Vec::new());
        let engine = AnalysisEngine::new(&source);

        assert_eq!(
            engine
                .interval_statistics(user, &minute_range(4))
                .unwrap_err()
                .code(),
            "time_range_too_small"
        );
        assert_eq!(
            engine
                .interval_statistics(user, &minute_range(31 * 24 * 60))
                .unwrap_err()
                .code(),
            "time_range_too_large"
        );
        assert_eq!(
            engine
                .interval_statistics(user, &minute_range(60))
                .unwrap_err()
                .code(),
            "no_valid_data"
        );
    }

    #[test]
    fn test_raw_listing_bounds_and_empty() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(Vec::new());
        let engine = AnalysisEngine::new(&source);

        assert_eq!(
            engine
                .raw_intervals(user, &minute_range(8 * 24 * 60))
                .unwrap_err()
                .code(),
            "time_range_too_large"
        );
        assert_eq!(
            engine
                .raw_intervals(user, &minute_range(60))
                .unwrap_err()
                .code(),
            "no_valid_data"
        );
    }

    #[test]
    fn test_histogram_endpoint_bins_bound() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        let err = engine
            .histogram(user, &minute_range(10), 51)
            .unwrap_err();
        assert_eq!(err.code(), "parameter_out_of_range");

        let histogram = engine.histogram(user, &minute_range(10), 0).unwrap();
        assert!(!histogram.bins.is_empty());

        let err = engine
            .differential_histogram(user, &minute_range(10), 51)
            .unwrap_err();
        assert_eq!(err.code(), "parameter_out_of_range");
    }

    #[test]
    fn test_differential_and_scatterplot_minimum_window() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 10));
        let engine = AnalysisEngine::new(&source);

        assert_eq!(
            engine
                .differential_histogram(user, &minute_range(9), 0)
                .unwrap_err()
                .code(),
            "time_range_too_small"
        );
        assert_eq!(
            engine.scatterplot(user, &minute_range(9)).unwrap_err().code(),
            "time_range_too_small"
        );
        assert!(engine.scatterplot(user, &minute_range(10)).is_ok());
    }

    #[test]
    fn test_trends_endpoint_window_bounds() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(steady_samples(user, 40));
        let engine = AnalysisEngine::new(&source);

        assert_eq!(
            engine.trends(user, &minute_range(40), 0).unwrap_err().code(),
            "parameter_out_of_range"
        );
        assert_eq!(
            engine
                .trends(user, &minute_range(40), 61)
                .unwrap_err()
                .code(),
            "parameter_out_of_range"
        );
        // Range must cover two windows.
        assert_eq!(
            engine
                .trends(user, &minute_range(25), 15)
                .unwrap_err()
                .code(),
            "time_range_too_small"
        );

        let analysis = engine.trends(user, &minute_range(40), 15).unwrap();
        assert!(!analysis.points.is_empty());
        assert!(analysis.correlation >= -1.0 && analysis.correlation <= 1.0);
    }

    #[test]
    fn test_trends_with_no_data_degrade_to_stable() {
        let user = Uuid::new_v4();
        let source = InMemorySource::new(Vec::new());
        let engine = AnalysisEngine::new(&source);

        let analysis = engine.trends(user, &minute_range(40), 15).unwrap();
        assert!(analysis.points.is_empty());
        assert_eq!(analysis.correlation, 0.0);
    }
}
