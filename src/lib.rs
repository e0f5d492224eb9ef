//! Synheart Rhythm - Analytics engine for R-R interval heart signals
//!
//! Rhythm turns ordered sequences of R-R intervals (milliseconds) into
//! derived signal products through a set of pure, stateless analyzers:
//!
//! - **Statistics**: mean, deviation, extrema and count
//! - **Histograms**: standard and successive-difference distributions
//! - **HRV**: time-domain metrics (RMSSD, SDNN, pNN50, triangular index, TINN)
//! - **Trends**: windowed means, direction, correlation, hourly seasonality
//! - **Poincaré**: lag-1 scatterplot geometry (SD1/SD2, CSI/CVI, ellipse)
//!
//! [`AnalysisEngine`] orchestrates all of them over an injected read-only
//! [`RrSource`] and assembles the combined result with data-quality
//! figures. Storage, transport and authorization live outside this crate.

pub mod bounds;
pub mod error;
pub mod histogram;
pub mod hrv;
pub mod pipeline;
pub mod scatterplot;
pub mod source;
pub mod statistics;
pub mod trend;
pub mod types;

pub use error::AnalysisError;
pub use histogram::HistogramBuilder;
pub use hrv::{HrvCalculator, MIN_HRV_SAMPLES};
pub use pipeline::AnalysisEngine;
pub use scatterplot::ScatterplotAnalyzer;
pub use source::{InMemorySource, RrSource};
pub use statistics::StatisticsCalculator;
pub use trend::{aggregate_windows, TrendAnalyzer};
pub use types::{
    AggregatedWindow, AnalysisOptions, CompleteAnalysisData, DataQualityMetrics, HrvMetrics,
    RrSample, RrTrendAnalysis, ScatterplotData, StatisticalSummary, TimeRange,
};

/// Engine version embedded in CLI output
pub const RHYTHM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI output
pub const PRODUCER_NAME: &str = "synheart-rhythm";
