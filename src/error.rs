//! Error types for the analytics engine
//!
//! All errors are input/precondition errors detected before or at the edge
//! of computation. Each variant carries a stable machine-readable code for
//! API consumers alongside the human-readable message.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while validating or orchestrating an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid time range: from {from} is after to {to}")]
    InvalidTimeRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("time range too small: at least {min_minutes} minutes required")]
    TimeRangeTooSmall { min_minutes: i64 },

    #[error("time range too large: at most {max_minutes} minutes allowed")]
    TimeRangeTooLarge { max_minutes: i64 },

    #[error("parameter {name} out of range: {value} not in [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("insufficient data: {required} samples required, {actual} available")]
    InsufficientData { required: usize, actual: usize },

    #[error("no valid samples in the requested range")]
    NoValidData,

    #[error("data processing failed: {0}")]
    DataProcessing(String),
}

impl AnalysisError {
    /// Stable machine-readable code for this error kind.
    ///
    /// Codes are part of the API contract; messages are not.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidTimeRange { .. } => "invalid_time_range",
            AnalysisError::TimeRangeTooSmall { .. } => "time_range_too_small",
            AnalysisError::TimeRangeTooLarge { .. } => "time_range_too_large",
            AnalysisError::ParameterOutOfRange { .. } => "parameter_out_of_range",
            AnalysisError::InsufficientData { .. } => "insufficient_data",
            AnalysisError::NoValidData => "no_valid_data",
            AnalysisError::DataProcessing(_) => "data_processing_error",
        }
    }
}
