//! Data-source capability
//!
//! The engine never owns storage. Callers inject a read-only [`RrSource`]
//! and the orchestrator performs exactly one fetch per needed sequence;
//! any timeout or cancellation policy belongs to the implementation behind
//! this trait.

use crate::error::AnalysisError;
use crate::trend;
use crate::types::{AggregatedWindow, RrSample, TimeRange};
use uuid::Uuid;

/// Read-only access to stored interval data.
///
/// Implementations return values ascending by timestamp and pre-filtered
/// to the physiological band; the analyzers rely on both properties.
pub trait RrSource {
    /// Interval values (ms) for a user across a range
    fn fetch_raw_values(
        &self,
        user_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<u32>, AnalysisError>;

    /// Mean interval per fixed window for a user across a range
    fn fetch_aggregated_windows(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        interval_minutes: u32,
    ) -> Result<Vec<AggregatedWindow>, AnalysisError>;
}

/// In-memory source over a fixed sample set.
///
/// Used by the CLI and as a test fixture. Samples outside the
/// physiological band are dropped at construction, matching the filtering
/// a persistent store applies at ingestion.
pub struct InMemorySource {
    samples: Vec<RrSample>,
}

impl InMemorySource {
    pub fn new(mut samples: Vec<RrSample>) -> Self {
        samples.retain(RrSample::is_valid);
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples for one user inside a range, inclusive on both ends
    fn samples_in(&self, user_id: Uuid, range: &TimeRange) -> Vec<RrSample> {
        self.samples
            .iter()
            .filter(|s| s.user_id == user_id && range.contains(s.timestamp))
            .cloned()
            .collect()
    }
}

impl RrSource for InMemorySource {
    fn fetch_raw_values(
        &self,
        user_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<u32>, AnalysisError> {
        Ok(self
            .samples_in(user_id, range)
            .iter()
            .map(|s| s.value_ms)
            .collect())
    }

    fn fetch_aggregated_windows(
        &self,
        user_id: Uuid,
        range: &TimeRange,
        interval_minutes: u32,
    ) -> Result<Vec<AggregatedWindow>, AnalysisError> {
        let samples = self.samples_in(user_id, range);
        Ok(trend::aggregate_windows(&samples, interval_minutes))
    }
}
