//! Run history: a condensed record per analysed run, persisted as one JSON
//! array, plus the prompt-version comparison built on top of it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::metrics::MetricsDocument;

mod compare;
mod store;

pub use self::compare::{MetricUnit, VersionComparison, Verdict, compare_versions};
pub use self::store::{AppendOutcome, HistoryStore};

/// Ratio fields are optional because a run with no completed tests carries
/// none of them. Older writers stored such runs with `null` identity fields;
/// those read back as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub run_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prompt_version: String,
    pub total_tests: usize,
    pub completed_tests: usize,
    #[serde(default)]
    pub completion_rate: Option<f64>,
    #[serde(default)]
    pub entity_type_accuracy: Option<f64>,
    #[serde(default)]
    pub title_keyword_overlap_avg: Option<f64>,
    #[serde(default)]
    pub start_time_presence_accuracy: Option<f64>,
    #[serde(default)]
    pub start_hour_accuracy: Option<f64>,
    #[serde(default)]
    pub avg_confidence: Option<f64>,
    #[serde(default)]
    pub expected_calibration_error: Option<f64>,
    #[serde(default)]
    pub avg_latency_ms: Option<f64>,
    #[serde(default)]
    pub p95_latency_ms: Option<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&MetricsDocument> for HistoryRecord {
    fn from(document: &MetricsDocument) -> Self {
        let quality = document.quality.as_ref();
        Self {
            run_id: document.metadata.run_id.clone(),
            timestamp: document.metadata.timestamp.clone(),
            prompt_version: document.metadata.prompt_version.clone(),
            total_tests: document.total_tests,
            completed_tests: document.completed_tests,
            completion_rate: quality.map(|q| q.completion_rate),
            entity_type_accuracy: quality.map(|q| q.entity_type_accuracy),
            title_keyword_overlap_avg: quality.map(|q| q.fields.title_keyword_overlap_avg),
            start_time_presence_accuracy: quality.map(|q| q.fields.start_time_presence_accuracy),
            start_hour_accuracy: quality.map(|q| q.fields.start_hour_accuracy),
            avg_confidence: quality.map(|q| q.calibration.avg_confidence),
            expected_calibration_error: quality.map(|q| q.calibration.expected_calibration_error),
            avg_latency_ms: quality.map(|q| q.latency.avg_latency_ms),
            p95_latency_ms: quality.map(|q| q.latency.p95_latency_ms),
        }
    }
}

/// Newest first by timestamp string. Ordering is a read concern; the store
/// itself keeps append order.
pub fn newest_first(records: &[HistoryRecord]) -> Vec<&HistoryRecord> {
    let mut sorted = records.iter().collect::<Vec<&HistoryRecord>>();
    sorted.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    sorted
}
