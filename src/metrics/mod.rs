//! Aggregate quality metrics for one evaluation run.
//!
//! `compute_metrics` is pure: the same rows, metadata and label set always
//! produce the same document. Only `COMPLETED` rows feed any ratio; skipped
//! and errored rows are counted and otherwise ignored.

use serde::{Serialize, Serializer};

use crate::model::{ResultRow, RunMetadata, RunStatus};

mod calibration;
mod classification;
mod fields;
mod latency;

use self::calibration::summarize_calibration;
use self::classification::{class_metrics, confusion_matrix, entity_type_accuracy, macro_f1};
use self::fields::summarize_fields;
use self::latency::summarize_latency;

pub use self::calibration::CalibrationSummary;
pub use self::classification::{ClassMetrics, ConfusionMatrix};
pub use self::fields::FieldAccuracySummary;
pub use self::latency::LatencySummary;

pub const NO_COMPLETED_TESTS: &str = "No completed tests to analyze";

#[derive(Debug, Clone, Serialize)]
pub struct MetricsDocument {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    pub total_tests: usize,
    pub completed_tests: usize,
    pub skipped_tests: usize,
    pub error_tests: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absent when no row completed; every ratio lives in here.
    #[serde(flatten)]
    pub quality: Option<QualityMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityMetrics {
    pub completion_rate: f64,
    pub entity_type_accuracy: f64,
    #[serde(serialize_with = "serialize_by_label")]
    pub entity_type_metrics: Vec<ClassMetrics>,
    pub confusion_matrix: ConfusionMatrix,
    #[serde(flatten)]
    pub fields: FieldAccuracySummary,
    #[serde(flatten)]
    pub calibration: CalibrationSummary,
    #[serde(flatten)]
    pub latency: LatencySummary,
}

impl QualityMetrics {
    fn from_completed(completed: &[&ResultRow], total: usize, labels: &[String]) -> Option<Self> {
        let latency = summarize_latency(completed)?;

        Some(Self {
            completion_rate: ratio(completed.len(), total),
            entity_type_accuracy: entity_type_accuracy(completed),
            entity_type_metrics: class_metrics(completed, labels),
            confusion_matrix: confusion_matrix(completed),
            fields: summarize_fields(completed),
            calibration: summarize_calibration(completed),
            latency,
        })
    }

    pub fn macro_f1(&self) -> Option<f64> {
        macro_f1(&self.entity_type_metrics)
    }
}

impl MetricsDocument {
    pub fn has_completed_tests(&self) -> bool {
        self.quality.is_some()
    }

    pub fn completion_rate(&self) -> Option<f64> {
        self.quality.as_ref().map(|quality| quality.completion_rate)
    }

    pub fn entity_type_accuracy(&self) -> Option<f64> {
        self.quality.as_ref().map(|quality| quality.entity_type_accuracy)
    }
}

pub fn compute_metrics(
    rows: &[ResultRow],
    metadata: &RunMetadata,
    labels: &[String],
) -> MetricsDocument {
    let completed = rows
        .iter()
        .filter(|row| row.is_completed())
        .collect::<Vec<&ResultRow>>();
    let skipped_tests = count_status(rows, &RunStatus::Skipped);
    let error_tests = count_status(rows, &RunStatus::Error);

    let quality = QualityMetrics::from_completed(&completed, rows.len(), labels);
    let error = quality.is_none().then(|| NO_COMPLETED_TESTS.to_string());

    MetricsDocument {
        metadata: metadata.clone(),
        total_tests: rows.len(),
        completed_tests: completed.len(),
        skipped_tests,
        error_tests,
        error,
        quality,
    }
}

/// List entries that serialize as a JSON object keyed by label.
trait Labeled {
    fn key(&self) -> &str;
}

/// Keeps list order in the output object.
fn serialize_by_label<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + Labeled,
{
    serializer.collect_map(items.iter().map(|item| (item.key(), item)))
}

fn count_status(rows: &[ResultRow], status: &RunStatus) -> usize {
    rows.iter().filter(|row| &row.status == status).count()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

fn flag_rate(completed: &[&ResultRow], flag: impl Fn(&ResultRow) -> bool) -> f64 {
    let hits = completed.iter().filter(|row| flag(row)).count();
    ratio(hits, completed.len())
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let len = values.len();
    if len == 0 {
        return None;
    }
    Some(values.sum::<f64>() / len as f64)
}
