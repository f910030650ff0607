use serde::{Deserialize, Serialize};

use crate::coerce::{
    UNKNOWN_LABEL, non_empty, normalize_label, parse_flag, parse_float_or_zero, parse_hour_error,
};
use crate::util::now_utc_string;

/// One CSV record exactly as the harness wrote it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawResultRow {
    pub run_id: String,
    pub timestamp: String,
    pub prompt_version: String,
    pub status: String,
    pub expected_entity_type: String,
    pub actual_entity_type: String,
    pub entity_type_correct: String,
    pub title_keyword_overlap: String,
    pub start_time_presence_correct: String,
    pub start_hour_correct: String,
    pub start_hour_error: String,
    pub end_time_presence_correct: String,
    pub recurrence_presence_correct: String,
    pub time_preference_presence_correct: String,
    pub confidence: String,
    pub confidence_calibrated: String,
    pub latency_ms: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Skipped,
    Error,
    Other(String),
}

impl RunStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "COMPLETED" => Self::Completed,
            "SKIPPED" => Self::Skipped,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub status: RunStatus,
    pub expected_entity_type: String,
    pub actual_entity_type: String,
    pub entity_type_correct: bool,
    pub title_keyword_overlap: f64,
    pub start_time_presence_correct: bool,
    pub start_hour_correct: bool,
    pub start_hour_error: Option<u32>,
    pub end_time_presence_correct: bool,
    pub recurrence_presence_correct: bool,
    pub time_preference_presence_correct: bool,
    pub confidence: f64,
    pub confidence_calibrated: bool,
    pub latency_ms: f64,
    pub run_id: Option<String>,
    pub timestamp: Option<String>,
    pub prompt_version: Option<String>,
}

impl ResultRow {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

impl From<RawResultRow> for ResultRow {
    fn from(raw: RawResultRow) -> Self {
        Self {
            status: RunStatus::parse(&raw.status),
            expected_entity_type: normalize_label(&raw.expected_entity_type),
            actual_entity_type: normalize_label(&raw.actual_entity_type),
            entity_type_correct: parse_flag(&raw.entity_type_correct),
            title_keyword_overlap: parse_float_or_zero(&raw.title_keyword_overlap),
            start_time_presence_correct: parse_flag(&raw.start_time_presence_correct),
            start_hour_correct: parse_flag(&raw.start_hour_correct),
            start_hour_error: parse_hour_error(&raw.start_hour_error),
            end_time_presence_correct: parse_flag(&raw.end_time_presence_correct),
            recurrence_presence_correct: parse_flag(&raw.recurrence_presence_correct),
            time_preference_presence_correct: parse_flag(&raw.time_preference_presence_correct),
            confidence: parse_float_or_zero(&raw.confidence),
            confidence_calibrated: parse_flag(&raw.confidence_calibrated),
            latency_ms: parse_float_or_zero(&raw.latency_ms),
            run_id: non_empty(&raw.run_id),
            timestamp: non_empty(&raw.timestamp),
            prompt_version: non_empty(&raw.prompt_version),
        }
    }
}

/// Run-level identity of a batch. The harness stamps it on every row; only
/// the first row of the whole input is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub timestamp: String,
    pub prompt_version: String,
}

impl RunMetadata {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let first = rows.first();
        Self {
            run_id: first
                .and_then(|row| row.run_id.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            timestamp: first
                .and_then(|row| row.timestamp.clone())
                .unwrap_or_else(now_utc_string),
            prompt_version: first
                .and_then(|row| row.prompt_version.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        }
    }

    pub fn short_run_id(&self) -> &str {
        match self.run_id.char_indices().nth(8) {
            Some((index, _)) => &self.run_id[..index],
            None => &self.run_id,
        }
    }
}
