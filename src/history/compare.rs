use super::*;
use crate::error::AnalyzerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    HigherIsBetter,
    LowerIsBetter,
}

/// Display hint only; deltas are always in the metric's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Ratio,
    Milliseconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Improved,
    Regressed,
    Unchanged,
}

impl Verdict {
    pub fn judge(direction: MetricDirection, delta: f64) -> Self {
        if delta == 0.0 {
            return Self::Unchanged;
        }

        let went_up = delta > 0.0;
        match (direction, went_up) {
            (MetricDirection::HigherIsBetter, true) | (MetricDirection::LowerIsBetter, false) => {
                Self::Improved
            }
            _ => Self::Regressed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedMetric {
    EntityTypeAccuracy,
    #[serde(rename = "title_keyword_overlap_avg")]
    TitleKeywordOverlap,
    StartHourAccuracy,
    ExpectedCalibrationError,
    AvgLatencyMs,
}

impl ComparedMetric {
    pub const ALL: [Self; 5] = [
        Self::EntityTypeAccuracy,
        Self::TitleKeywordOverlap,
        Self::StartHourAccuracy,
        Self::ExpectedCalibrationError,
        Self::AvgLatencyMs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::EntityTypeAccuracy => "Entity Type Accuracy",
            Self::TitleKeywordOverlap => "Title Keyword Overlap",
            Self::StartHourAccuracy => "Start Hour Accuracy",
            Self::ExpectedCalibrationError => "Calibration Error",
            Self::AvgLatencyMs => "Avg Latency (ms)",
        }
    }

    pub fn direction(self) -> MetricDirection {
        match self {
            Self::EntityTypeAccuracy | Self::TitleKeywordOverlap | Self::StartHourAccuracy => {
                MetricDirection::HigherIsBetter
            }
            Self::ExpectedCalibrationError | Self::AvgLatencyMs => MetricDirection::LowerIsBetter,
        }
    }

    pub fn unit(self) -> MetricUnit {
        match self {
            Self::AvgLatencyMs => MetricUnit::Milliseconds,
            _ => MetricUnit::Ratio,
        }
    }

    /// Records appended without completed tests carry no ratios; those read
    /// as zero.
    fn value(self, record: &HistoryRecord) -> f64 {
        let value = match self {
            Self::EntityTypeAccuracy => record.entity_type_accuracy,
            Self::TitleKeywordOverlap => record.title_keyword_overlap_avg,
            Self::StartHourAccuracy => record.start_hour_accuracy,
            Self::ExpectedCalibrationError => record.expected_calibration_error,
            Self::AvgLatencyMs => record.avg_latency_ms,
        };
        value.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: ComparedMetric,
    pub direction: MetricDirection,
    pub baseline: f64,
    pub candidate: f64,
    /// `candidate - baseline`.
    pub delta: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionComparison {
    pub baseline_version: String,
    pub candidate_version: String,
    pub baseline_run_id: String,
    pub candidate_run_id: String,
    pub baseline_timestamp: String,
    pub candidate_timestamp: String,
    pub deltas: Vec<MetricDelta>,
}

/// Latest run by plain string comparison of timestamps; ties keep the
/// earliest record in history order.
pub fn latest_run_for_version<'a>(
    history: &'a [HistoryRecord],
    version: &str,
) -> Option<&'a HistoryRecord> {
    history
        .iter()
        .filter(|record| record.prompt_version == version)
        .reduce(|best, record| {
            if record.timestamp > best.timestamp {
                record
            } else {
                best
            }
        })
}

pub fn compare_versions(
    baseline_version: &str,
    candidate_version: &str,
    history: &[HistoryRecord],
) -> Result<VersionComparison, AnalyzerError> {
    let baseline = latest_run_for_version(history, baseline_version).ok_or_else(|| {
        AnalyzerError::VersionNotFound {
            version: baseline_version.to_string(),
        }
    })?;
    let candidate = latest_run_for_version(history, candidate_version).ok_or_else(|| {
        AnalyzerError::VersionNotFound {
            version: candidate_version.to_string(),
        }
    })?;

    let deltas = ComparedMetric::ALL
        .iter()
        .map(|metric| {
            let baseline_value = metric.value(baseline);
            let candidate_value = metric.value(candidate);
            let delta = candidate_value - baseline_value;
            MetricDelta {
                metric: *metric,
                direction: metric.direction(),
                baseline: baseline_value,
                candidate: candidate_value,
                delta,
                verdict: Verdict::judge(metric.direction(), delta),
            }
        })
        .collect();

    Ok(VersionComparison {
        baseline_version: baseline_version.to_string(),
        candidate_version: candidate_version.to_string(),
        baseline_run_id: baseline.run_id.clone(),
        candidate_run_id: candidate.run_id.clone(),
        baseline_timestamp: baseline.timestamp.clone(),
        candidate_timestamp: candidate.timestamp.clone(),
        deltas,
    })
}
