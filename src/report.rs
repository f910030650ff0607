//! Plain-text rendering for the console. Nothing here feeds back into the
//! metrics or the history file.

use std::io::{self, Write};

use crate::history::{HistoryRecord, MetricUnit, VersionComparison, Verdict};
use crate::metrics::{MetricsDocument, QualityMetrics};

const RULE_WIDTH: usize = 80;

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn write_metrics_report<W: Write>(out: &mut W, document: &MetricsDocument) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    let section = "-".repeat(40);

    writeln!(out, "\n{rule}")?;
    writeln!(out, "EVALUATION REPORT")?;
    writeln!(out, "{rule}")?;

    writeln!(out, "\nRUN INFORMATION\n{section}")?;
    writeln!(out, "  Run ID:         {}", document.metadata.short_run_id())?;
    writeln!(out, "  Timestamp:      {}", document.metadata.timestamp)?;
    writeln!(out, "  Prompt Version: {}", document.metadata.prompt_version)?;

    writeln!(out, "\nTEST SUMMARY\n{section}")?;
    writeln!(out, "  Total Tests:    {}", document.total_tests)?;
    writeln!(out, "  Completed:      {}", document.completed_tests)?;
    writeln!(out, "  Skipped:        {}", document.skipped_tests)?;
    writeln!(out, "  Errors:         {}", document.error_tests)?;

    match document.quality.as_ref() {
        Some(quality) => write_quality_sections(out, quality)?,
        None => {
            let reason = document.error.as_deref().unwrap_or_default();
            writeln!(out, "\n  {reason}")?;
        }
    }

    writeln!(out, "\n{rule}")?;
    Ok(())
}

fn write_quality_sections<W: Write>(out: &mut W, quality: &QualityMetrics) -> io::Result<()> {
    let section = "-".repeat(40);
    writeln!(out, "  Completion:     {}", percent(quality.completion_rate))?;

    writeln!(out, "\nENTITY TYPE CLASSIFICATION\n{section}")?;
    writeln!(out, "  Overall Accuracy: {}", percent(quality.entity_type_accuracy))?;
    writeln!(
        out,
        "\n  {:<12} {:<12} {:<12} {:<12} {:<10}",
        "Type", "Precision", "Recall", "F1", "Support"
    )?;
    writeln!(out, "  {}", "-".repeat(58))?;
    for class in &quality.entity_type_metrics {
        writeln!(
            out,
            "  {:<12} {:<12.2} {:<12.2} {:<12.2} {:<10}",
            class.label, class.precision, class.recall, class.f1, class.support
        )?;
    }
    if let Some(macro_f1) = quality.macro_f1() {
        writeln!(out, "\n  Macro F1 Score: {macro_f1:.2}")?;
    }

    let present = quality
        .entity_type_metrics
        .iter()
        .map(|class| class.label.as_str())
        .filter(|label| {
            quality.confusion_matrix.contains_key(*label)
                || quality
                    .confusion_matrix
                    .values()
                    .any(|row| row.contains_key(*label))
        })
        .collect::<Vec<&str>>();
    if !present.is_empty() {
        writeln!(out, "\n  Confusion Matrix (rows expected, columns predicted):")?;
        write!(out, "  {:<12}", "")?;
        for label in &present {
            let short = label.chars().take(6).collect::<String>();
            write!(out, "{short:<8}")?;
        }
        writeln!(out)?;
        for expected in &present {
            write!(out, "  {expected:<12}")?;
            for actual in &present {
                let count = quality
                    .confusion_matrix
                    .get(*expected)
                    .and_then(|row| row.get(*actual))
                    .copied()
                    .unwrap_or(0);
                write!(out, "{count:<8}")?;
            }
            writeln!(out)?;
        }
    }

    let fields = &quality.fields;
    writeln!(out, "\nFIELD EXTRACTION ACCURACY\n{section}")?;
    writeln!(out, "  Title Keyword Overlap:     {}", percent(fields.title_keyword_overlap_avg))?;
    writeln!(out, "  Start Time Presence:       {}", percent(fields.start_time_presence_accuracy))?;
    writeln!(out, "  Start Hour Accuracy:       {}", percent(fields.start_hour_accuracy))?;
    if let Some(avg_hour_error) = fields.avg_hour_error {
        writeln!(out, "  Avg Hour Error:            {avg_hour_error:.1} hours")?;
    }
    writeln!(out, "  End Time Presence:         {}", percent(fields.end_time_presence_accuracy))?;
    writeln!(out, "  Recurrence Presence:       {}", percent(fields.recurrence_presence_accuracy))?;
    writeln!(
        out,
        "  Time Preference Presence:  {}",
        percent(fields.time_preference_presence_accuracy)
    )?;

    let calibration = &quality.calibration;
    writeln!(out, "\nCONFIDENCE CALIBRATION\n{section}")?;
    writeln!(out, "  Average Confidence:        {:.2}", calibration.avg_confidence)?;
    writeln!(
        out,
        "  Calibration Rate:          {}",
        percent(calibration.confidence_calibration_rate)
    )?;
    writeln!(
        out,
        "  Expected Calibration Err:  {:.3}",
        calibration.expected_calibration_error
    )?;
    writeln!(out, "\n  {:<12} {:<10} {:<10}", "Bin", "Count", "Accuracy")?;
    writeln!(out, "  {}", "-".repeat(32))?;
    for bin in &calibration.confidence_bins {
        writeln!(
            out,
            "  {:<12} {:<10} {}",
            bin.label,
            bin.count,
            percent(bin.accuracy())
        )?;
    }

    let latency = &quality.latency;
    writeln!(out, "\nLATENCY\n{section}")?;
    writeln!(out, "  Average:  {:.0}ms", latency.avg_latency_ms)?;
    writeln!(out, "  P50:      {:.0}ms", latency.p50_latency_ms)?;
    writeln!(out, "  P95:      {:.0}ms", latency.p95_latency_ms)?;
    writeln!(out, "  P99:      {:.0}ms", latency.p99_latency_ms)?;
    let slowest = latency.samples.iter().copied().fold(f64::MIN, f64::max);
    let fastest = latency.samples.iter().copied().fold(f64::MAX, f64::min);
    if fastest <= slowest {
        writeln!(out, "  Range:    {fastest:.0}-{slowest:.0}ms")?;
    }

    Ok(())
}

fn format_value(unit: MetricUnit, value: f64) -> String {
    match unit {
        MetricUnit::Ratio => percent(value),
        MetricUnit::Milliseconds => format!("{value:.1}"),
    }
}

fn format_delta(unit: MetricUnit, delta: f64) -> String {
    match unit {
        MetricUnit::Ratio => format!("{:+.1}%", delta * 100.0),
        MetricUnit::Milliseconds => format!("{delta:+.1}"),
    }
}

fn verdict_marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Improved => "better",
        Verdict::Regressed => "worse",
        Verdict::Unchanged => "same",
    }
}

pub fn write_comparison<W: Write>(out: &mut W, comparison: &VersionComparison) -> io::Result<()> {
    let rule = "=".repeat(70);
    writeln!(out, "\n{rule}")?;
    writeln!(
        out,
        "PROMPT VERSION COMPARISON: {} vs {}",
        comparison.baseline_version, comparison.candidate_version
    )?;
    writeln!(
        out,
        "  {} run {} at {}",
        comparison.baseline_version, comparison.baseline_run_id, comparison.baseline_timestamp
    )?;
    writeln!(
        out,
        "  {} run {} at {}",
        comparison.candidate_version, comparison.candidate_run_id, comparison.candidate_timestamp
    )?;
    writeln!(out, "{rule}")?;

    writeln!(
        out,
        "\n{:<25} {:>15} {:>15} {:>12}  {}",
        "Metric", comparison.baseline_version, comparison.candidate_version, "Change", "Verdict"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for delta in &comparison.deltas {
        let unit = delta.metric.unit();
        writeln!(
            out,
            "{:<25} {:>15} {:>15} {:>12}  {}",
            delta.metric.label(),
            format_value(unit, delta.baseline),
            format_value(unit, delta.candidate),
            format_delta(unit, delta.delta),
            verdict_marker(delta.verdict)
        )?;
    }
    writeln!(out, "\n{rule}")?;
    Ok(())
}

pub fn write_history_listing<W: Write>(
    out: &mut W,
    total_runs: usize,
    newest: &[&HistoryRecord],
) -> io::Result<()> {
    writeln!(out, "\nHistorical runs: {total_runs}")?;
    for record in newest {
        let timestamp = record.timestamp.chars().take(19).collect::<String>();
        let accuracy = record
            .entity_type_accuracy
            .map(percent)
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(
            out,
            "  {timestamp:<19} | {:<8} | Acc: {accuracy}",
            record.prompt_version
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_comparison, write_history_listing, write_metrics_report};
    use crate::history::{HistoryRecord, compare_versions};
    use crate::metrics::compute_metrics;
    use crate::model::{RawResultRow, ResultRow, RunMetadata};

    fn metadata() -> RunMetadata {
        RunMetadata {
            run_id: "0123456789abcdef".to_string(),
            timestamp: "2026-04-01T12:00:00Z".to_string(),
            prompt_version: "v4".to_string(),
        }
    }

    fn history_record(run_id: &str, version: &str, accuracy: f64, latency: f64) -> HistoryRecord {
        HistoryRecord {
            run_id: run_id.to_string(),
            timestamp: "2026-04-01T12:00:00Z".to_string(),
            prompt_version: version.to_string(),
            total_tests: 2,
            completed_tests: 2,
            completion_rate: Some(1.0),
            entity_type_accuracy: Some(accuracy),
            title_keyword_overlap_avg: Some(0.5),
            start_time_presence_accuracy: Some(0.5),
            start_hour_accuracy: Some(0.5),
            avg_confidence: Some(0.5),
            expected_calibration_error: Some(0.1),
            avg_latency_ms: Some(latency),
            p95_latency_ms: Some(latency),
        }
    }

    #[test]
    fn metrics_report_renders_sections_for_completed_run() {
        let rows = vec![ResultRow::from(RawResultRow {
            status: "COMPLETED".to_string(),
            expected_entity_type: "task".to_string(),
            actual_entity_type: "task".to_string(),
            entity_type_correct: "true".to_string(),
            start_hour_error: "2".to_string(),
            latency_ms: "640".to_string(),
            ..RawResultRow::default()
        })];
        let document = compute_metrics(&rows, &metadata(), &["task".to_string()]);

        let mut out = Vec::new();
        write_metrics_report(&mut out, &document).expect("report should render");
        let text = String::from_utf8(out).expect("report should be utf-8");

        assert!(text.contains("Run ID:         01234567"));
        assert!(text.contains("Overall Accuracy: 100.0%"));
        assert!(text.contains("Avg Hour Error:            2.0 hours"));
        assert!(text.contains("P95:      640ms"));
        assert!(text.contains("Range:    640-640ms"));
        assert!(text.contains("Macro F1 Score: 1.00"));
    }

    #[test]
    fn metrics_report_states_reason_when_nothing_completed() {
        let rows = vec![ResultRow::from(RawResultRow {
            status: "ERROR".to_string(),
            ..RawResultRow::default()
        })];
        let document = compute_metrics(&rows, &metadata(), &["task".to_string()]);

        let mut out = Vec::new();
        write_metrics_report(&mut out, &document).expect("report should render");
        let text = String::from_utf8(out).expect("report should be utf-8");

        assert!(text.contains("No completed tests to analyze"));
        assert!(!text.contains("LATENCY"));
    }

    #[test]
    fn comparison_shows_ratios_as_percentages_and_latency_in_ms() {
        let history = vec![
            history_record("a", "v1", 0.70, 800.0),
            history_record("b", "v2", 0.80, 900.0),
        ];
        let comparison = compare_versions("v1", "v2", &history).expect("versions present");

        let mut out = Vec::new();
        write_comparison(&mut out, &comparison).expect("comparison should render");
        let text = String::from_utf8(out).expect("comparison should be utf-8");

        assert!(text.contains("70.0%"));
        assert!(text.contains("+10.0%"));
        assert!(text.contains("+100.0"));
        assert!(text.contains("worse"));
        assert!(text.contains("better"));
    }

    #[test]
    fn history_listing_marks_missing_accuracy() {
        let mut legacy = history_record("c", "v0", 0.0, 0.0);
        legacy.entity_type_accuracy = None;
        let records = [legacy];
        let newest = records.iter().collect::<Vec<_>>();

        let mut out = Vec::new();
        write_history_listing(&mut out, 1, &newest).expect("listing should render");
        let text = String::from_utf8(out).expect("listing should be utf-8");

        assert!(text.contains("Historical runs: 1"));
        assert!(text.contains("Acc: n/a"));
    }
}
