use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use super::Workspace;
use crate::cli::AnalyzeArgs;
use crate::history::AppendOutcome;
use crate::input::{find_latest_csv, load_result_rows};
use crate::metrics::{MetricsDocument, compute_metrics};
use crate::model::{ResultRow, RunMetadata, RunStatus};
use crate::report::write_metrics_report;
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

/// The metrics document as archived next to its source CSV.
#[derive(Debug, Serialize)]
struct MetricsArchive<'a> {
    source_file: String,
    source_sha256: String,
    generated_at: String,
    #[serde(flatten)]
    metrics: &'a MetricsDocument,
}

pub fn run(workspace: &Workspace, args: AnalyzeArgs) -> Result<()> {
    let csv_path = resolve_csv_path(workspace, args.file)?;
    info!(path = %csv_path.display(), "analyzing results");

    let rows = load_result_rows(&csv_path)?;
    warn_on_unrecognized_statuses(&rows);
    let metadata = RunMetadata::from_rows(&rows);
    let document = compute_metrics(&rows, &metadata, &workspace.config.entity_types);

    info!(
        run_id = %document.metadata.run_id,
        prompt_version = %document.metadata.prompt_version,
        total = document.total_tests,
        completed = document.completed_tests,
        skipped = document.skipped_tests,
        errors = document.error_tests,
        completion_rate = ?document.completion_rate(),
        accuracy = ?document.entity_type_accuracy(),
        "computed metrics"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &document)
            .context("failed to serialize metrics json output")?;
        writeln!(output)?;
    } else {
        write_metrics_report(&mut output, &document)?;
    }
    output.flush()?;

    if args.no_history_add {
        info!("history append disabled");
    } else {
        append_to_history(workspace, &document)?;
    }

    let archive_path = write_archive(&csv_path, &document)?;
    info!(path = %archive_path.display(), "wrote metrics document");

    Ok(())
}

fn resolve_csv_path(workspace: &Workspace, file: Option<PathBuf>) -> Result<PathBuf> {
    let csv_path = match file {
        Some(path) => path,
        None => {
            let data_dir = workspace.data_dir();
            find_latest_csv(&data_dir, &workspace.config.file_prefix)?.with_context(|| {
                format!(
                    "no CSV file found in {}; run the evaluation harness first",
                    data_dir.display()
                )
            })?
        }
    };

    if !csv_path.is_file() {
        bail!("result CSV does not exist: {}", csv_path.display());
    }
    Ok(csv_path)
}

fn warn_on_unrecognized_statuses(rows: &[ResultRow]) {
    let unrecognized = rows
        .iter()
        .filter_map(|row| match &row.status {
            RunStatus::Other(status) => Some(status.as_str()),
            _ => None,
        })
        .collect::<BTreeSet<&str>>();

    if !unrecognized.is_empty() {
        warn!(
            statuses = ?unrecognized,
            "rows with unrecognized status are counted in total_tests only"
        );
    }
}

fn append_to_history(workspace: &Workspace, document: &MetricsDocument) -> Result<()> {
    if !document.has_completed_tests() {
        warn!(
            run_id = %document.metadata.run_id,
            "no completed tests; run not added to history"
        );
        return Ok(());
    }

    let store = workspace.history_store();
    match store.append(document)? {
        AppendOutcome::Appended { total_runs } => info!(
            run_id = %document.metadata.short_run_id(),
            total_runs,
            path = %store.path().display(),
            "added run to history"
        ),
        AppendOutcome::Duplicate => info!(
            run_id = %document.metadata.short_run_id(),
            "run already in history"
        ),
    }
    Ok(())
}

fn write_archive(csv_path: &Path, document: &MetricsDocument) -> Result<PathBuf> {
    let archive = MetricsArchive {
        source_file: csv_path.display().to_string(),
        source_sha256: sha256_file(csv_path)?,
        generated_at: now_utc_string(),
        metrics: document,
    };

    let archive_path = csv_path.with_extension("metrics.json");
    write_json_pretty(&archive_path, &archive)?;
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::run;
    use crate::cli::AnalyzeArgs;
    use crate::commands::Workspace;

    const CSV: &str = "\
run_id,timestamp,prompt_version,status,expected_entity_type,actual_entity_type,entity_type_correct,confidence,latency_ms
run-42,2026-06-01T09:00:00Z,v5,COMPLETED,task,task,true,0.92,400
run-42,2026-06-01T09:00:00Z,v5,COMPLETED,event,task,false,0.55,600
run-42,2026-06-01T09:00:00Z,v5,SKIPPED,habit,,,,
";

    fn workspace(root: &Path) -> Workspace {
        Workspace::load(root, None)
    }

    #[test]
    fn analyze_writes_archive_and_appends_history_once() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let data_dir = dir.path().join("ExportedData");
        std::fs::create_dir_all(&data_dir).expect("data dir should be created");
        std::fs::write(data_dir.join("LLMEval_run42.csv"), CSV).expect("csv should be written");

        let workspace = workspace(dir.path());
        let args = AnalyzeArgs {
            file: None,
            no_history_add: false,
            json: true,
        };
        run(&workspace, args.clone()).expect("first analysis should succeed");
        run(&workspace, args).expect("second analysis should succeed");

        let history = workspace
            .history_store()
            .load()
            .expect("history should load");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].run_id, "run-42");
        assert_eq!(history[0].prompt_version, "v5");
        assert_eq!(history[0].entity_type_accuracy, Some(0.5));

        let archive_raw = std::fs::read(data_dir.join("LLMEval_run42.metrics.json"))
            .expect("archive should exist");
        let archive: serde_json::Value =
            serde_json::from_slice(&archive_raw).expect("archive should be json");
        assert_eq!(archive["run_id"], "run-42");
        assert_eq!(archive["total_tests"], 3);
        assert_eq!(archive["entity_type_metrics"]["task"]["support"], 1);
        assert_eq!(archive["confidence_bins"]["0.9-1.0"]["count"], 1);
        assert_eq!(archive["source_sha256"].as_str().map(str::len), Some(64));
        assert!(archive.get("samples").is_none());
    }

    #[test]
    fn analyze_respects_no_history_add() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let csv_path = dir.path().join("results.csv");
        std::fs::write(&csv_path, CSV).expect("csv should be written");

        let workspace = workspace(dir.path());
        run(
            &workspace,
            AnalyzeArgs {
                file: Some(csv_path),
                no_history_add: true,
                json: true,
            },
        )
        .expect("analysis should succeed");

        assert!(!workspace.history_store().path().exists());
        assert!(dir.path().join("results.metrics.json").exists());
    }

    #[test]
    fn analyze_fails_when_no_csv_is_available() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let error = run(
            &workspace(dir.path()),
            AnalyzeArgs {
                file: None,
                no_history_add: false,
                json: true,
            },
        )
        .expect_err("missing csv should fail");
        assert!(error.to_string().contains("no CSV file found"));
    }
}
