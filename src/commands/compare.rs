use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use super::Workspace;
use crate::cli::CompareArgs;
use crate::history::compare_versions;
use crate::report::write_comparison;

pub fn run(workspace: &Workspace, args: CompareArgs) -> Result<()> {
    let history = workspace.history_store().load()?;
    let comparison = compare_versions(&args.baseline_version, &args.candidate_version, &history)?;

    info!(
        baseline = %comparison.baseline_version,
        baseline_run_id = %comparison.baseline_run_id,
        candidate = %comparison.candidate_version,
        candidate_run_id = %comparison.candidate_run_id,
        "compared prompt versions"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &comparison)
            .context("failed to serialize comparison json output")?;
        writeln!(output)?;
    } else {
        write_comparison(&mut output, &comparison)?;
    }
    output.flush()?;

    Ok(())
}
