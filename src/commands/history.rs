use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use super::Workspace;
use crate::cli::HistoryArgs;
use crate::history::newest_first;
use crate::report::write_history_listing;

pub fn run(workspace: &Workspace, args: HistoryArgs) -> Result<()> {
    let store = workspace.history_store();
    let history = store.load()?;

    if history.is_empty() {
        info!(path = %store.path().display(), "no historical data found; run some evaluations first");
        return Ok(());
    }

    let newest = newest_first(&history)
        .into_iter()
        .take(args.limit)
        .collect::<Vec<_>>();

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_history_listing(&mut output, history.len(), &newest)?;
    output.flush()?;

    Ok(())
}
