use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::*;
use crate::error::AnalyzerError;
use crate::util::write_json_pretty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended { total_runs: usize },
    Duplicate,
}

/// Append-only history file. Every mutation reads the whole file and writes
/// it back in full; a single writer is assumed.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty history. A file that exists but does not
    /// parse is `AnalyzerError::HistoryCorrupt`.
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "metrics history missing; starting empty");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };

        let records = serde_json::from_slice::<Vec<HistoryRecord>>(&raw).map_err(|source| {
            AnalyzerError::HistoryCorrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(records)
    }

    /// Adds the condensed record for `document` unless its `run_id` is
    /// already present, in which case nothing is written.
    pub fn append(&self, document: &MetricsDocument) -> Result<AppendOutcome> {
        let record = HistoryRecord::from(document);
        let mut history = self.load()?;

        if history.iter().any(|existing| existing.run_id == record.run_id) {
            debug!(run_id = %record.run_id, "run already present in metrics history");
            return Ok(AppendOutcome::Duplicate);
        }

        history.push(record);
        write_json_pretty(&self.path, &history)?;

        Ok(AppendOutcome::Appended {
            total_runs: history.len(),
        })
    }
}
