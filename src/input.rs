use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::model::{RawResultRow, ResultRow};

pub fn load_result_rows(path: &Path) -> Result<Vec<ResultRow>> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_result_rows(file).with_context(|| format!("failed to parse {}", path.display()))
}

/// Header names select columns; unknown columns are ignored and missing ones
/// read as empty cells.
pub fn read_result_rows<R: Read>(reader: R) -> Result<Vec<ResultRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<RawResultRow>().enumerate() {
        let raw = record.with_context(|| format!("invalid CSV record at row {}", index + 1))?;
        rows.push(ResultRow::from(raw));
    }

    Ok(rows)
}

/// Most recently modified `.csv` in `data_dir`. Files named with `prefix`
/// win over other CSVs when any exist.
pub fn find_latest_csv(data_dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", data_dir.display()));
        }
    };

    let mut candidates = Vec::<(bool, SystemTime, PathBuf)>::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", data_dir.display()))?;
        let path = entry.path();

        let metadata = entry
            .metadata()
            .with_context(|| format!("failed to inspect {}", path.display()))?;
        if !metadata.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            continue;
        }

        let has_prefix = !prefix.is_empty()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(prefix))
                .unwrap_or(false);
        let modified = metadata
            .modified()
            .with_context(|| format!("failed to read mtime of {}", path.display()))?;

        candidates.push((has_prefix, modified, path));
    }

    let any_prefixed = candidates.iter().any(|(has_prefix, _, _)| *has_prefix);
    let latest = candidates
        .into_iter()
        .filter(|(has_prefix, _, _)| !any_prefixed || *has_prefix)
        .max_by(|left, right| left.1.cmp(&right.1).then_with(|| left.2.cmp(&right.2)))
        .map(|(_, _, path)| path);

    Ok(latest)
}
