use std::path::PathBuf;

use thiserror::Error;

/// Failures callers are expected to match on. Everything else travels as
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("no runs found for prompt version: {version}")]
    VersionNotFound { version: String },

    #[error("metrics history is unreadable: {}", path.display())]
    HistoryCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
