use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::coerce::normalize_label;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub entity_types: Vec<String>,
    pub file_prefix: String,
    pub output_directory: String,
    pub metrics_history_file: String,
    pub plot_directory: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            entity_types: ["task", "event", "habit", "override", "unknown"]
                .iter()
                .map(|label| label.to_string())
                .collect(),
            file_prefix: "LLMEval".to_string(),
            output_directory: "ExportedData".to_string(),
            metrics_history_file: "metrics_history.json".to_string(),
            plot_directory: "plots".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json(raw: &[u8]) -> serde_json::Result<Self> {
        let mut config = serde_json::from_slice::<Self>(raw)?;
        config.entity_types = config
            .entity_types
            .iter()
            .map(|label| normalize_label(label))
            .collect();
        Ok(config)
    }

    /// Falls back to defaults when the file is missing or unusable; a broken
    /// config should not block analysis.
    pub fn load_or_default(path: &Path) -> Self {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config not found; using defaults");
                return Self::default();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read config; using defaults");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    entity_types = config.entity_types.len(),
                    plot_directory = %config.plot_directory,
                    "loaded config"
                );
                config
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config; using defaults");
                Self::default()
            }
        }
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output_directory)
    }

    pub fn history_path(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(&self.metrics_history_file)
    }
}
