use std::path::{Path, PathBuf};

use crate::config::{AnalyzerConfig, DEFAULT_CONFIG_FILE};
use crate::history::HistoryStore;

pub mod analyze;
pub mod compare;
pub mod history;

/// Resolved root directory and configuration shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: AnalyzerConfig,
}

impl Workspace {
    pub fn load(root: &Path, config_path: Option<&Path>) -> Self {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));

        Self {
            root: root.to_path_buf(),
            config: AnalyzerConfig::load_or_default(&config_path),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir(&self.root)
    }

    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(self.config.history_path(&self.root))
    }
}
