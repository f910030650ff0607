use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "eval-analyzer",
    version,
    about = "Metrics and prompt-version history for entity-extraction evaluation runs"
)]
pub struct Cli {
    /// Directory the configured output directory is resolved against.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Defaults to `<root>/config.json`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze(AnalyzeArgs),
    History(HistoryArgs),
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Result CSV to analyze; the newest CSV in the output directory otherwise.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_history_add: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    pub baseline_version: String,

    pub candidate_version: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
