mod cli;
mod coerce;
mod commands;
mod config;
mod error;
mod history;
mod input;
mod metrics;
mod model;
mod report;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Workspace;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let workspace = Workspace::load(&cli.root, cli.config.as_deref());

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(&workspace, args),
        Commands::History(args) => commands::history::run(&workspace, args),
        Commands::Compare(args) => commands::compare::run(&workspace, args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
