//! Taskboard CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse arguments** with `clap`; flags may also come from the
//!    environment (`TASKBOARD_PREFS`, `GITHUB_TOKEN`).
//! 2. **Wire observability**: install the `tracing-subscriber` layer that
//!    renders the events of every crate in the workspace to stderr.
//! 3. **Construct infrastructure**: the [`store::PreferenceStore`], the
//!    [`store::FsTaskListStore`] for the chosen directory and, for the
//!    `github` commands, a [`github::GithubClient`] driven through a
//!    [`session::SyncSession`].
//! 4. **Dispatch** the command and render its error, if any, as
//!    `error: <message>` with a non-zero exit status.

mod cli;
mod commands;
mod github;
mod observability;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use store::PreferenceStore;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let prefs = match cli.prefs {
        Some(path) => PreferenceStore::at(path),
        None => PreferenceStore::at(PreferenceStore::default_path()?),
    };

    match cli.command {
        Commands::Dirs { command } => commands::dirs(&prefs, command),
        Commands::Lists { dir } => commands::lists(&prefs, &dir),
        Commands::List { command } => commands::list(&prefs, command),
        Commands::Task { command } => commands::task(&prefs, command),
        Commands::Github { command } => github::run(&prefs, cli.github_endpoint, command).await,
    }
}
