//! Handlers for the `github` commands.
//!
//! Each invocation builds a fresh [`SyncSession`] over a [`GithubClient`],
//! issues the requests it needs one after another and, for `pull --yes`,
//! confirms the pull into the chosen directory.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use board::{BoardSnapshot, ProjectId, Username};
use github::{GithubClient, GithubConfig};
use session::{Applied, Credentials, SyncSession};
use store::{FsTaskListStore, GithubCredentials, PreferenceStore};
use tracing::info;

use crate::cli::{DirArg, GithubCommands};
use crate::commands::resolve_dir;

pub async fn run(
    prefs: &PreferenceStore,
    endpoint: Option<String>,
    command: GithubCommands,
) -> Result<()> {
    match command {
        GithubCommands::Login { username, token } => login(prefs, username, token),
        GithubCommands::Projects => {
            let mut session = connect(prefs, endpoint)?;
            list_projects(&mut session).await?;
            for (i, project) in session.projects().unwrap_or_default().iter().enumerate() {
                println!("{:>3}. {}  ({})  {}", i + 1, project.title, project.id, project.url);
            }
            Ok(())
        }
        GithubCommands::Open { number } => {
            let mut session = connect(prefs, endpoint)?;
            list_projects(&mut session).await?;
            let index = number.checked_sub(1).context("project numbers start at 1")?;
            let url = session.project_url(index).map_err(|_| unknown_project(number))?;
            println!("{url}");
            Ok(())
        }
        GithubCommands::Pull { project, dir, yes } => {
            let mut session = connect(prefs, endpoint)?;
            pull(prefs, &mut session, &project, &dir, yes).await
        }
    }
}

fn login(prefs: &PreferenceStore, username: String, token: String) -> Result<()> {
    if Username::new(username.as_str()).is_none() {
        bail!("username must not be empty");
    }
    if token.trim().is_empty() {
        bail!("token must not be empty");
    }
    prefs.set_github_credentials(&GithubCredentials { token, username })?;
    println!("saved GitHub login to {}", prefs.path().display());
    Ok(())
}

fn connect(prefs: &PreferenceStore, endpoint: Option<String>) -> Result<SyncSession> {
    let saved = prefs.github_credentials()?;
    if !saved.is_complete() {
        bail!("no GitHub login; run `taskboard github login --username <name> --token <token>`");
    }
    let username = Username::new(saved.username.as_str()).context("stored username is empty")?;

    let mut config = GithubConfig::default();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    let client = GithubClient::new(config)?;

    let mut session = SyncSession::new(Arc::new(client));
    session.set_credentials(Credentials {
        username,
        token: saved.token,
    });
    Ok(session)
}

async fn list_projects(session: &mut SyncSession) -> Result<usize> {
    session.begin_list_projects()?;
    match session.wait().await? {
        Applied::Projects(count) => Ok(count),
        other => bail!("unexpected response while listing projects: {other:?}"),
    }
}

async fn pull(
    prefs: &PreferenceStore,
    session: &mut SyncSession,
    project: &str,
    dir: &DirArg,
    yes: bool,
) -> Result<()> {
    let dir = resolve_dir(prefs, dir)?;
    match project.parse::<usize>() {
        Ok(number) => {
            let index = number.checked_sub(1).context("project numbers start at 1")?;
            list_projects(session).await?;
            session
                .begin_fetch_board_at(index)
                .map_err(|_| unknown_project(number))?;
        }
        Err(_) => {
            let id = ProjectId::new(project).context("project id must not be empty")?;
            session.begin_fetch_board(id)?;
        }
    }

    let truncated = match session.wait().await? {
        Applied::Board { truncated, .. } => truncated,
        other => bail!("unexpected response while fetching the board: {other:?}"),
    };
    if let Some(snapshot) = session.snapshot() {
        print_snapshot(snapshot);
    }
    if truncated {
        eprintln!("warning: the board has more items than one page; only the first page was fetched");
    }

    if !yes {
        println!(
            "\nThis will overwrite the task lists in {}. Run again with --yes to write them.",
            dir.display()
        );
        return Ok(());
    }

    let store = FsTaskListStore::new(&dir);
    session.set_directory(&dir);
    let report = session.confirm_pull(&store)?;
    info!(directory = %dir.display(), "board pulled");
    println!(
        "pulled into {}: {} created, {} updated, {} deleted",
        dir.display(),
        report.created.len(),
        report.updated.len(),
        report.deleted.len()
    );
    Ok(())
}

fn unknown_project(number: usize) -> anyhow::Error {
    anyhow!("no project number {number}; see `taskboard github projects`")
}

fn print_snapshot(snapshot: &BoardSnapshot) {
    for column in &snapshot.columns {
        println!("{} ({})", column.name, column.items.len());
        for item in &column.items {
            println!("  - {}", item.name);
        }
    }
}
