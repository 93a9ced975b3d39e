//! Handlers for the local commands: directories, lists and tasks.
//!
//! Every handler loads what it needs from disk, applies one edit and writes
//! the result back. Nothing is cached between invocations.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use board::{StoredTaskList, Task, TaskList, TaskListStore};
use store::{FsTaskListStore, PreferenceStore};
use tracing::debug;

use crate::cli::{DirArg, DirCommands, ListCommands, TaskCommands, TaskRef};

/// Resolves `--dir`, falling back to the first active directory.
pub fn resolve_dir(prefs: &PreferenceStore, arg: &DirArg) -> Result<PathBuf> {
    if let Some(dir) = &arg.dir {
        return Ok(dir.clone());
    }
    prefs
        .directories()?
        .into_iter()
        .next()
        .context("no active directory; pass --dir or run `taskboard dirs add <dir>`")
}

/// Converts a 1-based position typed by the user into an index.
fn position(number: usize, what: &str) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("{what} numbers start at 1"),
    }
}

fn open_list(dir: &Path, title: &str) -> Result<(FsTaskListStore, StoredTaskList)> {
    let store = FsTaskListStore::new(dir);
    let stored = store
        .find_by_title(dir, title)
        .with_context(|| format!("looking up list \"{title}\" in {}", dir.display()))?;
    Ok((store, stored))
}

fn format_progress(list: &TaskList) -> String {
    format!("{:.0}%", list.progress() * 100.0)
}

pub fn dirs(prefs: &PreferenceStore, command: DirCommands) -> Result<()> {
    match command {
        DirCommands::List => {
            for dir in prefs.directories()? {
                let marker = if dir.is_dir() { "" } else { " (missing)" };
                println!("{}{marker}", dir.display());
            }
        }
        DirCommands::Add { path } => {
            if !path.is_dir() {
                bail!("{} is not a directory", path.display());
            }
            if prefs.add_directory(&path)? {
                println!("added {}", path.display());
            } else {
                println!("{} is already active", path.display());
            }
        }
        DirCommands::Remove { path } => {
            if prefs.remove_directory(&path)? {
                println!("removed {}", path.display());
            } else {
                bail!("{} is not an active directory", path.display());
            }
        }
        DirCommands::Discover { root } => {
            let store = FsTaskListStore::new(&root);
            for dir in store.find_task_list_directories()? {
                println!("{}", dir.display());
            }
        }
    }
    Ok(())
}

pub fn lists(prefs: &PreferenceStore, dir: &DirArg) -> Result<()> {
    let dir = resolve_dir(prefs, dir)?;
    let store = FsTaskListStore::new(&dir);
    for stored in store.load_ordered(&dir)? {
        println!(
            "{:>4}  {:<32} {:>5}  {} tasks",
            stored.list.order,
            stored.list.title,
            format_progress(&stored.list),
            stored.list.tasks.len()
        );
    }
    Ok(())
}

pub fn list(prefs: &PreferenceStore, command: ListCommands) -> Result<()> {
    match command {
        ListCommands::New { title, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let store = FsTaskListStore::new(&dir);
            let stored = store.create_next(&dir, title.as_deref())?;
            println!("created {}", stored.path.display());
        }
        ListCommands::Rename {
            list,
            new_title,
            dir,
        } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (store, mut stored) = open_list(&dir, &list)?;
            stored.list.title = new_title;
            let path = store.save_and_rename(&stored)?;
            println!("renamed to {}", path.display());
        }
        ListCommands::Delete { list, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (store, stored) = open_list(&dir, &list)?;
            store.delete(&stored.path)?;
            println!("deleted {}", stored.path.display());
        }
        ListCommands::Export { list, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (_, stored) = open_list(&dir, &list)?;
            println!("{}", stored.list.export_json()?);
        }
        ListCommands::Import { list, file, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (store, mut stored) = open_list(&dir, &list)?;
            let json = read_input(&file)?;
            stored.list.import_json(&json)?;
            let path = store.save_and_rename(&stored)?;
            println!("imported into {}", path.display());
        }
        ListCommands::Sort { list, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (store, mut stored) = open_list(&dir, &list)?;
            stored.list.sort_by_progress();
            store.save(&stored.path, &stored.list)?;
            print_tasks(&stored.list);
        }
        ListCommands::Show { list, dir } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (_, stored) = open_list(&dir, &list)?;
            println!("{} ({})", stored.list.title, format_progress(&stored.list));
            print_tasks(&stored.list);
        }
    }
    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading task list JSON from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn print_tasks(list: &TaskList) {
    for (i, task) in list.tasks.iter().enumerate() {
        println!("{:>3}. [{:>4}] {}", i + 1, task.progress.to_string(), task.title);
        for bullet in &task.bullet_points {
            let mark = if bullet.done { 'x' } else { ' ' };
            println!("       [{mark}] {}", bullet.description);
        }
        for reference in &task.references {
            println!("       -> {}: {}", reference.name, reference.path);
        }
    }
}

/// Parses `none` or a percentage in `0..=100` into a progress fraction.
fn parse_progress(value: &str) -> Result<Option<f32>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let percent: f32 = value
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("progress must be a percentage or `none`, got \"{value}\""))?;
    Ok(Some(percent / 100.0))
}

pub fn task(prefs: &PreferenceStore, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            list,
            title,
            description,
            dir,
        } => {
            let dir = resolve_dir(prefs, &dir)?;
            let (store, mut stored) = open_list(&dir, &list)?;
            let mut task = title.map(Task::new).unwrap_or_default();
            if let Some(description) = description {
                task = task.with_description(description);
            }
            let index = stored.list.add_task(task);
            store.save(&stored.path, &stored.list)?;
            println!("added task {} to {}", index + 1, stored.list.title);
            Ok(())
        }
        TaskCommands::Edit {
            target,
            title,
            description,
        } => edit_task(prefs, &target, |list, index| {
            let task = list.task_mut(index)?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = description;
            }
            Ok(())
        }),
        TaskCommands::Done { target } => edit_task(prefs, &target, |list, index| {
            list.task_mut(index)?.mark_done();
            Ok(())
        }),
        TaskCommands::Undone { target } => edit_task(prefs, &target, |list, index| {
            list.task_mut(index)?.mark_not_done();
            Ok(())
        }),
        TaskCommands::Progress { target, value } => {
            let value = parse_progress(&value)?;
            edit_task(prefs, &target, |list, index| {
                list.task_mut(index)?.set_progress(value)?;
                Ok(())
            })
        }
        TaskCommands::Remove { target } => edit_task(prefs, &target, |list, index| {
            let removed = list.remove_task(index)?;
            println!("removed \"{}\"", removed.title);
            Ok(())
        }),
        TaskCommands::Duplicate { target } => edit_task(prefs, &target, |list, index| {
            let copy = list.duplicate_task(index)?;
            println!("duplicated as task {}", copy + 1);
            Ok(())
        }),
        TaskCommands::Move { target, to } => move_task(prefs, &target, &to),
        TaskCommands::Bullet {
            target,
            description,
        } => edit_task(prefs, &target, |list, index| {
            list.task_mut(index)?.add_bullet_point(description);
            Ok(())
        }),
        TaskCommands::Toggle { target, bullet } => {
            let bullet = position(bullet, "bullet point")?;
            edit_task(prefs, &target, |list, index| {
                let done = list.task_mut(index)?.toggle_bullet_point(bullet)?;
                println!(
                    "bullet point {} is {}",
                    bullet + 1,
                    if done { "done" } else { "open" }
                );
                Ok(())
            })
        }
        TaskCommands::Ref { target, name, path } => edit_task(prefs, &target, |list, index| {
            list.task_mut(index)?.add_reference(name, path);
            Ok(())
        }),
    }
}

/// Loads the list holding `target`, applies `edit` to it and saves it.
fn edit_task<F>(prefs: &PreferenceStore, target: &TaskRef, edit: F) -> Result<()>
where
    F: FnOnce(&mut TaskList, usize) -> Result<()>,
{
    let dir = resolve_dir(prefs, &target.dir)?;
    let (store, mut stored) = open_list(&dir, &target.list)?;
    let index = position(target.task, "task")?;
    edit(&mut stored.list, index)?;
    store.save(&stored.path, &stored.list)?;
    debug!(path = %stored.path.display(), task = index, "task list saved");
    Ok(())
}

fn move_task(prefs: &PreferenceStore, target: &TaskRef, to: &str) -> Result<()> {
    if target.list == to {
        bail!("task is already in \"{to}\"");
    }
    let dir = resolve_dir(prefs, &target.dir)?;
    let (store, mut source) = open_list(&dir, &target.list)?;
    let (_, mut destination) = open_list(&dir, to)?;
    let index = position(target.task, "task")?;

    source.list.move_task(index, &mut destination.list)?;
    store.save(&destination.path, &destination.list)?;
    store.save(&source.path, &source.list)?;
    println!(
        "moved to {} as task {}",
        destination.list.title,
        destination.list.tasks.len()
    );
    Ok(())
}
