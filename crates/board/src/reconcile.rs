//! One-directional pull of a remote board into a directory of task lists.
//!
//! After [`reconcile`] returns, the directory holds exactly one task list per
//! remote column (ordered as the columns are) and each list holds exactly one
//! task per remote item. Local-only lists are deleted. Local edits are
//! overwritten without conflict detection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{RemoteBoardColumn, StoreError, StoredTaskList, Task, TaskList, TaskListStore};

/// What a pull changed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Task lists created for columns with no matching file.
    pub created: Vec<PathBuf>,
    /// Existing task lists overwritten with remote state.
    pub updated: Vec<PathBuf>,
    /// Task lists removed because no remote column matched their title.
    pub deleted: Vec<PathBuf>,
    /// Local tasks dropped because their column had fewer items.
    pub truncated_tasks: usize,
}

/// Mirrors `columns` into the task lists stored in `directory`.
///
/// A column is matched, in order of preference, to a file whose stored title
/// equals the column name, to the file named exactly as the store would name a
/// new list with the column's title, or to the first file whose name contains
/// the column name. A file is matched to at most one column. Columns without a
/// match get a new list; when two column names map to the same file name the
/// later one is stored as `<name> (2)`, `<name> (3)` and so on.
///
/// Store errors abort the pull where they happen; earlier writes are kept.
#[instrument(skip(store, columns), fields(directory = %directory.display(), columns = columns.len()))]
pub fn reconcile<S>(
    store: &S,
    directory: &Path,
    columns: &[RemoteBoardColumn],
) -> Result<ReconcileReport, StoreError>
where
    S: TaskListStore + ?Sized,
{
    let candidates = store.list_task_lists_in(directory)?;
    let matches = match_columns(store, &candidates, columns);
    let mut taken: HashSet<String> = candidates.iter().map(|p| file_name(p)).collect();

    let mut report = ReconcileReport::default();
    for (index, (column, matched)) in columns.iter().zip(matches).enumerate() {
        let StoredTaskList { path, mut list } = match matched {
            Some(path) => {
                let list = load_or_blank(store, &path, &column.name)?;
                report.updated.push(path.clone());
                StoredTaskList { path, list }
            }
            None => {
                let stored = store.create(directory, &free_name(store, &column.name, &taken))?;
                taken.insert(file_name(&stored.path));
                info!(path = %stored.path.display(), column = %column.name, "created task list");
                report.created.push(stored.path.clone());
                stored
            }
        };

        list.title = column.name.clone();
        list.order = i32::try_from(index).unwrap_or(i32::MAX);
        report.truncated_tasks += overwrite_tasks(&mut list, column);
        store.save(&path, &list)?;
    }

    let titles: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    for path in store.list_task_lists_in(directory)? {
        let keep = match store.load(&path) {
            Ok(list) => titles.contains(list.title.as_str()),
            Err(StoreError::Corrupt { message, .. }) => {
                warn!(path = %path.display(), %message, "removing undecodable task list");
                false
            }
            Err(e) => return Err(e),
        };
        if !keep {
            store.delete(&path)?;
            info!(path = %path.display(), "deleted task list");
            report.deleted.push(path);
        }
    }

    debug!(?report, "pull reconciled");
    Ok(report)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `name`, or the first of `name (2)`, `name (3)`, ... whose file name is not
/// in `taken`.
fn free_name<S>(store: &S, name: &str, taken: &HashSet<String>) -> String
where
    S: TaskListStore + ?Sized,
{
    if !taken.contains(&store.file_name_for(name)) {
        return name.to_string();
    }
    let mut suffix = 2u32;
    loop {
        let candidate = format!("{} ({suffix})", name.trim());
        if !taken.contains(&store.file_name_for(&candidate)) {
            return candidate;
        }
        suffix = suffix.saturating_add(1);
    }
}

/// Picks a file for every column: stored titles first, then exact names, then
/// substrings, never handing one file to two columns.
fn match_columns<S>(
    store: &S,
    candidates: &[PathBuf],
    columns: &[RemoteBoardColumn],
) -> Vec<Option<PathBuf>>
where
    S: TaskListStore + ?Sized,
{
    // Undecodable or unreadable files have no title; they can still match by name.
    let titles: Vec<Option<String>> = candidates
        .iter()
        .map(|p| store.load(p).ok().map(|list| list.title))
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut matches: Vec<Option<PathBuf>> = vec![None; columns.len()];
    let mut assign = |is_match: &dyn Fn(&Path, Option<&str>, &str) -> bool| {
        for (slot, column) in matches.iter_mut().zip(columns) {
            if slot.is_some() {
                continue;
            }
            let found = candidates.iter().enumerate().position(|(i, path)| {
                !claimed.contains(&i) && is_match(path, titles[i].as_deref(), &column.name)
            });
            if let Some(i) = found {
                claimed.insert(i);
                *slot = Some(candidates[i].clone());
            }
        }
    };

    assign(&|_, title, name| title == Some(name));
    assign(&|path, _, name| file_name(path) == store.file_name_for(name));
    assign(&|path, _, name| file_name(path).contains(name));

    matches
}

fn load_or_blank<S>(store: &S, path: &Path, title: &str) -> Result<TaskList, StoreError>
where
    S: TaskListStore + ?Sized,
{
    match store.load(path) {
        Ok(list) => Ok(list),
        Err(StoreError::Corrupt { message, .. }) => {
            warn!(path = %path.display(), %message, "overwriting undecodable task list");
            Ok(TaskList::new(title, 0))
        }
        Err(e) => Err(e),
    }
}

/// Overwrites title and description of the first tasks, appends missing ones
/// and drops extras. Returns how many tasks were dropped.
fn overwrite_tasks(list: &mut TaskList, column: &RemoteBoardColumn) -> usize {
    for (index, item) in column.items.iter().enumerate() {
        if list.tasks.len() <= index {
            list.tasks.push(Task::default());
        }
        let task = &mut list.tasks[index];
        task.title = item.name.clone();
        task.description = item.body.clone();
    }

    let extra = list.tasks.len().saturating_sub(column.items.len());
    list.tasks.truncate(column.items.len());
    extra
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ItemId, Progress, RemoteColumnItem};

    /// Keeps task lists as serialised JSON so tests compare persisted bytes.
    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<BTreeMap<PathBuf, String>>,
    }

    impl MemoryStore {
        fn insert(&self, path: &str, list: &TaskList) {
            self.files
                .borrow_mut()
                .insert(PathBuf::from(path), serde_json::to_string(list).unwrap());
        }

        fn insert_raw(&self, path: &str, raw: &str) {
            self.files
                .borrow_mut()
                .insert(PathBuf::from(path), raw.to_string());
        }

        fn lists(&self) -> Vec<(PathBuf, TaskList)> {
            self.files
                .borrow()
                .iter()
                .map(|(p, raw)| (p.clone(), serde_json::from_str(raw).unwrap()))
                .collect()
        }

        fn snapshot(&self) -> BTreeMap<PathBuf, String> {
            self.files.borrow().clone()
        }
    }

    impl TaskListStore for MemoryStore {
        fn file_name_for(&self, name: &str) -> String {
            format!("{name}.list")
        }

        fn find_task_list_directories(&self) -> Result<Vec<PathBuf>, StoreError> {
            let mut dirs: Vec<PathBuf> = self
                .files
                .borrow()
                .keys()
                .filter_map(|p| p.parent().map(Path::to_path_buf))
                .collect();
            dirs.dedup();
            Ok(dirs)
        }

        fn list_task_lists_in(&self, directory: &Path) -> Result<Vec<PathBuf>, StoreError> {
            Ok(self
                .files
                .borrow()
                .keys()
                .filter(|p| p.parent() == Some(directory))
                .cloned()
                .collect())
        }

        fn load(&self, path: &Path) -> Result<TaskList, StoreError> {
            let files = self.files.borrow();
            let raw = files.get(path).ok_or_else(|| StoreError::NotFound {
                name: path.display().to_string(),
            })?;
            serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }

        fn create(&self, directory: &Path, name: &str) -> Result<StoredTaskList, StoreError> {
            let path = directory.join(self.file_name_for(name));
            if self.files.borrow().contains_key(&path) {
                return Err(StoreError::AlreadyExists { path });
            }
            let list = TaskList::new(name, 0);
            self.save(&path, &list)?;
            Ok(StoredTaskList { path, list })
        }

        fn save(&self, path: &Path, list: &TaskList) -> Result<(), StoreError> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), serde_json::to_string(list).unwrap());
            Ok(())
        }

        fn delete(&self, path: &Path) -> Result<(), StoreError> {
            self.files.borrow_mut().remove(path);
            Ok(())
        }
    }

    fn column(name: &str, items: &[(&str, &str, &str)]) -> RemoteBoardColumn {
        RemoteBoardColumn {
            name: name.to_string(),
            items: items
                .iter()
                .map(|(id, name, body)| RemoteColumnItem {
                    id: ItemId::new(*id).unwrap(),
                    name: name.to_string(),
                    body: body.to_string(),
                })
                .collect(),
        }
    }

    fn dir() -> &'static Path {
        Path::new("/tasks")
    }

    #[test]
    fn empty_directory_gets_one_list_per_column() {
        let store = MemoryStore::default();
        let columns = vec![column("Todo", &[("1", "A", "a")]), column("Done", &[])];

        let report = reconcile(&store, dir(), &columns).unwrap();

        assert_eq!(report.created.len(), 2);
        let lists = store.lists();
        let (_, done) = &lists[0];
        let (_, todo) = &lists[1];
        assert_eq!(todo.title, "Todo");
        assert_eq!(todo.order, 0);
        assert_eq!(todo.tasks.len(), 1);
        assert_eq!(todo.tasks[0].title, "A");
        assert_eq!(todo.tasks[0].description, "a");
        assert_eq!(done.title, "Done");
        assert_eq!(done.order, 1);
        assert!(done.tasks.is_empty());
    }

    #[test]
    fn second_pull_of_same_snapshot_changes_nothing() {
        let store = MemoryStore::default();
        let columns = vec![
            column("Todo", &[("1", "A", "a"), ("2", "B", "")]),
            column("Done", &[("3", "C", "c")]),
        ];

        reconcile(&store, dir(), &columns).unwrap();
        let first = store.snapshot();
        let report = reconcile(&store, dir(), &columns).unwrap();

        assert_eq!(store.snapshot(), first);
        assert!(report.created.is_empty());
        assert!(report.deleted.is_empty());
    }

    #[test]
    fn unmatched_local_lists_are_deleted() {
        let store = MemoryStore::default();
        store.insert("/tasks/Backlog.list", &TaskList::new("Backlog", 0));
        store.insert("/elsewhere/Backlog.list", &TaskList::new("Backlog", 0));

        let report = reconcile(&store, dir(), &[column("Todo", &[])]).unwrap();

        assert_eq!(report.deleted, vec![PathBuf::from("/tasks/Backlog.list")]);
        let paths: Vec<PathBuf> = store.lists().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/elsewhere/Backlog.list"),
                PathBuf::from("/tasks/Todo.list"),
            ]
        );
    }

    #[test]
    fn extra_local_tasks_are_truncated() {
        let store = MemoryStore::default();
        let mut local = TaskList::new("Todo", 3);
        for title in ["x", "y", "z"] {
            local.add_task(Task::new(title));
        }
        store.insert("/tasks/Todo.list", &local);

        let report = reconcile(&store, dir(), &[column("Todo", &[("1", "A", "a")])]).unwrap();

        assert_eq!(report.truncated_tasks, 2);
        assert_eq!(report.updated, vec![PathBuf::from("/tasks/Todo.list")]);
        let (_, list) = &store.lists()[0];
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.order, 0);
    }

    #[test]
    fn overwrite_keeps_local_only_task_fields() {
        let store = MemoryStore::default();
        let mut local = TaskList::new("Todo", 0);
        let mut task = Task::new("old");
        task.progress = Progress::Tracked(0.5);
        task.add_bullet_point("keep me");
        local.add_task(task);
        store.insert("/tasks/Todo.list", &local);

        reconcile(&store, dir(), &[column("Todo", &[("1", "new", "body")])]).unwrap();

        let (_, list) = &store.lists()[0];
        assert_eq!(list.tasks[0].title, "new");
        assert_eq!(list.tasks[0].description, "body");
        assert_eq!(list.tasks[0].progress, Progress::Tracked(0.5));
        assert_eq!(list.tasks[0].bullet_points.len(), 1);
    }

    #[test]
    fn substring_match_adopts_existing_file() {
        let store = MemoryStore::default();
        store.insert("/tasks/My Todo items.list", &TaskList::new("Old title", 5));

        let report = reconcile(&store, dir(), &[column("Todo", &[])]).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.updated, vec![PathBuf::from("/tasks/My Todo items.list")]);
        let (_, list) = &store.lists()[0];
        assert_eq!(list.title, "Todo");
    }

    #[test]
    fn exact_names_win_over_earlier_substring_matches() {
        let store = MemoryStore::default();
        store.insert("/tasks/Todo.list", &TaskList::new("Todo", 0));

        let columns = vec![column("To", &[]), column("Todo", &[])];
        let report = reconcile(&store, dir(), &columns).unwrap();

        assert_eq!(report.updated, vec![PathBuf::from("/tasks/Todo.list")]);
        assert_eq!(report.created, vec![PathBuf::from("/tasks/To.list")]);
        let titles: Vec<String> = store.lists().into_iter().map(|(_, l)| l.title).collect();
        assert_eq!(titles, vec!["To", "Todo"]);
    }

    #[test]
    fn stored_title_wins_over_file_name() {
        let store = MemoryStore::default();
        store.insert("/tasks/Todo.list", &TaskList::new("Doing", 1));
        store.insert("/tasks/column-a.list", &TaskList::new("Todo", 0));

        let columns = vec![column("Todo", &[]), column("Doing", &[])];
        let report = reconcile(&store, dir(), &columns).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(
            report.updated,
            vec![
                PathBuf::from("/tasks/column-a.list"),
                PathBuf::from("/tasks/Todo.list"),
            ]
        );
    }

    #[test]
    fn undecodable_files_are_removed() {
        let store = MemoryStore::default();
        store.insert_raw("/tasks/garbage.list", "{not json");

        let report = reconcile(&store, dir(), &[column("Todo", &[])]).unwrap();

        assert_eq!(report.deleted, vec![PathBuf::from("/tasks/garbage.list")]);
    }

    #[test]
    fn undecodable_matched_file_is_overwritten() {
        let store = MemoryStore::default();
        store.insert_raw("/tasks/Todo.list", "{not json");

        reconcile(&store, dir(), &[column("Todo", &[("1", "A", "")])]).unwrap();

        let (_, list) = &store.lists()[0];
        assert_eq!(list.title, "Todo");
        assert_eq!(list.tasks.len(), 1);
    }

    #[test]
    fn empty_snapshot_clears_directory() {
        let store = MemoryStore::default();
        store.insert("/tasks/Todo.list", &TaskList::new("Todo", 0));

        let report = reconcile(&store, dir(), &[]).unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(store.lists().is_empty());
    }
}
