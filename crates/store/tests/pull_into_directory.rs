//! Pulls remote columns into a real directory through `FsTaskListStore`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use board::{reconcile, ItemId, RemoteBoardColumn, RemoteColumnItem, Task, TaskList, TaskListStore};
use pretty_assertions::assert_eq;
use store::FsTaskListStore;
use tempfile::TempDir;

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

/// File name → raw bytes of every file in `dir`.
fn dir_contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            (
                path.file_name().unwrap().to_string_lossy().into_owned(),
                fs::read(&path).unwrap(),
            )
        })
        .collect()
}

#[test]
fn empty_directory_receives_one_file_per_column() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    let columns = vec![column("Todo", &[("1", "A", "a")]), column("Done", &[])];

    reconcile(&store, temp.path(), &columns).unwrap();

    let todo = store.load(&temp.path().join("Todo.tasklist.json")).unwrap();
    assert_eq!(todo.title, "Todo");
    assert_eq!(todo.order, 0);
    assert_eq!(todo.tasks, vec![Task::new("A").with_description("a")]);

    let done = store.load(&temp.path().join("Done.tasklist.json")).unwrap();
    assert_eq!(done.title, "Done");
    assert_eq!(done.order, 1);
    assert!(done.tasks.is_empty());
}

#[test]
fn pulling_the_same_snapshot_twice_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    let mut local = TaskList::new("Backlog", 0);
    local.add_task(Task::new("local only"));
    store.save(&temp.path().join("Backlog.tasklist.json"), &local).unwrap();

    let columns = vec![
        column("Todo", &[("1", "A", "a"), ("2", "B", "multi\nline")]),
        column("In/Progress", &[("3", "C", "")]),
    ];

    reconcile(&store, temp.path(), &columns).unwrap();
    let first = dir_contents(temp.path());
    reconcile(&store, temp.path(), &columns).unwrap();
    let second = dir_contents(temp.path());

    assert_eq!(first, second);
    let names: Vec<&String> = second.keys().collect();
    assert_eq!(names, vec!["In_Progress.tasklist.json", "Todo.tasklist.json"]);
}

#[test]
fn local_lists_without_a_column_are_deleted() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    store.create(temp.path(), "Icebox").unwrap();
    fs::write(temp.path().join("notes.md"), "keep").unwrap();

    let report = reconcile(&store, temp.path(), &[column("Todo", &[])]).unwrap();

    assert_eq!(report.deleted, vec![temp.path().join("Icebox.tasklist.json")]);
    assert!(!temp.path().join("Icebox.tasklist.json").exists());
    assert!(temp.path().join("notes.md").exists());
}

#[test]
fn task_count_matches_remote_item_count() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    let mut stored = store.create(temp.path(), "Todo").unwrap();
    for title in ["x", "y", "z", "w"] {
        stored.list.add_task(Task::new(title));
    }
    store.save(&stored.path, &stored.list).unwrap();

    reconcile(&store, temp.path(), &[column("Todo", &[("1", "A", ""), ("2", "B", "")])]).unwrap();

    let titles: Vec<String> = store
        .load(&stored.path)
        .unwrap()
        .tasks
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[test]
fn missing_directory_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    let missing: PathBuf = temp.path().join("nope");

    let err = reconcile(&store, &missing, &[column("Todo", &[])]).unwrap_err();
    assert!(matches!(err, board::StoreError::Io { .. }));
}

#[test]
fn columns_sharing_a_file_name_get_separate_lists() {
    let temp = TempDir::new().unwrap();
    let store = FsTaskListStore::new(temp.path());
    let columns = vec![
        column("Todo", &[("1", "A", "")]),
        column("Todo ", &[("2", "B", "")]),
        column("Blocked/Waiting", &[("3", "C", "")]),
        column("Blocked:Waiting", &[]),
    ];

    let report = reconcile(&store, temp.path(), &columns).unwrap();
    assert_eq!(report.created.len(), 4);
    let first = dir_contents(temp.path());
    let names: Vec<&String> = first.keys().collect();
    assert_eq!(
        names,
        vec![
            "Blocked_Waiting (2).tasklist.json",
            "Blocked_Waiting.tasklist.json",
            "Todo (2).tasklist.json",
            "Todo.tasklist.json",
        ]
    );

    let mut titles: Vec<String> = store
        .load_ordered(temp.path())
        .unwrap()
        .into_iter()
        .map(|s| s.list.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Blocked/Waiting", "Blocked:Waiting", "Todo", "Todo "]);

    let report = reconcile(&store, temp.path(), &columns).unwrap();
    assert!(report.created.is_empty());
    assert!(report.deleted.is_empty());
    assert_eq!(dir_contents(temp.path()), first);
}
