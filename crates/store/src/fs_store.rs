//! File-system implementation of [`TaskListStore`].
//!
//! Each task list is one pretty-printed JSON file named
//! `<title>.tasklist.json`. Writes go through a temporary file in the same
//! directory and are renamed into place, so a crash never leaves half a file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use board::{StoreError, StoredTaskList, TaskList, TaskListStore};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Suffix shared by all task-list files.
pub const TASK_LIST_SUFFIX: &str = ".tasklist.json";

/// Name used when a title sanitises to nothing.
const UNTITLED: &str = "Untitled";

/// Task lists stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsTaskListStore {
    root: PathBuf,
}

impl FsTaskListStore {
    /// Creates a store that discovers task-list directories below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every task-list file at any depth below `directory`, sorted.
    pub fn find_task_list_files(&self, directory: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        walk(directory, &mut files)?;
        files.sort();
        Ok(files)
    }
}

/// Returns `true` if `path` names a task-list file.
pub fn is_task_list_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > TASK_LIST_SUFFIX.len() && n.ends_with(TASK_LIST_SUFFIX))
}

/// Makes `name` safe to use as a file name on every common platform.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Collects task-list files below `dir`, skipping hidden directories.
fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if file_type.is_dir() {
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden {
                walk(&path, files)?;
            }
        } else if file_type.is_file() && is_task_list_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Writes `contents` to `path` atomically.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent).map_err(io_error(parent))?;
    file.write_all(contents).map_err(io_error(path))?;
    file.persist(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

impl TaskListStore for FsTaskListStore {
    fn file_name_for(&self, name: &str) -> String {
        format!("{}{TASK_LIST_SUFFIX}", sanitize_file_stem(name))
    }

    fn find_task_list_directories(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dirs: Vec<PathBuf> = self
            .find_task_list_files(&self.root)?
            .into_iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();
        dirs.sort();
        dirs.dedup();
        Ok(dirs)
    }

    fn list_task_lists_in(&self, directory: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(io_error(directory))? {
            let entry = entry.map_err(io_error(directory))?;
            let path = entry.path();
            if path.is_file() && is_task_list_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<TaskList, StoreError> {
        let raw = fs::read_to_string(path).map_err(io_error(path))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn create(&self, directory: &Path, name: &str) -> Result<StoredTaskList, StoreError> {
        fs::create_dir_all(directory).map_err(io_error(directory))?;
        let path = directory.join(self.file_name_for(name));
        if path.exists() {
            return Err(StoreError::AlreadyExists { path });
        }
        let list = TaskList::new(name, 0);
        self.save(&path, &list)?;
        debug!(path = %path.display(), "created task list file");
        Ok(StoredTaskList { path, list })
    }

    fn save(&self, path: &Path, list: &TaskList) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(list).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }

    fn delete(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_file(path).map_err(io_error(path))?;
        Ok(())
    }
}

impl FsTaskListStore {
    /// All decodable task lists at any depth below `directory`, sorted by
    /// `order` (ties by path). Undecodable files are skipped.
    pub fn load_ordered(&self, directory: &Path) -> Result<Vec<StoredTaskList>, StoreError> {
        let mut lists = Vec::new();
        for path in self.find_task_list_files(directory)? {
            match self.load(&path) {
                Ok(list) => lists.push(StoredTaskList { path, list }),
                Err(StoreError::Corrupt { path, message }) => {
                    warn!(path = %path.display(), %message, "skipping undecodable task list");
                }
                Err(e) => return Err(e),
            }
        }
        lists.sort_by(|a, b| a.list.order.cmp(&b.list.order).then_with(|| a.path.cmp(&b.path)));
        Ok(lists)
    }

    /// Creates a list placed after every existing one, titled `title` or
    /// `New Task List <order>`. Nothing is written if the file name is taken.
    pub fn create_next(
        &self,
        directory: &Path,
        title: Option<&str>,
    ) -> Result<StoredTaskList, StoreError> {
        let order = if directory.exists() {
            self.load_ordered(directory)?
                .iter()
                .map(|s| s.list.order)
                .max()
                .map_or(0, |max| max.saturating_add(1))
        } else {
            0
        };
        let title = title.map_or_else(|| format!("New Task List {order}"), str::to_string);
        let mut stored = self.create(directory, &title)?;
        stored.list.order = order;
        self.save(&stored.path, &stored.list)?;
        Ok(stored)
    }

    /// Finds a list by exact title at any depth below `directory`.
    pub fn find_by_title(&self, directory: &Path, title: &str) -> Result<StoredTaskList, StoreError> {
        self.load_ordered(directory)?
            .into_iter()
            .find(|s| s.list.title == title)
            .ok_or_else(|| StoreError::NotFound {
                name: title.to_string(),
            })
    }

    /// Saves the list and renames its file to match its title. Returns the
    /// (possibly new) path.
    pub fn save_and_rename(&self, stored: &StoredTaskList) -> Result<PathBuf, StoreError> {
        self.save(&stored.path, &stored.list)?;
        let expected = self.file_name_for(&stored.list.title);
        let current = stored.path.file_name().map(|n| n.to_string_lossy().into_owned());
        if current.as_deref() == Some(expected.as_str()) {
            return Ok(stored.path.clone());
        }

        let target = stored.path.with_file_name(&expected);
        if target.exists() {
            return Err(StoreError::AlreadyExists { path: target });
        }
        fs::rename(&stored.path, &target).map_err(io_error(&stored.path))?;
        debug!(from = %stored.path.display(), to = %target.display(), "renamed task list");
        Ok(target)
    }
}
