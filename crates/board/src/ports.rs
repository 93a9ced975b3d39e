//! Port traits implemented by infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`RemoteBoard`] | `github::GithubClient` |
//! | [`TaskListStore`] | `store::FsTaskListStore` |

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    BoardItems, ProjectId, RemoteError, RemoteProjectHeader, StoreError, TaskList, Username,
};

/// Read access to a remote project-board service.
#[async_trait]
pub trait RemoteBoard: Send + Sync {
    /// Lists the boards owned by `username`.
    async fn list_projects(
        &self,
        username: &Username,
        token: &str,
    ) -> Result<Vec<RemoteProjectHeader>, RemoteError>;

    /// Fetches the items of one board together with their column values.
    async fn fetch_board_items(
        &self,
        project: &ProjectId,
        token: &str,
    ) -> Result<BoardItems, RemoteError>;
}

/// A task list together with the path it is stored at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTaskList {
    pub path: PathBuf,
    pub list: TaskList,
}

/// Persistence boundary for task lists.
///
/// One task list per file; a file's path is its identity.
pub trait TaskListStore {
    /// File name (without directory) a new list titled `name` is stored under.
    fn file_name_for(&self, name: &str) -> String;

    /// Every directory that holds at least one task list, sorted.
    fn find_task_list_directories(&self) -> Result<Vec<PathBuf>, StoreError>;

    /// Task-list files directly inside `directory`, sorted by path.
    fn list_task_lists_in(&self, directory: &Path) -> Result<Vec<PathBuf>, StoreError>;

    fn load(&self, path: &Path) -> Result<TaskList, StoreError>;

    /// Creates and persists an empty task list titled `name` in `directory`.
    fn create(&self, directory: &Path, name: &str) -> Result<StoredTaskList, StoreError>;

    fn save(&self, path: &Path, list: &TaskList) -> Result<(), StoreError>;

    fn delete(&self, path: &Path) -> Result<(), StoreError>;
}
