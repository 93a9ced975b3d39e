//! Taskboard local storage adapter.
//!
//! Implements the [`board::TaskListStore`] port on the file system and keeps
//! the per-user preferences (active directories, GitHub credentials).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File naming, atomic writes, directory discovery and
//! preference encoding live here. The [`board`] crate only sees
//! [`board::TaskListStore`].

pub mod fs_store;
pub mod preferences;

pub use fs_store::{is_task_list_file, sanitize_file_stem, FsTaskListStore, TASK_LIST_SUFFIX};
pub use preferences::{
    GithubCredentials, PreferenceError, PreferenceStore, DIRECTORIES_KEY, GITHUB_KEY,
    PREFERENCES_FILE_MODE,
};
