//! Core domain for taskboard.
//!
//! This crate contains the task-list model, the remote board types, the
//! normalisation and reconciliation logic of a GitHub pull, and the port traits
//! that infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `github` and `store` define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectId`, `ItemId`, `Username`, `RequestId`) |
//! | [`types`] | `Progress`, remote board records, `Timestamp` |
//! | [`task_list`] | `TaskList`, `Task` and their editing operations |
//! | [`errors`] | `RemoteError`, `StoreError`, `TaskListError`, `SyncError` |
//! | [`ports`] | `RemoteBoard` and `TaskListStore` traits |
//! | [`normalize`] | grouping of board items into columns |
//! | [`reconcile`] | pulling a board into a directory of task lists |

pub mod errors;
pub mod identifiers;
pub mod normalize;
pub mod ports;
pub mod reconcile;
pub mod task_list;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RemoteError, StoreError, SyncError, TaskListError};
pub use identifiers::{ItemId, ProjectId, RequestId, Username};
pub use normalize::group_by_column;
pub use ports::{RemoteBoard, StoredTaskList, TaskListStore};
pub use reconcile::{reconcile, ReconcileReport};
pub use task_list::{BulletPoint, Reference, Task, TaskList, DEFAULT_TASK_TITLE};
pub use types::{
    BoardItems, BoardSnapshot, Progress, RemoteBoardColumn, RemoteColumnItem, RemoteItem,
    RemoteProjectHeader, Timestamp, UNTRACKED_PROGRESS,
};
