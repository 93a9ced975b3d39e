//! Error types for the taskboard domain.
//!
//! The port traits in [`crate::ports`] return [`RemoteError`] and
//! [`StoreError`]; infrastructure crates map their transport and file-system
//! failures onto these. [`SyncError`] is what a pull surfaces to its caller.
//!
//! No operation is retried. Every error is terminal for the operation that
//! produced it and the user re-triggers it manually.

use std::path::PathBuf;

use thiserror::Error;

use crate::RequestId;

// ---------------------------------------------------------------------------
// Remote board errors
// ---------------------------------------------------------------------------

/// Failures talking to the remote board service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with a non-OK HTTP status.
    ///
    /// Authentication failures (`401`, `403`) arrive here; the numeric status
    /// is kept so it can be shown to the user.
    #[error("GitHub returned status {status}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("request to GitHub failed: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("unexpected GitHub response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },

    /// The request task ended without a result (it panicked or was cancelled).
    #[error("request to GitHub did not complete: {message}")]
    Interrupted {
        /// Why the task ended.
        message: String,
    },

    /// The service accepted the request but the GraphQL query failed.
    #[error("GitHub query failed: {}", messages.join("; "))]
    Query {
        /// Messages from the response's `errors` array.
        messages: Vec<String>,
    },
}

impl RemoteError {
    /// Returns the HTTP status for [`RemoteError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Local store errors
// ---------------------------------------------------------------------------

/// Failures of the local task-list store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file-system operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold a valid task list.
    #[error("{} is not a valid task list: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// A task list with the same file name already exists.
    #[error("task list already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// No task list with the given title or path exists.
    #[error("task list not found: {name}")]
    NotFound { name: String },
}

// ---------------------------------------------------------------------------
// Task list editing errors
// ---------------------------------------------------------------------------

/// Failures of in-memory task-list edits.
#[derive(Debug, Error, PartialEq)]
pub enum TaskListError {
    #[error("task {index} does not exist (list has {len} tasks)")]
    TaskOutOfRange { index: usize, len: usize },

    #[error("bullet point {index} does not exist (task has {len} bullet points)")]
    BulletOutOfRange { index: usize, len: usize },

    #[error("progress must be within [0, 1], got {value}")]
    InvalidProgress { value: f32 },

    /// Imported JSON could not be applied to the list.
    #[error("cannot import task list: {message}")]
    Import { message: String },
}

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a sync session or a pull.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another remote request is still outstanding.
    #[error("a request is already in flight ({pending})")]
    Busy { pending: RequestId },

    /// Waiting for a response while no request is outstanding.
    #[error("no request is outstanding")]
    Idle,

    /// No target directory has been chosen for the pull.
    #[error("select a directory first")]
    NoDirectorySelected,

    /// The chosen target directory does not exist.
    #[error("select a directory first: {} does not exist", path.display())]
    MissingDirectory { path: PathBuf },

    /// A pull was confirmed before any board was fetched.
    #[error("no board has been fetched")]
    NothingFetched,

    /// The session has no GitHub username or token.
    #[error("GitHub username and token are required")]
    MissingCredentials,

    /// A project was requested by index but no such project was listed.
    #[error("no project at position {index}")]
    UnknownProject { index: usize },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
