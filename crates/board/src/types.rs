//! Shared value types for the taskboard domain.
//!
//! Remote types mirror what the GitHub Projects API returns after decoding;
//! they are transient and rebuilt on every fetch. Local types live in
//! [`crate::task_list`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ItemId, ProjectId};

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// On-disk value meaning "this task does not track progress".
pub const UNTRACKED_PROGRESS: f32 = -1.0;

/// Completion of a single task.
///
/// Persisted as one float: a value in `[0.0, 1.0]`, or [`UNTRACKED_PROGRESS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum Progress {
    /// Fraction complete in `[0.0, 1.0]`.
    Tracked(f32),
    /// The task has no progress indicator.
    Untracked,
}

impl Progress {
    /// Progress of a task that has not been started.
    pub const NOT_STARTED: Self = Self::Tracked(0.0);
    /// Progress of a finished task.
    pub const DONE: Self = Self::Tracked(1.0);

    /// Creates a tracked progress value, returning `None` if `value` is
    /// outside `[0.0, 1.0]` or not finite.
    #[must_use]
    pub fn tracked(value: f32) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Self::Tracked(value))
        } else {
            None
        }
    }

    /// Returns the tracked fraction, or `None` for untracked tasks.
    pub fn fraction(self) -> Option<f32> {
        match self {
            Self::Tracked(v) => Some(v),
            Self::Untracked => None,
        }
    }

    /// Returns `true` when the task is tracked and complete.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Tracked(v) if v >= 1.0)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::NOT_STARTED
    }
}

impl TryFrom<f32> for Progress {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value == UNTRACKED_PROGRESS {
            return Ok(Self::Untracked);
        }
        Self::tracked(value).ok_or_else(|| {
            format!("progress must be within [0, 1] or {UNTRACKED_PROGRESS}, got {value}")
        })
    }
}

impl From<Progress> for f32 {
    fn from(progress: Progress) -> Self {
        progress.fraction().unwrap_or(UNTRACKED_PROGRESS)
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tracked(v) => write!(f, "{}%", (v * 100.0) as u32),
            Self::Untracked => write!(f, "-"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote board types
// ---------------------------------------------------------------------------

/// A project board visible to a GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProjectHeader {
    /// Node id used to fetch the board's items.
    pub id: ProjectId,
    /// Human-readable board title.
    pub title: String,
    /// Per-owner project number (the `N` in `/projects/N`).
    pub number: u32,
    /// Web URL of the board.
    pub url: String,
}

/// One board item before grouping by column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: ItemId,
    /// Title of the item's content.
    pub name: String,
    /// Body of the item's content; empty when the content has none.
    pub body: String,
    /// Value of the board's column field; empty when unset.
    pub column: String,
}

/// An item as it appears inside a [`RemoteBoardColumn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteColumnItem {
    pub id: ItemId,
    pub name: String,
    pub body: String,
}

impl From<RemoteItem> for RemoteColumnItem {
    fn from(item: RemoteItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            body: item.body,
        }
    }
}

/// One kanban column of a remote board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBoardColumn {
    pub name: String,
    pub items: Vec<RemoteColumnItem>,
}

/// The flat result of fetching one board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardItems {
    /// Items in the order the remote returned them.
    pub items: Vec<RemoteItem>,
    /// `true` when the remote holds more items than were fetched.
    pub truncated: bool,
}

/// A fetched board, grouped into columns, waiting to be pulled.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub project_id: ProjectId,
    pub columns: Vec<RemoteBoardColumn>,
    pub truncated: bool,
    pub fetched_at: Timestamp,
}

impl BoardSnapshot {
    /// Total number of items across all columns.
    pub fn item_count(&self) -> usize {
        self.columns.iter().map(|c| c.items.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
