//! Taskboard sync session.
//!
//! A [`SyncSession`] is the explicit state of one GitHub sync interaction:
//! credentials, the chosen target directory, the listed projects, the last
//! fetched board and the last error status. Front ends own a session and pass
//! it to whatever renders or drives it.
//!
//! ## Request flow
//!
//! Remote calls run as tokio tasks. Each `begin_*` method returns a
//! [`RequestId`] immediately; the response arrives later as a [`SyncEvent`] on
//! the session's channel and takes effect only when the owner calls
//! [`SyncSession::apply`] (or [`SyncSession::wait`]). At most one request is
//! outstanding at a time: starting another fails with [`SyncError::Busy`].
//! Responses to requests the session no longer waits for are dropped.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The session sequences calls between the
//! [`board::RemoteBoard`] port, the reconciliation logic in [`board`], and the
//! [`board::TaskListStore`] port. It contains no domain rules of its own.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use board::{
    group_by_column, reconcile, BoardItems, BoardSnapshot, ProjectId, ReconcileReport,
    RemoteBoard, RemoteError, RemoteProjectHeader, RequestId, SyncError, TaskListStore, Timestamp,
    Username,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Login used for remote calls.
#[derive(Clone)]
pub struct Credentials {
    pub username: Username,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A completed remote request.
#[derive(Debug)]
pub enum SyncEvent {
    Projects {
        request: RequestId,
        result: Result<Vec<RemoteProjectHeader>, RemoteError>,
    },
    Board {
        request: RequestId,
        project: ProjectId,
        result: Result<BoardItems, RemoteError>,
    },
}

impl SyncEvent {
    pub fn request(&self) -> RequestId {
        match self {
            Self::Projects { request, .. } | Self::Board { request, .. } => *request,
        }
    }
}

/// What applying an event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The project list was replaced; holds its length.
    Projects(usize),
    /// A board snapshot is ready to pull.
    Board { items: usize, truncated: bool },
    /// The event answered a request the session no longer waits for.
    Stale,
}

/// State of one sync interaction.
pub struct SyncSession {
    remote: Arc<dyn RemoteBoard>,
    credentials: Option<Credentials>,
    directory: Option<PathBuf>,
    projects: Option<Vec<RemoteProjectHeader>>,
    snapshot: Option<BoardSnapshot>,
    error_status: Option<u16>,
    pending: Option<RequestId>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
    events_rx: mpsc::UnboundedReceiver<SyncEvent>,
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("credentials", &self.credentials)
            .field("directory", &self.directory)
            .field("projects", &self.projects.as_ref().map(Vec::len))
            .field("snapshot", &self.snapshot.as_ref().map(BoardSnapshot::item_count))
            .field("error_status", &self.error_status)
            .field("pending", &self.pending)
            .finish()
    }
}

impl SyncSession {
    pub fn new(remote: Arc<dyn RemoteBoard>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            remote,
            credentials: None,
            directory: None,
            projects: None,
            snapshot: None,
            error_status: None,
            pending: None,
            events_tx,
            events_rx,
        }
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Chooses the directory a pull writes into.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = Some(directory.into());
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn projects(&self) -> Option<&[RemoteProjectHeader]> {
        self.projects.as_deref()
    }

    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    /// HTTP status of the last failed request, cleared by the next success.
    pub fn error_status(&self) -> Option<u16> {
        self.error_status
    }

    /// Web URL of a listed project.
    pub fn project_url(&self, index: usize) -> Result<&str, SyncError> {
        self.projects
            .as_ref()
            .and_then(|p| p.get(index))
            .map(|p| p.url.as_str())
            .ok_or(SyncError::UnknownProject { index })
    }

    fn start(&mut self) -> Result<(RequestId, Credentials), SyncError> {
        if let Some(pending) = self.pending {
            return Err(SyncError::Busy { pending });
        }
        let credentials = self
            .credentials
            .clone()
            .filter(|c| !c.token.is_empty())
            .ok_or(SyncError::MissingCredentials)?;
        let request = RequestId::new_random();
        self.pending = Some(request);
        Ok((request, credentials))
    }

    /// Runs `call` on its own task and always reports back through the event
    /// channel: a call that panics or is cancelled becomes
    /// [`RemoteError::Interrupted`], so the busy guard is always released.
    fn spawn_request<T, F, E>(&self, call: F, into_event: E)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, RemoteError>> + Send + 'static,
        E: FnOnce(Result<T, RemoteError>) -> SyncEvent + Send + 'static,
    {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(call).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "remote request task failed");
                    Err(RemoteError::Interrupted {
                        message: e.to_string(),
                    })
                }
            };
            // The receiver lives as long as the session; a send error only
            // means the session is gone.
            let _ = events.send(into_event(result));
        });
    }

    /// Starts listing the user's projects. Must be called inside a tokio
    /// runtime.
    pub fn begin_list_projects(&mut self) -> Result<RequestId, SyncError> {
        let (request, credentials) = self.start()?;
        let remote = Arc::clone(&self.remote);
        debug!(%request, username = %credentials.username, "listing projects");
        self.spawn_request(
            async move {
                remote
                    .list_projects(&credentials.username, &credentials.token)
                    .await
            },
            move |result| SyncEvent::Projects { request, result },
        );
        Ok(request)
    }

    /// Starts fetching one board's items. Must be called inside a tokio
    /// runtime.
    pub fn begin_fetch_board(&mut self, project: ProjectId) -> Result<RequestId, SyncError> {
        let (request, credentials) = self.start()?;
        let remote = Arc::clone(&self.remote);
        debug!(%request, %project, "fetching board");
        let target = project.clone();
        self.spawn_request(
            async move { remote.fetch_board_items(&target, &credentials.token).await },
            move |result| SyncEvent::Board {
                request,
                project,
                result,
            },
        );
        Ok(request)
    }

    /// Starts fetching the board at `index` in the listed projects.
    pub fn begin_fetch_board_at(&mut self, index: usize) -> Result<RequestId, SyncError> {
        let project = self
            .projects
            .as_ref()
            .and_then(|p| p.get(index))
            .map(|p| p.id.clone())
            .ok_or(SyncError::UnknownProject { index })?;
        self.begin_fetch_board(project)
    }

    /// Waits for the next completed request.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events_rx.recv().await
    }

    /// Returns a completed request if one is ready, without waiting.
    pub fn try_next_event(&mut self) -> Option<SyncEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Folds a completed request into the session state.
    ///
    /// A failed request clears the matching cached result; an HTTP status
    /// failure also records the status code.
    pub fn apply(&mut self, event: SyncEvent) -> Result<Applied, SyncError> {
        if self.pending != Some(event.request()) {
            debug!(request = %event.request(), "dropping stale response");
            return Ok(Applied::Stale);
        }
        self.pending = None;

        match event {
            SyncEvent::Projects { result, .. } => match result {
                Ok(projects) => {
                    self.error_status = None;
                    let count = projects.len();
                    self.projects = Some(projects);
                    Ok(Applied::Projects(count))
                }
                Err(e) => {
                    self.projects = None;
                    Err(self.record_failure(e))
                }
            },
            SyncEvent::Board {
                project, result, ..
            } => match result {
                Ok(board) => {
                    self.error_status = None;
                    let snapshot = BoardSnapshot {
                        project_id: project,
                        columns: group_by_column(board.items),
                        truncated: board.truncated,
                        fetched_at: Timestamp::now(),
                    };
                    let applied = Applied::Board {
                        items: snapshot.item_count(),
                        truncated: snapshot.truncated,
                    };
                    info!(
                        columns = snapshot.columns.len(),
                        items = snapshot.item_count(),
                        "items fetched"
                    );
                    self.snapshot = Some(snapshot);
                    Ok(applied)
                }
                Err(e) => {
                    self.snapshot = None;
                    Err(self.record_failure(e))
                }
            },
        }
    }

    fn record_failure(&mut self, error: RemoteError) -> SyncError {
        self.error_status = error.status();
        warn!(error = %error, "remote request failed");
        SyncError::Remote(error)
    }

    /// Waits for the outstanding request and applies its response.
    pub async fn wait(&mut self) -> Result<Applied, SyncError> {
        while self.pending.is_some() {
            let Some(event) = self.next_event().await else {
                break;
            };
            match self.apply(event)? {
                Applied::Stale => continue,
                applied => return Ok(applied),
            }
        }
        Err(SyncError::Idle)
    }

    /// Overwrites the chosen directory with the fetched board.
    ///
    /// Destructive: local-only lists in the directory are deleted and local
    /// task titles and descriptions are replaced. The snapshot is consumed on
    /// success.
    pub fn confirm_pull<S>(&mut self, store: &S) -> Result<ReconcileReport, SyncError>
    where
        S: TaskListStore + ?Sized,
    {
        if let Some(pending) = self.pending {
            return Err(SyncError::Busy { pending });
        }
        let directory = self.directory.clone().ok_or(SyncError::NoDirectorySelected)?;
        if !directory.is_dir() {
            return Err(SyncError::MissingDirectory { path: directory });
        }
        let snapshot = self.snapshot.as_ref().ok_or(SyncError::NothingFetched)?;
        if snapshot.truncated {
            warn!("pulling a truncated board; items beyond the first page are dropped");
        }

        let report = reconcile(store, &directory, &snapshot.columns)?;
        info!(
            created = report.created.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            directory = %directory.display(),
            "pull complete"
        );
        self.snapshot = None;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait::async_trait]
    impl RemoteBoard for Unreachable {
        async fn list_projects(
            &self,
            _: &Username,
            _: &str,
        ) -> Result<Vec<RemoteProjectHeader>, RemoteError> {
            unreachable!()
        }

        async fn fetch_board_items(&self, _: &ProjectId, _: &str) -> Result<BoardItems, RemoteError> {
            unreachable!()
        }
    }

    #[test]
    fn requests_need_credentials() {
        let mut session = SyncSession::new(Arc::new(Unreachable));
        assert!(matches!(
            session.begin_list_projects(),
            Err(SyncError::MissingCredentials)
        ));
        assert!(!session.is_busy());
    }

    #[test]
    fn pull_needs_a_directory_first() {
        let mut session = SyncSession::new(Arc::new(Unreachable));
        let store = store::FsTaskListStore::new(".");
        assert!(matches!(
            session.confirm_pull(&store),
            Err(SyncError::NoDirectorySelected)
        ));

        session.set_directory("/definitely/not/here");
        assert!(matches!(
            session.confirm_pull(&store),
            Err(SyncError::MissingDirectory { .. })
        ));
    }

    #[test]
    fn project_url_requires_listed_projects() {
        let session = SyncSession::new(Arc::new(Unreachable));
        assert!(matches!(
            session.project_url(0),
            Err(SyncError::UnknownProject { index: 0 })
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let credentials = Credentials {
            username: Username::new("octocat").unwrap(),
            token: "ghp_secret".into(),
        };
        assert!(!format!("{credentials:?}").contains("ghp_secret"));
    }
}
