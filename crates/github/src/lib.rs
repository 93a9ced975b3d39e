//! Taskboard GitHub infrastructure adapter.
//!
//! Implements the [`board::RemoteBoard`] port against the GitHub Projects (v2)
//! GraphQL API using [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Request
//! headers, query text and response decoding live here; the [`board`] crate
//! only sees [`board::RemoteProjectHeader`] and [`board::BoardItems`].
//!
//! ## Limits
//!
//! Each query asks for the first [`PAGE_SIZE`] projects or items. Further pages
//! are not fetched; truncation is logged and reported through
//! [`board::BoardItems::truncated`]. Requests are never retried and use the
//! transport's default timeout.

mod query;
mod response;

use async_trait::async_trait;
use board::{BoardItems, ProjectId, RemoteBoard, RemoteError, RemoteProjectHeader, Username};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

pub use query::PAGE_SIZE;

use crate::query::GraphqlRequest;
use crate::response::{parse_error, BoardData, GraphqlResponse, ProjectsData};

/// GitHub's GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// REST API version pinned through the `X-GitHub-Api-Version` header.
pub const API_VERSION: &str = "2022-11-28";

/// `User-Agent` sent with every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = "taskboard";

/// Name of the single-select field whose value becomes an item's column.
pub const DEFAULT_COLUMN_FIELD: &str = "Status";

/// Settings for [`GithubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// Board field that decides an item's column.
    pub column_field: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            column_field: DEFAULT_COLUMN_FIELD.to_string(),
        }
    }
}

/// GraphQL client for GitHub project boards.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteError::Network {
                message: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Posts one query and decodes the `data` payload.
    async fn post_query<T: DeserializeOwned>(&self, token: &str, query: &str) -> Result<T, RemoteError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&GraphqlRequest { query })
            .send()
            .await
            .map_err(|e| RemoteError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RemoteError::Network {
            message: e.to_string(),
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "GitHub responded");

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), %body, "GitHub rejected request");
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        serde_json::from_str::<GraphqlResponse<T>>(&body)
            .map_err(|e| parse_error(e.to_string()))?
            .into_data()
    }
}

#[async_trait]
impl RemoteBoard for GithubClient {
    #[instrument(skip_all, fields(%username))]
    async fn list_projects(
        &self,
        username: &Username,
        token: &str,
    ) -> Result<Vec<RemoteProjectHeader>, RemoteError> {
        let data: ProjectsData = self
            .post_query(token, &query::list_projects(username.as_str()))
            .await?;
        let (headers, truncated) = data.into_headers()?;
        if truncated {
            warn!(shown = headers.len(), "user has more projects than one page");
        }
        debug!(count = headers.len(), "listed projects");
        Ok(headers)
    }

    #[instrument(skip_all, fields(%project))]
    async fn fetch_board_items(
        &self,
        project: &ProjectId,
        token: &str,
    ) -> Result<BoardItems, RemoteError> {
        let data: BoardData = self
            .post_query(token, &query::board_items(project.as_str()))
            .await?;
        let (items, truncated) = data.into_items(&self.config.column_field)?;
        if truncated {
            warn!(
                fetched = items.len(),
                "board has more items than one page; the rest are not pulled"
            );
        }
        debug!(count = items.len(), "fetched board items");
        Ok(BoardItems { items, truncated })
    }
}
