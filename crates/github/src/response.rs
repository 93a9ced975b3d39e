//! Decoding of GraphQL responses into board records.

use board::{ItemId, ProjectId, RemoteError, RemoteItem, RemoteProjectHeader};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

impl<T> GraphqlResponse<T> {
    /// Returns the payload, or the query errors when the service reported any.
    pub fn into_data(self) -> Result<T, RemoteError> {
        if !self.errors.is_empty() {
            return Err(RemoteError::Query {
                messages: self.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        self.data.ok_or_else(|| parse_error("response has no data"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Connection<T> {
    #[serde(default)]
    nodes: Vec<Option<T>>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
}

impl<T> Connection<T> {
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }

    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// Project list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    user: Option<UserProjects>,
}

#[derive(Debug, Deserialize)]
struct UserProjects {
    #[serde(rename = "projectsV2")]
    projects: Connection<ProjectNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    id: String,
    title: String,
    number: u32,
    url: String,
}

impl ProjectsData {
    /// Returns the project headers and whether more projects exist remotely.
    pub fn into_headers(self) -> Result<(Vec<RemoteProjectHeader>, bool), RemoteError> {
        let projects = self.user.ok_or_else(|| parse_error("user not found"))?.projects;
        let truncated = projects.has_next_page();
        let headers = projects
            .into_nodes()
            .map(|node| {
                Ok(RemoteProjectHeader {
                    id: ProjectId::new(node.id).ok_or_else(|| parse_error("empty project id"))?,
                    title: node.title,
                    number: node.number,
                    url: node.url,
                })
            })
            .collect::<Result<Vec<_>, RemoteError>>()?;
        Ok((headers, truncated))
    }
}

// ---------------------------------------------------------------------------
// Board items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct BoardData {
    node: Option<ProjectItems>,
}

#[derive(Debug, Deserialize)]
struct ProjectItems {
    items: Connection<ItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemNode {
    id: String,
    field_values: Connection<FieldValue>,
    content: Option<Content>,
}

/// One field value of an item. Only single-select values carry `name`; text
/// and date values decode with `name` unset.
#[derive(Debug, Deserialize)]
struct FieldValue {
    name: Option<String>,
    field: Option<FieldRef>,
}

#[derive(Debug, Deserialize)]
struct FieldRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    title: Option<String>,
    body: Option<String>,
}

impl BoardData {
    /// Flattens the board into items, reading each item's column from the
    /// single-select field named `column_field`. Returns the items and whether
    /// more items exist remotely.
    pub fn into_items(self, column_field: &str) -> Result<(Vec<RemoteItem>, bool), RemoteError> {
        let items = self
            .node
            .ok_or_else(|| parse_error("project not found"))?
            .items;
        let truncated = items.has_next_page();
        let items = items
            .into_nodes()
            .map(|node| node.into_item(column_field))
            .collect::<Result<Vec<_>, RemoteError>>()?;
        Ok((items, truncated))
    }
}

impl ItemNode {
    fn into_item(self, column_field: &str) -> Result<RemoteItem, RemoteError> {
        let column = self
            .field_values
            .into_nodes()
            .find(|value| {
                value.name.is_some()
                    && value
                        .field
                        .as_ref()
                        .and_then(|f| f.name.as_deref())
                        .is_some_and(|name| name == column_field)
            })
            .and_then(|value| value.name)
            .unwrap_or_default();
        let (name, body) = match self.content {
            Some(content) => (
                content.title.unwrap_or_default(),
                content.body.unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        Ok(RemoteItem {
            id: ItemId::new(self.id).ok_or_else(|| parse_error("empty item id"))?,
            name,
            body,
            column,
        })
    }
}

pub(crate) fn parse_error(message: impl Into<String>) -> RemoteError {
    RemoteError::Parse {
        message: message.into(),
    }
}
