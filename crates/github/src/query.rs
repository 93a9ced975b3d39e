//! GraphQL query text for the two board reads.
//!
//! User-supplied values are embedded as GraphQL string literals. JSON string
//! escaping is a valid subset of GraphQL string escaping, so `serde_json` does
//! the quoting.

use serde::Serialize;

/// Number of projects and board items requested per query. Further pages are
/// not fetched.
pub const PAGE_SIZE: u32 = 20;

/// Number of field values requested per item.
const FIELD_VALUES: u32 = 8;

/// Request body sent to the GraphQL endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a> {
    pub query: &'a str,
}

/// Quotes and escapes `value` as a GraphQL string literal.
pub(crate) fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Lists the projects owned by a user.
pub(crate) fn list_projects(username: &str) -> String {
    format!(
        "{{ user(login: {login}) {{ projectsV2(first: {PAGE_SIZE}) {{ \
         pageInfo {{ hasNextPage }} nodes {{ id title number url }} }} }} }}",
        login = string_literal(username),
    )
}

/// Fetches one board's items with their field values and content.
pub(crate) fn board_items(project_id: &str) -> String {
    const FIELD_NAME: &str = "field { ... on ProjectV2FieldCommon { name } }";
    format!(
        "query {{ node(id: {id}) {{ ... on ProjectV2 {{ items(first: {PAGE_SIZE}) {{ \
         pageInfo {{ hasNextPage }} nodes {{ id fieldValues(first: {FIELD_VALUES}) {{ nodes {{ \
         ... on ProjectV2ItemFieldTextValue {{ text {FIELD_NAME} }} \
         ... on ProjectV2ItemFieldDateValue {{ date {FIELD_NAME} }} \
         ... on ProjectV2ItemFieldSingleSelectValue {{ name {FIELD_NAME} }} }} }} \
         content {{ ... on DraftIssue {{ title body }} ... on Issue {{ title body }} \
         ... on PullRequest {{ title body }} }} }} }} }} }} }}",
        id = string_literal(project_id),
    )
}
