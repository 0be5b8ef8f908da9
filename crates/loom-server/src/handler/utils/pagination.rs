//! Query-string pagination parameters shared by listing endpoints.

use loom_postgres::types::CursorPagination;
use schemars::JsonSchema;
use serde::Deserialize;

/// Cursor pagination parameters as they arrive on the query string.
///
/// Deserializes `limit`, `cursor` and `count` query parameters and converts
/// them into a [`CursorPagination`] for the repository layer. An absent or
/// malformed `cursor` simply starts from the beginning of the result set.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Opaque cursor returned by a previous page's `nextCursor`.
    pub cursor: Option<String>,
    /// Whether to include the total matching count in the response.
    #[serde(default)]
    pub count: bool,
}

fn default_limit() -> i64 {
    50
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: default_limit(), cursor: None, count: false }
    }
}

impl Pagination {
    /// Converts these query parameters into repository-layer pagination.
    pub fn into_cursor_pagination(self) -> CursorPagination {
        let pagination = CursorPagination::from_cursor_string(self.limit, self.cursor.as_deref());
        if self.count {
            pagination.with_count()
        } else {
            pagination
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pagination_has_sensible_limit() {
        let pagination = Pagination::default().into_cursor_pagination();
        assert_eq!(pagination.limit, 50);
        assert!(!pagination.has_cursor());
    }

    #[test]
    fn invalid_cursor_starts_from_beginning() {
        let query = Pagination { limit: 10, cursor: Some("not-a-cursor".into()), count: false };
        let pagination = query.into_cursor_pagination();
        assert!(!pagination.has_cursor());
    }
}
