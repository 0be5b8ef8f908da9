//! Generic cursor-paginated response envelope for listing endpoints.

use loom_postgres::types::CursorPage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A page of `T`, mirroring [`CursorPage`] with a client-facing shape.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total count of matching items, present only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Cursor to fetch the next page, present only when more items exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> From<CursorPage<T>> for Page<T> {
    fn from(page: CursorPage<T>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            next_cursor: page.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_cursor_page() {
        let cursor_page = CursorPage {
            items: vec![1, 2, 3],
            total: Some(3),
            next_cursor: None,
        };

        let page: Page<i32> = cursor_page.into();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total, Some(3));
        assert!(page.next_cursor.is_none());
    }
}
