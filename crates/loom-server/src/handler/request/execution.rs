//! Execution request types.

use loom_nats::QueuePriority;
use loom_postgres::model::NewWorkflowExecution;
use loom_postgres::types::{CursorPagination, ExecutionStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// Request payload for a manual execution run.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExecution {
    /// Workflow to run.
    pub workflow_id: Uuid,
    /// Trigger payload handed to the first node. Defaults to `null`.
    pub trigger_data: Option<JsonValue>,
}

impl CreateExecution {
    /// Converts this request into a [`NewWorkflowExecution`] against a
    /// resolved `workflow_version_id`. Manual runs have no owning trigger.
    pub fn into_model(self, organization_id: Uuid, workflow_version_id: Uuid) -> NewWorkflowExecution {
        NewWorkflowExecution {
            workflow_id: self.workflow_id,
            workflow_version_id,
            organization_id,
            trigger_id: None,
            priority: QueuePriority::Manual.to_string(),
            trigger_data: self.trigger_data.unwrap_or(JsonValue::Null),
        }
    }
}

/// Query parameters accepted by `GET /executions`.
///
/// Pagination fields are inlined rather than composed via
/// [`super::super::utils::Pagination`] because query-string deserialization
/// does not support `#[serde(flatten)]` over a nested struct.
#[must_use]
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFilter {
    /// Restrict results to a single lifecycle status.
    pub status: Option<ExecutionStatus>,
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

impl ExecutionFilter {
    /// Converts the pagination portion of this filter into repository-layer
    /// pagination.
    pub fn into_cursor_pagination(&self) -> CursorPagination {
        let pagination = CursorPagination::from_cursor_string(self.limit, self.cursor.as_deref());
        if self.count {
            pagination.with_count()
        } else {
            pagination
        }
    }
}
