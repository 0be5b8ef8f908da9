//! Workflow execution model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::workflow_executions;
use crate::types::{ExecutionStatus, HasCreatedAt, HasUpdatedAt};

/// A single run of a workflow version against a specific trigger payload.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workflow_executions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowExecution {
    /// Unique execution identifier.
    pub id: Uuid,
    /// Workflow this execution belongs to.
    pub workflow_id: Uuid,
    /// Specific version executed.
    pub workflow_version_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Trigger that enqueued this execution, if any (manual executions have none).
    pub trigger_id: Option<Uuid>,
    /// Current lifecycle status.
    pub status: ExecutionStatus,
    /// Queue priority class (`default`, `manual`, `resume`).
    pub priority: String,
    /// Current attempt number, starting at 1.
    pub attempt: i32,
    /// Payload that initiated this execution.
    pub trigger_data: JsonValue,
    /// Captured output of each completed node, keyed by node id.
    pub node_outputs: JsonValue,
    /// Failure reason, set only when `status = failed` or `timed_out`.
    pub error: Option<String>,
    /// Timestamp the execution began running.
    pub started_at: Option<Timestamp>,
    /// Timestamp the execution reached a terminal status.
    pub finished_at: Option<Timestamp>,
    /// Timestamp the execution was enqueued.
    pub created_at: Timestamp,
    /// Timestamp of the last status transition.
    pub updated_at: Timestamp,
}

/// Data for creating a new workflow execution.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflow_executions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflowExecution {
    /// Workflow this execution belongs to.
    pub workflow_id: Uuid,
    /// Specific version to execute.
    pub workflow_version_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Trigger that enqueued this execution, if any.
    pub trigger_id: Option<Uuid>,
    /// Queue priority class.
    pub priority: String,
    /// Payload that initiated this execution.
    pub trigger_data: JsonValue,
}

/// Data for updating a workflow execution's lifecycle state.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workflow_executions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkflowExecution {
    /// Current lifecycle status.
    pub status: Option<ExecutionStatus>,
    /// Current attempt number.
    pub attempt: Option<i32>,
    /// Captured output of each completed node.
    pub node_outputs: Option<JsonValue>,
    /// Failure reason.
    pub error: Option<Option<String>>,
    /// Timestamp the execution began running.
    pub started_at: Option<Option<Timestamp>>,
    /// Timestamp the execution reached a terminal status.
    pub finished_at: Option<Option<Timestamp>>,
}

impl WorkflowExecution {
    /// Returns whether the execution has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns whether the execution is currently suspended awaiting a resume token.
    pub fn is_suspended(&self) -> bool {
        matches!(self.status, ExecutionStatus::Suspended)
    }
}

impl HasCreatedAt for WorkflowExecution {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for WorkflowExecution {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
