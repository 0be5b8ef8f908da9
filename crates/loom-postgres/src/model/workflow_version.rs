//! Workflow version model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::workflow_versions;
use crate::types::HasCreatedAt;

/// Workflow version model. Versions are immutable once created; deploying a
/// workflow means pointing `workflows.active_version` at one of these rows.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workflow_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// Owning workflow.
    pub workflow_id: Uuid,
    /// Monotonically increasing version number, unique per workflow.
    pub number: i32,
    /// Serialized node/edge graph.
    pub graph: JsonValue,
    /// Timestamp when the version was created.
    pub created_at: Timestamp,
}

/// Data for creating a new workflow version.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflow_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflowVersion {
    /// Owning workflow.
    pub workflow_id: Uuid,
    /// Version number, unique per workflow.
    pub number: i32,
    /// Serialized node/edge graph.
    pub graph: JsonValue,
}

impl HasCreatedAt for WorkflowVersion {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}
