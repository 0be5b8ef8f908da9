//! Execution response types.

use jiff::Timestamp;
use loom_postgres::model::WorkflowExecution;
use loom_postgres::types::ExecutionStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::Page;

/// A single workflow run, as returned by the executions endpoints.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub workflow_version_id: Uuid,
    pub organization_id: Uuid,
    pub trigger_id: Option<Uuid>,
    pub status: ExecutionStatus,
    pub priority: String,
    pub attempt: i32,
    pub trigger_data: JsonValue,
    pub node_outputs: JsonValue,
    pub error: Option<String>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Execution {
    pub fn from_model(model: WorkflowExecution) -> Self {
        Self {
            id: model.id,
            workflow_id: model.workflow_id,
            workflow_version_id: model.workflow_version_id,
            organization_id: model.organization_id,
            trigger_id: model.trigger_id,
            status: model.status,
            priority: model.priority,
            attempt: model.attempt,
            trigger_data: model.trigger_data,
            node_outputs: model.node_outputs,
            error: model.error,
            started_at: model.started_at.map(Into::into),
            finished_at: model.finished_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

pub type ExecutionsPage = Page<Execution>;

/// Acknowledgement returned when an execution is created, retried, or
/// resumed: the caller tracks the run via `GET /executions/{id}`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionAck {
    pub execution_id: Uuid,
}

impl ExecutionAck {
    pub fn new(execution_id: Uuid) -> Self {
        Self { execution_id }
    }
}
