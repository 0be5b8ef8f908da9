//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters for webhook ingress: the trigger's public endpoint slug.
///
/// This is a bare string, not a UUID — endpoint values are operator-chosen
/// and unique across the whole deployment (see `workflow_triggers.endpoint`).
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPathParams {
    /// Public endpoint identifying the webhook trigger.
    pub id: String,
}

/// Path parameters for execution-scoped operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPathParams {
    /// Unique identifier of the execution.
    pub id: Uuid,
}

/// Path parameters for consuming a resume token.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumePathParams {
    /// Unique identifier of the suspended execution.
    pub exec_id: Uuid,
    /// Identifier of the node the execution is suspended at.
    pub node_id: String,
}
