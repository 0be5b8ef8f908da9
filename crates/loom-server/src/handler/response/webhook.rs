//! Webhook ingress response type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /webhooks/{id}` response: the enqueued execution, or none if this
/// delivery was a duplicate and no execution was created.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub execution_id: Option<Uuid>,
}

impl WebhookAck {
    pub fn new(execution_id: Uuid) -> Self {
        Self { execution_id: Some(execution_id) }
    }

    pub fn duplicate() -> Self {
        Self { execution_id: None }
    }
}
