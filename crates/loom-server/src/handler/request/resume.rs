//! Resume token consumption request type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request payload for consuming a resume token and continuing a suspended
/// execution.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResumeExecution {
    /// Identifier of the resume token to consume.
    pub token_id: Uuid,
    /// Hex-encoded HMAC signature minted alongside the token.
    pub signature: String,
}
