//! Webhook log model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::webhook_logs;
use crate::types::{HasCreatedAt, WebhookLogSource};

/// Audit record of a single inbound webhook delivery attempt, successful or
/// not. `processed = false` rows always carry an `error`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = webhook_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookLog {
    /// Unique log identifier.
    pub id: Uuid,
    /// Trigger this delivery targeted.
    pub trigger_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Why this row was written (ingress, duplicate, signature rejection).
    pub source: WebhookLogSource,
    /// Whether the delivery was accepted and enqueued.
    pub processed: bool,
    /// SHA-256 digest of the raw request body.
    pub payload_digest: String,
    /// Rejection reason, set whenever `processed = false`.
    pub error: Option<String>,
    /// Execution enqueued as a result of this delivery, if any.
    pub execution_id: Option<Uuid>,
    /// Timestamp the delivery was received.
    pub received_at: Timestamp,
}

/// Data for creating a new webhook log entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhookLog {
    /// Trigger this delivery targeted.
    pub trigger_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Why this row was written.
    pub source: WebhookLogSource,
    /// Whether the delivery was accepted and enqueued.
    pub processed: bool,
    /// SHA-256 digest of the raw request body.
    pub payload_digest: String,
    /// Rejection reason.
    pub error: Option<String>,
    /// Execution enqueued as a result of this delivery, if any.
    pub execution_id: Option<Uuid>,
}

impl WebhookLog {
    /// Returns whether the delivery was rejected.
    pub fn is_rejected(&self) -> bool {
        !self.processed
    }
}

impl HasCreatedAt for WebhookLog {
    fn created_at(&self) -> jiff::Timestamp {
        self.received_at.into()
    }
}
