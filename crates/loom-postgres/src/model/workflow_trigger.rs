//! Workflow trigger model for PostgreSQL database operations.
//!
//! A trigger row is the durable half of a [`crate::types::TriggerKind`]:
//! webhook triggers carry an `endpoint`/`secret`, polling triggers carry an
//! `interval_seconds`/`next_poll_at`/`cursor`/`backoff_count`.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::workflow_triggers;
use crate::types::{HasCreatedAt, HasUpdatedAt, TriggerKind, TriggerStatus};

/// Workflow trigger model.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workflow_triggers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowTrigger {
    /// Unique trigger identifier.
    pub id: Uuid,
    /// Owning workflow.
    pub workflow_id: Uuid,
    /// Owning organization (denormalized for scoped queries).
    pub organization_id: Uuid,
    /// Webhook vs. polling.
    pub kind: TriggerKind,
    /// Connector application identifier.
    pub app_id: String,
    /// Connector-specific trigger identifier (e.g. channel, repo, endpoint name).
    pub trigger_id: String,
    /// Public webhook endpoint path, set only for `kind = webhook`.
    pub endpoint: Option<String>,
    /// Signing secret, set only for `kind = webhook`.
    pub secret: Option<Vec<u8>>,
    /// Polling interval in seconds, set only for `kind = polling`.
    pub interval_seconds: Option<i32>,
    /// Next scheduled poll time, set only for `kind = polling`.
    pub next_poll_at: Option<Timestamp>,
    /// Last time this trigger polled or received a delivery.
    pub last_poll_at: Option<Timestamp>,
    /// Connector-opaque resumption cursor.
    pub cursor: Option<JsonValue>,
    /// Consecutive poll/delivery failure count, drives backoff.
    pub backoff_count: i32,
    /// Free-form trigger metadata.
    pub metadata: JsonValue,
    /// Whether the trigger accepts new deliveries/polls.
    pub is_active: bool,
    /// Result of the most recent poll or delivery attempt.
    pub last_status: TriggerStatus,
    /// Timestamp when the trigger was created.
    pub created_at: Timestamp,
    /// Timestamp when the trigger was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new workflow trigger.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflow_triggers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflowTrigger {
    /// Owning workflow.
    pub workflow_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Webhook vs. polling.
    pub kind: TriggerKind,
    /// Connector application identifier.
    pub app_id: String,
    /// Connector-specific trigger identifier.
    pub trigger_id: String,
    /// Public webhook endpoint path.
    pub endpoint: Option<String>,
    /// Signing secret.
    pub secret: Option<Vec<u8>>,
    /// Polling interval in seconds.
    pub interval_seconds: Option<i32>,
    /// First scheduled poll time.
    pub next_poll_at: Option<Timestamp>,
    /// Free-form trigger metadata.
    pub metadata: Option<JsonValue>,
}

/// Data for updating a workflow trigger. Used both by admin operations
/// (activate/deactivate) and by the runtime (cursor/backoff/poll bookkeeping).
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workflow_triggers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkflowTrigger {
    /// Next scheduled poll time.
    pub next_poll_at: Option<Option<Timestamp>>,
    /// Last time this trigger polled or received a delivery.
    pub last_poll_at: Option<Option<Timestamp>>,
    /// Connector-opaque resumption cursor.
    pub cursor: Option<Option<JsonValue>>,
    /// Consecutive poll/delivery failure count.
    pub backoff_count: Option<i32>,
    /// Whether the trigger accepts new deliveries/polls.
    pub is_active: Option<bool>,
    /// Result of the most recent poll or delivery attempt.
    pub last_status: Option<TriggerStatus>,
}

impl WorkflowTrigger {
    /// Returns whether this is a webhook-style trigger.
    pub fn is_webhook(&self) -> bool {
        matches!(self.kind, TriggerKind::Webhook)
    }

    /// Returns whether this is a polling-style trigger.
    pub fn is_polling(&self) -> bool {
        matches!(self.kind, TriggerKind::Polling)
    }

    /// Returns whether the trigger is due for a poll as of `now`.
    ///
    /// Always `false` for webhook triggers, which have no poll schedule.
    pub fn is_due(&self, now: jiff::Timestamp) -> bool {
        match self.next_poll_at {
            Some(next) => jiff::Timestamp::from(next) <= now,
            None => false,
        }
    }
}

impl HasCreatedAt for WorkflowTrigger {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for WorkflowTrigger {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
