//! Trigger kind enumeration distinguishing webhook- and polling-driven triggers.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Corresponds to the `TRIGGER_KIND` PostgreSQL enum.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::TriggerKind"]
pub enum TriggerKind {
    /// Fires when an inbound HTTP request is routed to the trigger's endpoint.
    #[db_rename = "webhook"]
    #[serde(rename = "webhook")]
    Webhook,

    /// Fires on a schedule, polling a connector for new events.
    #[db_rename = "polling"]
    #[serde(rename = "polling")]
    Polling,
}

impl TriggerKind {
    /// Returns whether this trigger is webhook-driven.
    #[inline]
    pub fn is_webhook(self) -> bool {
        matches!(self, TriggerKind::Webhook)
    }

    /// Returns whether this trigger is poll-driven.
    #[inline]
    pub fn is_polling(self) -> bool {
        matches!(self, TriggerKind::Polling)
    }
}
