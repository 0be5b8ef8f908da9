//! Webhook log source enumeration distinguishing how a logged delivery was resolved.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Corresponds to the `WEBHOOK_LOG_SOURCE` PostgreSQL enum.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::WebhookLogSource"]
pub enum WebhookLogSource {
    /// Delivery was verified, deduped, and enqueued normally.
    #[db_rename = "ingress"]
    #[serde(rename = "ingress")]
    Ingress,

    /// Delivery was absorbed as a duplicate; no execution was enqueued.
    #[db_rename = "duplicate"]
    #[serde(rename = "duplicate")]
    Duplicate,

    /// Delivery was rejected during signature verification.
    #[db_rename = "signature_rejected"]
    #[serde(rename = "signature_rejected")]
    SignatureRejected,
}
