//! Trigger status enumeration reporting a trigger's last run outcome.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Corresponds to the `TRIGGER_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::TriggerStatus"]
pub enum TriggerStatus {
    /// No poll or delivery has been recorded yet.
    #[db_rename = "unknown"]
    #[serde(rename = "unknown")]
    #[default]
    Unknown,

    /// The trigger's last poll or delivery succeeded.
    #[db_rename = "ok"]
    #[serde(rename = "ok")]
    Ok,

    /// The trigger's last poll or delivery failed.
    #[db_rename = "error"]
    #[serde(rename = "error")]
    Error,
}

impl TriggerStatus {
    /// Returns whether the last run was successful.
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, TriggerStatus::Ok)
    }
}
