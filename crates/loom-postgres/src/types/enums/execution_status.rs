//! Execution status enumeration tracking a workflow run's lifecycle.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Corresponds to the `EXECUTION_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ExecutionStatus"]
pub enum ExecutionStatus {
    /// Queued, not yet picked up by a worker.
    #[db_rename = "queued"]
    #[serde(rename = "queued")]
    #[default]
    Queued,

    /// Actively being walked by the runtime.
    #[db_rename = "running"]
    #[serde(rename = "running")]
    Running,

    /// Parked at a Wait node pending a resume token.
    #[db_rename = "suspended"]
    #[serde(rename = "suspended")]
    Suspended,

    /// Finished with every node either succeeding or routed around via an
    /// `onError` edge.
    #[db_rename = "succeeded"]
    #[serde(rename = "succeeded")]
    Succeeded,

    /// Terminated by an unrecoverable node error or exhausted retries.
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,

    /// Terminated after running past its configured execution timeout.
    #[db_rename = "timed_out"]
    #[serde(rename = "timed_out")]
    TimedOut,

    /// Cancelled by an operator before completion.
    #[db_rename = "cancelled"]
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl ExecutionStatus {
    /// Returns whether this status is terminal (no further transitions).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded
                | ExecutionStatus::Failed
                | ExecutionStatus::TimedOut
                | ExecutionStatus::Cancelled
        )
    }

    /// Returns whether the execution is eligible for a manual retry.
    #[inline]
    pub fn is_retryable(self) -> bool {
        matches!(self, ExecutionStatus::Failed | ExecutionStatus::TimedOut)
    }
}
