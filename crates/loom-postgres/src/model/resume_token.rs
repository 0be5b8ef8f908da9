//! Resume token model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::resume_tokens;
use crate::types::HasExpiresAt;

/// A single-use token minted by a `wait` node, redeemable to resume a
/// suspended execution at that node.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = resume_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResumeToken {
    /// Unique token identifier, used as the bearer token value.
    pub id: Uuid,
    /// Execution this token resumes.
    pub execution_id: Uuid,
    /// Node at which the execution will resume.
    pub node_id: String,
    /// Opaque payload delivered back to the node on resume.
    pub payload: JsonValue,
    /// Timestamp when the token was minted.
    pub created_at: Timestamp,
    /// Timestamp after which the token can no longer be redeemed.
    pub expires_at: Timestamp,
    /// Timestamp the token was redeemed, if it has been.
    pub consumed_at: Option<Timestamp>,
}

/// Data for creating a new resume token.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resume_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewResumeToken {
    /// Execution this token resumes.
    pub execution_id: Uuid,
    /// Node at which the execution will resume.
    pub node_id: String,
    /// Opaque payload delivered back to the node on resume.
    pub payload: JsonValue,
    /// Timestamp after which the token can no longer be redeemed.
    pub expires_at: Timestamp,
}

impl ResumeToken {
    /// Returns whether the token has already been redeemed.
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

impl HasExpiresAt for ResumeToken {
    fn expires_at(&self) -> Option<jiff::Timestamp> {
        Some(self.expires_at.into())
    }
}
