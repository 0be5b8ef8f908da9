//! Dedupe entry model for PostgreSQL database operations.
//!
//! Mirrors scope membership from the JetStream KV dedupe store so the
//! per-scope 500-entry cap and oldest-eviction policy can be enforced with
//! an ordinary `ORDER BY created_at` query, which the KV bucket cannot
//! express on its own.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::dedupe_entries;
use crate::types::HasExpiresAt;

/// A single `(scope, token)` membership row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = dedupe_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DedupeEntry {
    /// Unique row identifier.
    pub id: Uuid,
    /// Dedupe scope, e.g. a trigger or webhook id.
    pub scope: String,
    /// Deduplication token, unique within `scope`.
    pub token: String,
    /// Timestamp the entry was recorded.
    pub created_at: Timestamp,
    /// Timestamp after which the entry is no longer considered a duplicate.
    pub expires_at: Timestamp,
}

/// Data for recording a new dedupe entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dedupe_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDedupeEntry {
    /// Dedupe scope.
    pub scope: String,
    /// Deduplication token.
    pub token: String,
    /// Timestamp after which the entry is no longer considered a duplicate.
    pub expires_at: Timestamp,
}

impl HasExpiresAt for DedupeEntry {
    fn expires_at(&self) -> Option<jiff::Timestamp> {
        Some(self.expires_at.into())
    }
}
