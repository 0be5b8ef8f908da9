//! Scheduler lock model for PostgreSQL database operations.
//!
//! Backs the relational distributed-lock strategy: `acquire` is an
//! `INSERT ... ON CONFLICT DO NOTHING`, `renew` an `UPDATE ... WHERE owner_id = ?`.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::scheduler_locks;
use crate::types::HasExpiresAt;

/// A held lease over a named resource, used to ensure at most one process
/// runs a given scheduler loop at a time.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = scheduler_locks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SchedulerLock {
    /// Name of the locked resource.
    pub resource: String,
    /// Opaque identifier of the lease holder.
    pub owner_id: String,
    /// Timestamp after which the lease is considered abandoned.
    pub expires_at: Timestamp,
}

/// Data for creating (acquiring) a new scheduler lock.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scheduler_locks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSchedulerLock {
    /// Name of the resource to lock.
    pub resource: String,
    /// Opaque identifier of the lease holder.
    pub owner_id: String,
    /// Timestamp after which the lease is considered abandoned.
    pub expires_at: Timestamp,
}

impl HasExpiresAt for SchedulerLock {
    fn expires_at(&self) -> Option<jiff::Timestamp> {
        Some(self.expires_at.into())
    }
}
