//! Worker heartbeat model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::worker_heartbeats;
use crate::types::HasLastActivityAt;

/// Most recent liveness signal from a worker process.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = worker_heartbeats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkerHeartbeat {
    /// Opaque worker identifier.
    pub worker_id: String,
    /// Worker kind, e.g. "execution", "polling".
    pub worker_type: String,
    /// Timestamp of the most recent heartbeat.
    pub last_beat_at: Timestamp,
}

/// Data for recording a worker heartbeat (upserted on every beat).
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = worker_heartbeats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkerHeartbeat {
    /// Opaque worker identifier.
    pub worker_id: String,
    /// Worker kind.
    pub worker_type: String,
    /// Timestamp of this heartbeat.
    pub last_beat_at: Timestamp,
}

impl HasLastActivityAt for WorkerHeartbeat {
    fn last_activity_at(&self) -> Option<jiff::Timestamp> {
        Some(self.last_beat_at.into())
    }
}
