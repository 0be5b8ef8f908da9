//! Worker heartbeat repository for liveness tracking.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewWorkerHeartbeat, WorkerHeartbeat};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for worker heartbeat database operations.
pub trait WorkerHeartbeatRepository {
    /// Records (upserts) a worker's heartbeat.
    fn record_worker_heartbeat(
        &mut self,
        heartbeat: NewWorkerHeartbeat,
    ) -> impl Future<Output = PgResult<WorkerHeartbeat>> + Send;

    /// Lists all known workers.
    fn list_worker_heartbeats(
        &mut self,
    ) -> impl Future<Output = PgResult<Vec<WorkerHeartbeat>>> + Send;

    /// Lists workers whose last heartbeat is older than `staleness_threshold`
    /// before `now`.
    fn list_stale_workers(
        &mut self,
        now: jiff::Timestamp,
        staleness_threshold: jiff::SignedDuration,
    ) -> impl Future<Output = PgResult<Vec<WorkerHeartbeat>>> + Send;
}

impl WorkerHeartbeatRepository for PgConnection {
    async fn record_worker_heartbeat(
        &mut self,
        heartbeat: NewWorkerHeartbeat,
    ) -> PgResult<WorkerHeartbeat> {
        use schema::worker_heartbeats::{self, dsl};

        let heartbeat = diesel::insert_into(worker_heartbeats::table)
            .values(&heartbeat)
            .on_conflict(dsl::worker_id)
            .do_update()
            .set(&heartbeat)
            .returning(WorkerHeartbeat::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(heartbeat)
    }

    async fn list_worker_heartbeats(&mut self) -> PgResult<Vec<WorkerHeartbeat>> {
        use schema::worker_heartbeats::{self, dsl};

        let heartbeats = worker_heartbeats::table
            .order(dsl::worker_id.asc())
            .select(WorkerHeartbeat::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(heartbeats)
    }

    async fn list_stale_workers(
        &mut self,
        now: jiff::Timestamp,
        staleness_threshold: jiff::SignedDuration,
    ) -> PgResult<Vec<WorkerHeartbeat>> {
        use schema::worker_heartbeats::{self, dsl};

        let cutoff = jiff_diesel::Timestamp::from(now - staleness_threshold);

        let heartbeats = worker_heartbeats::table
            .filter(dsl::last_beat_at.lt(cutoff))
            .select(WorkerHeartbeat::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(heartbeats)
    }
}
