//! Scheduler lock repository backing the relational distributed-lock strategy.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewSchedulerLock, SchedulerLock};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for scheduler lock database operations.
pub trait SchedulerLockRepository {
    /// Attempts to acquire a lease over `resource`. Returns `None` if a live
    /// lease is already held by someone else.
    fn acquire_scheduler_lock(
        &mut self,
        new_lock: NewSchedulerLock,
    ) -> impl Future<Output = PgResult<Option<SchedulerLock>>> + Send;

    /// Extends the lease on `resource`, but only if `owner_id` still holds it.
    fn renew_scheduler_lock(
        &mut self,
        resource: &str,
        owner_id: &str,
        expires_at: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Option<SchedulerLock>>> + Send;

    /// Releases the lease on `resource`, but only if `owner_id` still holds it.
    fn release_scheduler_lock(
        &mut self,
        resource: &str,
        owner_id: &str,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl SchedulerLockRepository for PgConnection {
    async fn acquire_scheduler_lock(
        &mut self,
        new_lock: NewSchedulerLock,
    ) -> PgResult<Option<SchedulerLock>> {
        use schema::scheduler_locks;

        let lock = diesel::insert_into(scheduler_locks::table)
            .values(&new_lock)
            .on_conflict_do_nothing()
            .returning(SchedulerLock::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(lock)
    }

    async fn renew_scheduler_lock(
        &mut self,
        resource: &str,
        owner_id: &str,
        expires_at: jiff::Timestamp,
    ) -> PgResult<Option<SchedulerLock>> {
        use schema::scheduler_locks::{self, dsl};

        let expires_at = jiff_diesel::Timestamp::from(expires_at);

        let lock = diesel::update(
            scheduler_locks::table
                .filter(dsl::resource.eq(resource))
                .filter(dsl::owner_id.eq(owner_id)),
        )
        .set(dsl::expires_at.eq(expires_at))
        .returning(SchedulerLock::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?;

        Ok(lock)
    }

    async fn release_scheduler_lock(&mut self, resource: &str, owner_id: &str) -> PgResult<()> {
        use schema::scheduler_locks::{self, dsl};

        diesel::delete(
            scheduler_locks::table
                .filter(dsl::resource.eq(resource))
                .filter(dsl::owner_id.eq(owner_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(())
    }
}
