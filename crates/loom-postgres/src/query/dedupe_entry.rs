//! Dedupe entry repository mirroring JetStream KV scope membership for the
//! per-scope eviction policy.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{DedupeEntry, NewDedupeEntry};
use crate::types::constants::dedupe::SCOPE_CAPACITY;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for dedupe entry database operations.
pub trait DedupeEntryRepository {
    /// Records a new dedupe entry, then evicts the oldest entries in the
    /// scope past [`SCOPE_CAPACITY`].
    fn record_dedupe_entry(
        &mut self,
        new_entry: NewDedupeEntry,
    ) -> impl Future<Output = PgResult<DedupeEntry>> + Send;

    /// Returns the number of entries currently tracked for a scope.
    fn count_dedupe_scope(&mut self, scope: &str) -> impl Future<Output = PgResult<i64>> + Send;

    /// Deletes the oldest entries in a scope past [`SCOPE_CAPACITY`].
    fn evict_dedupe_scope_overflow(
        &mut self,
        scope: &str,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl DedupeEntryRepository for PgConnection {
    async fn record_dedupe_entry(&mut self, new_entry: NewDedupeEntry) -> PgResult<DedupeEntry> {
        use schema::dedupe_entries;

        let entry = diesel::insert_into(dedupe_entries::table)
            .values(&new_entry)
            .returning(DedupeEntry::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        self.evict_dedupe_scope_overflow(&entry.scope).await?;

        Ok(entry)
    }

    async fn count_dedupe_scope(&mut self, scope: &str) -> PgResult<i64> {
        use schema::dedupe_entries::{self, dsl};

        let count = dedupe_entries::table
            .filter(dsl::scope.eq(scope))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }

    async fn evict_dedupe_scope_overflow(&mut self, scope: &str) -> PgResult<usize> {
        use schema::dedupe_entries::{self, dsl};

        let overflowing_ids: Vec<uuid::Uuid> = dedupe_entries::table
            .filter(dsl::scope.eq(scope))
            .order(dsl::created_at.desc())
            .offset(SCOPE_CAPACITY)
            .select(dsl::id)
            .load(self)
            .await
            .map_err(PgError::from)?;

        if overflowing_ids.is_empty() {
            return Ok(0);
        }

        let deleted = diesel::delete(dedupe_entries::table.filter(dsl::id.eq_any(&overflowing_ids)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted)
    }
}
