//! At-most-once delivery ledger backed by a NATS KV bucket.

use async_nats::jetstream;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::KvStore;
use crate::{Result, TRACING_TARGET_KV};

/// Outcome of a `recordIfAbsent` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeOutcome {
    /// First time this `(scope, token)` pair has been seen within its TTL.
    Recorded,
    /// The pair was already recorded and has not expired.
    Duplicate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DedupeEntry {
    scope: String,
    token: String,
    created_at: Timestamp,
    expires_at: Timestamp,
}

/// Dedupe store for webhook and polling-trigger events.
///
/// Keys are `{scope}.{token}`; a bucket-level `max_age` reclaims most expired
/// entries automatically, but `recorded_if_absent` also checks the stored
/// `expires_at` on read so a key that outlives compaction is still treated as
/// expired rather than as a duplicate.
#[derive(Clone)]
pub struct DedupeStore {
    store: KvStore,
}

impl DedupeStore {
    #[instrument(skip(jetstream), target = TRACING_TARGET_KV)]
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        let store = KvStore::new(jetstream, "dedupe_entries", Some("webhook/trigger dedupe ledger"), None).await?;
        Ok(Self { store })
    }

    fn key(scope: &str, token: &str) -> String {
        format!("{scope}.{token}")
    }

    /// Atomically records `(scope, token)` if it is absent or expired.
    #[instrument(skip(self), target = TRACING_TARGET_KV)]
    pub async fn record_if_absent(
        &self,
        scope: &str,
        token: &str,
        ttl_ms: i64,
    ) -> Result<DedupeOutcome> {
        let key = Self::key(scope, token);
        let now = Timestamp::now();
        let entry = DedupeEntry {
            scope: scope.to_string(),
            token: token.to_string(),
            created_at: now,
            expires_at: now + jiff::Span::new().milliseconds(ttl_ms),
        };

        if self.store.create(&key, &entry).await?.is_some() {
            debug!(target: TRACING_TARGET_KV, %scope, %token, "dedupe token recorded");
            return Ok(DedupeOutcome::Recorded);
        }

        // Key already exists: it is either a live duplicate, or an
        // expired entry that hasn't been compacted yet — reclaim it via CAS.
        match self.store.get_with_revision::<DedupeEntry>(&key).await? {
            Some((existing, revision)) if existing.expires_at <= now => {
                match self
                    .store
                    .update_if_revision(&key, &entry, revision)
                    .await?
                {
                    Some(_) => {
                        debug!(target: TRACING_TARGET_KV, %scope, %token, "dedupe token reclaimed after expiry");
                        Ok(DedupeOutcome::Recorded)
                    }
                    // lost the CAS race to another writer; whoever won recorded it first
                    None => Ok(DedupeOutcome::Duplicate),
                }
            }
            _ => {
                debug!(target: TRACING_TARGET_KV, %scope, %token, "dedupe token duplicate");
                Ok(DedupeOutcome::Duplicate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_outcome_equality() {
        assert_eq!(DedupeOutcome::Recorded, DedupeOutcome::Recorded);
        assert_ne!(DedupeOutcome::Recorded, DedupeOutcome::Duplicate);
    }
}
