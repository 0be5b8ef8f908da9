//! Fleet-wide mutual exclusion over a NATS KV bucket.
//!
//! Realizes the key-value backend of the scheduler lock service: `acquire`
//! is an atomic create, `renew`/`release` are CAS updates/deletes gated on
//! the caller owning the current revision.

use async_nats::jetstream;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::KvStore;
use crate::{Result, TRACING_TARGET_KV};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeaseEntry {
    owner_id: String,
    expires_at: Timestamp,
}

/// A held lease on a named resource.
#[derive(Debug, Clone)]
pub struct Lease {
    pub resource: String,
    pub owner_id: String,
    pub expires_at: Timestamp,
    revision: u64,
}

/// NATS-KV-backed scheduler lock.
#[derive(Clone)]
pub struct KvSchedulerLock {
    store: KvStore,
}

impl KvSchedulerLock {
    #[instrument(skip(jetstream), target = TRACING_TARGET_KV)]
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        let store = KvStore::new(jetstream, "scheduler_locks", Some("fleet-wide lock leases"), None).await?;
        Ok(Self { store })
    }

    /// Attempt to acquire `resource` for `owner_id`. Non-blocking: returns
    /// `None` on contention with a live (non-expired) lease.
    #[instrument(skip(self), target = TRACING_TARGET_KV)]
    pub async fn acquire(&self, resource: &str, owner_id: &str, ttl_ms: i64) -> Result<Option<Lease>> {
        let now = Timestamp::now();
        let entry = LeaseEntry {
            owner_id: owner_id.to_string(),
            expires_at: now + jiff::Span::new().milliseconds(ttl_ms),
        };

        if let Some(revision) = self.store.create(resource, &entry).await? {
            debug!(target: TRACING_TARGET_KV, %resource, %owner_id, "lock acquired");
            return Ok(Some(Lease {
                resource: resource.to_string(),
                owner_id: owner_id.to_string(),
                expires_at: entry.expires_at,
                revision,
            }));
        }

        // Resource has a lease on record; steal it only if it has expired.
        match self.store.get_with_revision::<LeaseEntry>(resource).await? {
            Some((existing, revision)) if existing.expires_at <= now => {
                match self.store.update_if_revision(resource, &entry, revision).await? {
                    Some(new_revision) => {
                        debug!(target: TRACING_TARGET_KV, %resource, %owner_id, "lock acquired after prior lease expired");
                        Ok(Some(Lease {
                            resource: resource.to_string(),
                            owner_id: owner_id.to_string(),
                            expires_at: entry.expires_at,
                            revision: new_revision,
                        }))
                    }
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// Extend a held lease. Fails silently (returns `None`) if another
    /// process has since taken ownership of the resource.
    #[instrument(skip(self, lease), target = TRACING_TARGET_KV)]
    pub async fn renew(&self, lease: &Lease, ttl_ms: i64) -> Result<Option<Lease>> {
        let now = Timestamp::now();
        let entry = LeaseEntry {
            owner_id: lease.owner_id.clone(),
            expires_at: now + jiff::Span::new().milliseconds(ttl_ms),
        };

        match self
            .store
            .update_if_revision(&lease.resource, &entry, lease.revision)
            .await?
        {
            Some(revision) => Ok(Some(Lease {
                resource: lease.resource.clone(),
                owner_id: lease.owner_id.clone(),
                expires_at: entry.expires_at,
                revision,
            })),
            None => {
                warn!(target: TRACING_TARGET_KV, resource = %lease.resource, "lease renewal lost — ownership changed");
                Ok(None)
            }
        }
    }

    /// Release a held lease. A no-op (not an error) if ownership already moved on.
    #[instrument(skip(self, lease), target = TRACING_TARGET_KV)]
    pub async fn release(&self, lease: &Lease) -> Result<()> {
        if let Some((existing, revision)) = self
            .store
            .get_with_revision::<LeaseEntry>(&lease.resource)
            .await?
            && existing.owner_id == lease.owner_id
            && revision == lease.revision
        {
            self.store.delete(&lease.resource).await?;
            debug!(target: TRACING_TARGET_KV, resource = %lease.resource, "lock released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_carries_owner_and_resource() {
        let lease = Lease {
            resource: "polling:loop".to_string(),
            owner_id: "worker-1".to_string(),
            expires_at: Timestamp::now(),
            revision: 1,
        };
        assert_eq!(lease.resource, "polling:loop");
        assert_eq!(lease.owner_id, "worker-1");
    }
}
