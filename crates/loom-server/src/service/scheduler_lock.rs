//! Fleet-wide scheduler lock: selects a backend per [`SchedulerStrategy`] and
//! exposes a single acquire/renew/release facade over it.
//!
//! The Polling Scheduler and any other singleton background loop acquire a
//! named resource (e.g. `"polling:loop"`) before doing work, so that at most
//! one process in the fleet runs that loop at a time.

use std::collections::HashMap;
use std::sync::Arc;

use jiff::Timestamp;
use loom_nats::{KvSchedulerLock, Lease as KvLease, NatsClient};
use loom_postgres::model::NewSchedulerLock;
use loom_postgres::query::SchedulerLockRepository;
use loom_postgres::PgClient;
use tokio::sync::Mutex;
use tracing::warn;

use super::config::SchedulerStrategy;
use super::{Result, ServiceError};

/// Tracing target for scheduler-lock operations.
const TRACING_TARGET: &str = "loom_server::service::scheduler_lock";

/// A held scheduler lease, opaque to the caller beyond its resource name.
#[derive(Debug, Clone)]
pub enum SchedulerLease {
    Kv(KvLease),
    Postgres {
        resource: String,
        owner_id: String,
        expires_at: Timestamp,
    },
    Memory {
        resource: String,
        owner_id: String,
        expires_at: Timestamp,
    },
}

impl SchedulerLease {
    /// The locked resource's name.
    pub fn resource(&self) -> &str {
        match self {
            Self::Kv(lease) => &lease.resource,
            Self::Postgres { resource, .. } | Self::Memory { resource, .. } => resource,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryLeaseEntry {
    owner_id: String,
    expires_at: Timestamp,
}

type MemoryLeases = Arc<Mutex<HashMap<String, MemoryLeaseEntry>>>;

enum LockBackend {
    Kv(KvSchedulerLock),
    Postgres(PgClient),
    Memory(MemoryLeases),
}

/// Fleet-wide mutual exclusion over named resources, backed by whichever of
/// KV / Postgres / in-process a [`SchedulerStrategy`] resolves to.
#[derive(Clone)]
pub struct SchedulerLockService {
    backend: Arc<LockBackend>,
}

impl SchedulerLockService {
    /// Builds the service for the configured strategy.
    ///
    /// `Auto` prefers the JetStream KV backend, falling back to Postgres if
    /// the KV bucket cannot be created; it never falls further back to the
    /// in-process option, since that would silently drop fleet-wide
    /// exclusion. `Memory` requires `single_process`, already enforced by
    /// [`super::config::ServiceConfig::validate_scheduler_strategy`] before
    /// this is called.
    pub async fn new(
        strategy: SchedulerStrategy,
        nats_client: &NatsClient,
        pg_client: PgClient,
    ) -> Result<Self> {
        let backend = match strategy {
            SchedulerStrategy::Auto => match KvSchedulerLock::new(nats_client.jetstream()).await {
                Ok(kv) => LockBackend::Kv(kv),
                Err(error) => {
                    warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "KV scheduler lock unavailable, falling back to Postgres"
                    );
                    LockBackend::Postgres(pg_client)
                }
            },
            SchedulerStrategy::Redis => {
                let kv = KvSchedulerLock::new(nats_client.jetstream())
                    .await
                    .map_err(ServiceError::from)?;
                LockBackend::Kv(kv)
            }
            SchedulerStrategy::Postgres => LockBackend::Postgres(pg_client),
            SchedulerStrategy::Memory => LockBackend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        };

        Ok(Self { backend: Arc::new(backend) })
    }

    /// Attempts to acquire `resource` for `owner_id`. Returns `None` on
    /// contention with a live lease held by someone else.
    pub async fn acquire(&self, resource: &str, owner_id: &str, ttl_ms: i64) -> Result<Option<SchedulerLease>> {
        match self.backend.as_ref() {
            LockBackend::Kv(kv) => Ok(kv
                .acquire(resource, owner_id, ttl_ms)
                .await
                .map_err(ServiceError::from)?
                .map(SchedulerLease::Kv)),
            LockBackend::Postgres(pg_client) => {
                let mut conn = pg_client.get_connection().await?;
                let expires_at = Timestamp::now() + jiff::Span::new().milliseconds(ttl_ms);
                let new_lock = NewSchedulerLock {
                    resource: resource.to_string(),
                    owner_id: owner_id.to_string(),
                    expires_at: expires_at.into(),
                };
                let acquired = conn.acquire_scheduler_lock(new_lock).await?;
                Ok(acquired.map(|lock| SchedulerLease::Postgres {
                    resource: lock.resource,
                    owner_id: lock.owner_id,
                    expires_at: lock.expires_at.into(),
                }))
            }
            LockBackend::Memory(leases) => {
                let now = Timestamp::now();
                let expires_at = now + jiff::Span::new().milliseconds(ttl_ms);
                let mut leases = leases.lock().await;
                let vacant = match leases.get(resource) {
                    Some(existing) => existing.expires_at <= now,
                    None => true,
                };
                if !vacant {
                    return Ok(None);
                }
                leases.insert(
                    resource.to_string(),
                    MemoryLeaseEntry { owner_id: owner_id.to_string(), expires_at },
                );
                Ok(Some(SchedulerLease::Memory {
                    resource: resource.to_string(),
                    owner_id: owner_id.to_string(),
                    expires_at,
                }))
            }
        }
    }

    /// Extends a held lease. Returns `None` if ownership has since moved on.
    pub async fn renew(&self, lease: &SchedulerLease, ttl_ms: i64) -> Result<Option<SchedulerLease>> {
        match (self.backend.as_ref(), lease) {
            (LockBackend::Kv(kv), SchedulerLease::Kv(kv_lease)) => Ok(kv
                .renew(kv_lease, ttl_ms)
                .await
                .map_err(ServiceError::from)?
                .map(SchedulerLease::Kv)),
            (LockBackend::Postgres(pg_client), SchedulerLease::Postgres { resource, owner_id, .. }) => {
                let mut conn = pg_client.get_connection().await?;
                let expires_at = Timestamp::now() + jiff::Span::new().milliseconds(ttl_ms);
                let renewed = conn.renew_scheduler_lock(resource, owner_id, expires_at).await?;
                Ok(renewed.map(|lock| SchedulerLease::Postgres {
                    resource: lock.resource,
                    owner_id: lock.owner_id,
                    expires_at: lock.expires_at.into(),
                }))
            }
            (LockBackend::Memory(leases), SchedulerLease::Memory { resource, owner_id, .. }) => {
                let mut leases = leases.lock().await;
                match leases.get(resource) {
                    Some(existing) if &existing.owner_id == owner_id => {
                        let expires_at = Timestamp::now() + jiff::Span::new().milliseconds(ttl_ms);
                        leases.insert(
                            resource.clone(),
                            MemoryLeaseEntry { owner_id: owner_id.clone(), expires_at },
                        );
                        Ok(Some(SchedulerLease::Memory {
                            resource: resource.clone(),
                            owner_id: owner_id.clone(),
                            expires_at,
                        }))
                    }
                    _ => Ok(None),
                }
            }
            _ => Err(ServiceError::internal("scheduler lease does not match the configured backend")),
        }
    }

    /// Releases a held lease. A no-op if ownership has already moved on.
    pub async fn release(&self, lease: &SchedulerLease) -> Result<()> {
        match (self.backend.as_ref(), lease) {
            (LockBackend::Kv(kv), SchedulerLease::Kv(kv_lease)) => {
                kv.release(kv_lease).await.map_err(ServiceError::from)
            }
            (LockBackend::Postgres(pg_client), SchedulerLease::Postgres { resource, owner_id, .. }) => {
                let mut conn = pg_client.get_connection().await?;
                conn.release_scheduler_lock(resource, owner_id).await?;
                Ok(())
            }
            (LockBackend::Memory(leases), SchedulerLease::Memory { resource, owner_id, .. }) => {
                let mut leases = leases.lock().await;
                if leases.get(resource).is_some_and(|existing| &existing.owner_id == owner_id) {
                    leases.remove(resource);
                }
                Ok(())
            }
            _ => Err(ServiceError::internal("scheduler lease does not match the configured backend")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_excludes_a_second_owner() {
        let service = SchedulerLockService {
            backend: Arc::new(LockBackend::Memory(Arc::new(Mutex::new(HashMap::new())))),
        };

        let lease = service.acquire("polling:loop", "worker-a", 60_000).await.unwrap();
        assert!(lease.is_some());
        assert!(service.acquire("polling:loop", "worker-b", 60_000).await.unwrap().is_none());

        service.release(&lease.unwrap()).await.unwrap();
        assert!(service.acquire("polling:loop", "worker-b", 60_000).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn memory_backend_steals_an_expired_lease() {
        let service = SchedulerLockService {
            backend: Arc::new(LockBackend::Memory(Arc::new(Mutex::new(HashMap::new())))),
        };

        let lease = service.acquire("polling:loop", "worker-a", 0).await.unwrap().unwrap();
        assert_eq!(lease.resource(), "polling:loop");

        let reacquired = service.acquire("polling:loop", "worker-b", 60_000).await.unwrap();
        assert!(reacquired.is_some());
    }
}
