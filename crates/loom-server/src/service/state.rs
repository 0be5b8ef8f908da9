//! Application state and dependency injection.

use std::sync::Arc;

use loom_nats::{DedupeStore, ExecutionQueue, NatsClient};
use loom_postgres::PgClient;
use loom_runtime::{ConnectorRegistry, Engine, EngineConfig, PgConnectionLoader};

use crate::service::{AuthKeys, HealthCache, RateLimiter, Result, SchedulerLockService, ServiceConfig, TriggerRegistry};

/// Identity this process's execution queue handle registers its consumers
/// under. The HTTP server only ever produces; an inline worker (when
/// `ENABLE_INLINE_WORKER=true`) would bind its own consumer identity.
const INGRESS_WORKER_ID: &str = "http-ingress";

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    nats_client: NatsClient,
    dedupe_store: DedupeStore,
    execution_queue: Arc<ExecutionQueue>,
    scheduler_lock: SchedulerLockService,
    trigger_registry: TriggerRegistry,

    auth_keys: AuthKeys,
    connection_loader: Arc<PgConnectionLoader>,
    engine: Arc<Engine>,
    health_cache: HealthCache,
    rate_limiter: RateLimiter,
    webhook_replay_tolerance_seconds: i64,

    polling_concurrency: usize,
    polling_tick_interval_ms: u64,
    polling_batch_limit: i64,
    polling_max_backoff_count: i32,
    worker_heartbeat_interval_ms: u64,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to all external services and loads required resources.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate_scheduler_strategy()?;

        let pg_client = config.connect_postgres().await?;
        let nats_client = config.connect_nats().await?;
        let auth_keys = config.load_auth_keys()?;

        let dedupe_store = DedupeStore::new(nats_client.jetstream())
            .await
            .map_err(|e| crate::service::ServiceError::external_service_with_source(
                "nats",
                "failed to initialize dedupe store",
                e,
            ))?;

        let execution_queue = ExecutionQueue::new(nats_client.jetstream(), INGRESS_WORKER_ID)
            .await
            .map_err(|e| crate::service::ServiceError::external_service_with_source(
                "nats",
                "failed to initialize execution queue",
                e,
            ))?;

        let connection_loader = PgConnectionLoader::new(
            pg_client.clone(),
            config.encryption_master_key.as_bytes(),
        )
        .map_err(|e| crate::service::ServiceError::internal_with_source(
            "failed to initialize connection credentials loader",
            e,
        ))?;

        let engine_config = EngineConfig::builder()
            .execution_timeout(std::time::Duration::from_millis(config.execution_timeout_ms))
            .build()
            .map_err(|e| crate::service::ServiceError::config_with_source(
                "invalid engine configuration",
                e,
            ))?;

        let engine = Engine::new(engine_config, ConnectorRegistry::new());

        let scheduler_lock = SchedulerLockService::new(config.scheduler_strategy, &nats_client, pg_client.clone()).await?;

        let trigger_registry = TriggerRegistry::new(pg_client.clone());
        trigger_registry.rehydrate().await?;

        let service_state = Self {
            pg_client,
            nats_client,
            dedupe_store,
            execution_queue: Arc::new(execution_queue),
            scheduler_lock,
            trigger_registry,

            auth_keys,
            connection_loader: Arc::new(connection_loader),
            engine: Arc::new(engine),
            health_cache: HealthCache::new(),
            rate_limiter: RateLimiter::default(),
            webhook_replay_tolerance_seconds: config.webhook_replay_tolerance_seconds as i64,

            polling_concurrency: config.polling_concurrency,
            polling_tick_interval_ms: config.polling_tick_interval_ms,
            polling_batch_limit: config.polling_batch_limit,
            polling_max_backoff_count: config.polling_max_backoff_count,
            worker_heartbeat_interval_ms: config.worker_heartbeat_interval_ms,
        };

        Ok(service_state)
    }

    /// Replay tolerance to enforce when verifying inbound webhook signatures.
    pub fn webhook_replay_tolerance_seconds(&self) -> i64 {
        self.webhook_replay_tolerance_seconds
    }

    /// Shared Postgres connection pool, for background tasks spawned
    /// alongside the HTTP server that need their own connections outside
    /// axum's per-request extraction.
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }

    /// The engine used to run workflow graphs.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Connection credentials loader, for resolving an organization's
    /// decrypted connections before dispatching an execution.
    pub fn connection_loader(&self) -> &Arc<PgConnectionLoader> {
        &self.connection_loader
    }

    /// The durable execution queue.
    pub fn execution_queue(&self) -> &Arc<ExecutionQueue> {
        &self.execution_queue
    }

    /// The dedupe store, for gating polling-trigger events the same way
    /// webhook deliveries are gated.
    pub fn dedupe_store(&self) -> &DedupeStore {
        &self.dedupe_store
    }

    /// The fleet-wide scheduler lock, for acquiring single-leader sections
    /// like the polling scheduler's tick.
    pub fn scheduler_lock(&self) -> &SchedulerLockService {
        &self.scheduler_lock
    }

    /// The process-local trigger index.
    pub fn trigger_registry(&self) -> &TriggerRegistry {
        &self.trigger_registry
    }

    /// Secret used to sign resume tokens minted when an execution suspends
    /// at a wait node.
    pub fn auth_keys(&self) -> &AuthKeys {
        &self.auth_keys
    }

    /// Bounded concurrency for the polling scheduler's per-tick fan-out.
    pub fn polling_concurrency(&self) -> usize {
        self.polling_concurrency
    }

    /// How often the polling scheduler wakes to check for due triggers.
    pub fn polling_tick_interval_ms(&self) -> u64 {
        self.polling_tick_interval_ms
    }

    /// Maximum due triggers claimed in a single polling scheduler tick.
    pub fn polling_batch_limit(&self) -> i64 {
        self.polling_batch_limit
    }

    /// Consecutive poll failures after which a polling trigger is
    /// auto-deactivated rather than backed off further.
    pub fn polling_max_backoff_count(&self) -> i32 {
        self.polling_max_backoff_count
    }

    /// How often a running worker publishes a heartbeat.
    pub fn worker_heartbeat_interval_ms(&self) -> u64 {
        self.worker_heartbeat_interval_ms
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(nats_client: NatsClient);
impl_di!(dedupe_store: DedupeStore);
impl_di!(execution_queue: Arc<ExecutionQueue>);
impl_di!(scheduler_lock: SchedulerLockService);
impl_di!(trigger_registry: TriggerRegistry);

impl_di!(auth_keys: AuthKeys);
impl_di!(connection_loader: Arc<PgConnectionLoader>);
impl_di!(engine: Arc<Engine>);
impl_di!(health_cache: HealthCache);
impl_di!(rate_limiter: RateLimiter);
