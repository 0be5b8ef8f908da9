use std::str::FromStr;

#[cfg(all(not(test), feature = "config"))]
use clap::Args;
#[cfg(test)]
use clap::Parser;
use loom_nats::{NatsClient, NatsConfig};
use loom_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};

use crate::service::security::{AuthKeys, AuthKeysConfig};
use crate::service::{Result, ServiceError};

/// Backend selection for the [`SchedulerLockService`](crate::service::SchedulerLockService).
///
/// `Auto` prefers the JetStream-KV-backed implementation, falling back to
/// Postgres if KV is unavailable; it never falls further back to the
/// in-process option. `Memory` may only be selected when `single_process` is
/// set, since an in-process lock provides no fleet-wide exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerStrategy {
    Auto,
    Memory,
    Postgres,
    Redis,
}

impl FromStr for SchedulerStrategy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            "redis" | "kv" => Ok(Self::Redis),
            other => Err(ServiceError::config(format!(
                "unrecognized SCHEDULER_STRATEGY: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for SchedulerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::Redis => "redis",
        };
        f.write_str(s)
    }
}

impl Default for SchedulerStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(Parser))]
#[cfg_attr(all(not(test), feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres database configuration.
    #[cfg_attr(any(test, feature = "config"), command(flatten))]
    pub postgres_config: PgConfig,

    /// NATS JetStream configuration (`REDIS_URL` is accepted as an alias for
    /// the JetStream connection string; `NATS_URL` is preferred).
    #[cfg_attr(any(test, feature = "config"), command(flatten))]
    pub nats_config: NatsConfig,

    /// JWT signing configuration.
    #[cfg_attr(any(test, feature = "config"), command(flatten))]
    pub auth_keys_config: AuthKeysConfig,

    /// Raw master secret used to derive the connection-credentials
    /// encryption key. Never used directly; see
    /// [`loom_runtime::PgConnectionLoader`].
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "ENCRYPTION_MASTER_KEY")
    )]
    pub encryption_master_key: String,

    /// Scheduler-lock backend selection.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SCHEDULER_STRATEGY", default_value = "auto")
    )]
    #[serde(default)]
    pub scheduler_strategy: SchedulerStrategy,

    /// Whether the in-process scheduler-lock fallback may be selected.
    ///
    /// Required when `scheduler_strategy` resolves to [`SchedulerStrategy::Memory`];
    /// otherwise the process refuses to start rather than silently running
    /// without fleet-wide exclusion.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SINGLE_PROCESS", default_value_t = false)
    )]
    #[serde(default)]
    pub single_process: bool,

    /// Whether this process should also run an in-process execution-queue
    /// worker pool alongside the HTTP server.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "ENABLE_INLINE_WORKER", default_value_t = false)
    )]
    #[serde(default)]
    pub enable_inline_worker: bool,

    /// How long a newly spawned worker has to publish its first heartbeat
    /// before it is considered failed to start.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "WORKER_HEARTBEAT_STARTUP_TIMEOUT_MS",
            default_value_t = 30_000
        )
    )]
    #[serde(default = "ServiceConfig::default_worker_heartbeat_startup_timeout_ms")]
    pub worker_heartbeat_startup_timeout_ms: u64,

    /// Execution-wide deadline, in milliseconds. Waiting executions are exempt
    /// until resumed.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "EXECUTION_TIMEOUT_MS",
            default_value_t = 24 * 3_600_000
        )
    )]
    #[serde(default = "ServiceConfig::default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,

    /// Tolerance window, in seconds, for replayed webhook deliveries
    /// (signature timestamp skew allowed before rejecting as stale).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "WEBHOOK_REPLAY_TOLERANCE_SECONDS",
            default_value_t = 300
        )
    )]
    #[serde(default = "ServiceConfig::default_webhook_replay_tolerance_seconds")]
    pub webhook_replay_tolerance_seconds: u64,

    /// Bounded concurrency for the polling scheduler's per-tick trigger
    /// fan-out, enforced by a `tokio::sync::Semaphore`.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "POLLING_CONCURRENCY", default_value_t = 10)
    )]
    #[serde(default = "ServiceConfig::default_polling_concurrency")]
    pub polling_concurrency: usize,

    /// How often the polling scheduler wakes to check for due triggers.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "POLLING_TICK_INTERVAL_MS", default_value_t = 5_000)
    )]
    #[serde(default = "ServiceConfig::default_polling_tick_interval_ms")]
    pub polling_tick_interval_ms: u64,

    /// Maximum due triggers claimed in a single polling scheduler tick.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "POLLING_BATCH_LIMIT", default_value_t = 50)
    )]
    #[serde(default = "ServiceConfig::default_polling_batch_limit")]
    pub polling_batch_limit: i64,

    /// Consecutive poll failures after which a polling trigger is
    /// auto-deactivated rather than backed off further.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "POLLING_MAX_BACKOFF_COUNT", default_value_t = 10)
    )]
    #[serde(default = "ServiceConfig::default_polling_max_backoff_count")]
    pub polling_max_backoff_count: i32,

    /// How often a running worker publishes a heartbeat.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "WORKER_HEARTBEAT_INTERVAL_MS", default_value_t = 10_000)
    )]
    #[serde(default = "ServiceConfig::default_worker_heartbeat_interval_ms")]
    pub worker_heartbeat_interval_ms: u64,
}

impl ServiceConfig {
    fn default_worker_heartbeat_startup_timeout_ms() -> u64 {
        30_000
    }

    fn default_execution_timeout_ms() -> u64 {
        24 * 3_600_000
    }

    fn default_webhook_replay_tolerance_seconds() -> u64 {
        300
    }

    fn default_polling_concurrency() -> usize {
        10
    }

    fn default_polling_tick_interval_ms() -> u64 {
        5_000
    }

    fn default_polling_batch_limit() -> i64 {
        50
    }

    fn default_polling_max_backoff_count() -> i32 {
        10
    }

    fn default_worker_heartbeat_interval_ms() -> u64 {
        10_000
    }

    /// Creates a new `ServiceConfig` by parsing from environment variables.
    ///
    /// This method loads `.env` file if present and parses configuration
    /// from environment variables and command line arguments.
    #[cfg(test)]
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv()?;
        Ok(Self::parse())
    }

    /// Validates that a durable scheduler-lock backend is available, or that
    /// `single_process` was explicitly opted into.
    pub fn validate_scheduler_strategy(&self) -> Result<()> {
        if self.scheduler_strategy == SchedulerStrategy::Memory && !self.single_process {
            return Err(ServiceError::config(
                "SCHEDULER_STRATEGY=memory requires SINGLE_PROCESS=true; \
                 an in-process lock provides no fleet-wide exclusion",
            ));
        }
        Ok(())
    }

    /// Connects to Postgres database and runs migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new(self.postgres_config.clone())
            .map_err(|e| ServiceError::database_with_source("failed to create database client", e))?;

        pg_client
            .run_pending_migrations()
            .await
            .map_err(|e| ServiceError::database_with_source("failed to apply database migrations", e))?;

        Ok(pg_client)
    }

    /// Connects to NATS JetStream.
    pub async fn connect_nats(&self) -> Result<NatsClient> {
        NatsClient::connect(self.nats_config.clone())
            .await
            .map_err(|e| ServiceError::external_service_with_source("nats", "failed to connect to NATS", e))
    }

    /// Loads JWT signing keys from configuration.
    pub fn load_auth_keys(&self) -> Result<AuthKeys> {
        AuthKeys::from_config(&self.auth_keys_config)
    }
}
