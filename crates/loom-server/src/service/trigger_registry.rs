//! Process-local index of active triggers.
//!
//! The webhook router and the polling scheduler both need fast, repeated
//! lookups over "which triggers are currently active" without going to
//! Postgres on every request/tick. [`TriggerRegistry`] holds that index as a
//! single `Arc<RwLock<...>>` value constructed once at process start and
//! handed to both as a dependency; Postgres stays the durable store and the
//! cache is a read-through snapshot kept current via [`TriggerRegistry::register`]/
//! [`TriggerRegistry::deactivate`] and the periodic [`TriggerRegistry::run_refresh_loop`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use loom_postgres::model::WorkflowTrigger;
use loom_postgres::query::WorkflowTriggerRepository;
use loom_postgres::{PgClient, types::TriggerKind};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Result, ServiceError};

/// Tracing target for trigger registry operations.
const TRACING_TARGET: &str = "loom_server::service::trigger_registry";

#[derive(Debug, Default)]
struct Index {
    by_id: HashMap<Uuid, WorkflowTrigger>,
    by_endpoint: HashMap<String, Uuid>,
}

impl Index {
    fn insert(&mut self, trigger: WorkflowTrigger) {
        if let Some(endpoint) = &trigger.endpoint {
            self.by_endpoint.insert(endpoint.clone(), trigger.id);
        }
        self.by_id.insert(trigger.id, trigger);
    }

    fn remove(&mut self, trigger_id: Uuid) {
        if let Some(trigger) = self.by_id.remove(&trigger_id)
            && let Some(endpoint) = &trigger.endpoint
        {
            self.by_endpoint.remove(endpoint);
        }
    }
}

/// In-memory cache of active triggers, backed by Postgres as the durable
/// source of truth.
#[derive(Clone)]
pub struct TriggerRegistry {
    pg_client: PgClient,
    index: Arc<RwLock<Index>>,
}

impl TriggerRegistry {
    /// Builds an empty registry. Call [`Self::rehydrate`] before serving
    /// traffic so active triggers are indexed from their first request.
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client, index: Arc::new(RwLock::new(Index::default())) }
    }

    /// Reloads every active trigger from Postgres, replacing the in-memory
    /// index wholesale. Run once at startup and on every background refresh
    /// tick thereafter.
    pub async fn rehydrate(&self) -> Result<()> {
        let mut conn = self.pg_client.get_connection().await?;
        let active = conn
            .list_active_triggers()
            .await
            .map_err(|e| ServiceError::database_with_source("failed to list triggers for rehydration", e))?;

        let mut fresh = Index::default();
        for trigger in active {
            fresh.insert(trigger);
        }

        let count = fresh.by_id.len();
        *self.index.write().await = fresh;
        tracing::info!(target: TRACING_TARGET, active_triggers = count, "trigger registry rehydrated");
        Ok(())
    }

    /// Publishes an already-persisted `trigger` into the cache, making it
    /// immediately visible to webhook routing and the polling scheduler.
    /// The caller is responsible for creating the row in Postgres first
    /// (e.g. via `WorkflowTriggerRepository::create_workflow_trigger`).
    pub async fn register(&self, trigger: WorkflowTrigger) -> Result<WorkflowTrigger> {
        self.index.write().await.insert(trigger.clone());
        tracing::debug!(target: TRACING_TARGET, trigger_id = %trigger.id, kind = ?trigger.kind, "trigger registered");
        Ok(trigger)
    }

    /// Marks a trigger inactive in Postgres, then evicts it from the cache
    /// so in-flight routing/polling stop considering it immediately.
    pub async fn deactivate(&self, trigger_id: Uuid) -> Result<()> {
        use loom_postgres::model::UpdateWorkflowTrigger;

        let mut conn = self.pg_client.get_connection().await?;
        conn.update_workflow_trigger(trigger_id, UpdateWorkflowTrigger { is_active: Some(false), ..Default::default() })
            .await
            .map_err(|e| ServiceError::database_with_source("failed to deactivate trigger", e))?;

        self.index.write().await.remove(trigger_id);
        tracing::info!(target: TRACING_TARGET, trigger_id = %trigger_id, "trigger deactivated");
        Ok(())
    }

    /// Snapshot of every active trigger of `kind`.
    pub async fn list_active(&self, kind: TriggerKind) -> Vec<WorkflowTrigger> {
        self.index.read().await.by_id.values().filter(|t| t.kind == kind).cloned().collect()
    }

    /// Looks up the active webhook trigger registered at `endpoint`.
    pub async fn find_by_endpoint(&self, endpoint: &str) -> Option<WorkflowTrigger> {
        let index = self.index.read().await;
        let trigger_id = *index.by_endpoint.get(endpoint)?;
        index.by_id.get(&trigger_id).cloned()
    }

    /// Spawns a periodic background refresh that re-reads active triggers
    /// from Postgres, republishing the snapshot so trigger activation and
    /// deactivation performed out-of-process (e.g. by another replica) are
    /// picked up without a restart. Returns once `cancellation` fires.
    pub async fn run_refresh_loop(&self, interval: Duration, cancellation: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(error) = self.rehydrate().await {
                        tracing::warn!(target: TRACING_TARGET, error = %error, "trigger registry refresh failed");
                    }
                }
            }
        }
    }
}
