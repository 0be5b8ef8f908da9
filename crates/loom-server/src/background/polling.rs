//! Polling scheduler: periodically checks due polling triggers against
//! their connector and enqueues newly observed events as executions.
//!
//! Runs under the fleet-wide [`crate::service::SchedulerLockService`] so at
//! most one process in the fleet ticks at a time; every other replica's
//! ticks are no-ops while the lock is held elsewhere.

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use loom_nats::{DedupeOutcome, ExecutionEntry, ExecutionPayload, QueuePriority, TriggerKind as QueueTriggerKind};
use loom_postgres::model::{NewWorkflowExecution, UpdateWorkflowTrigger, WorkflowTrigger};
use loom_postgres::query::{WorkflowExecutionRepository, WorkflowRepository, WorkflowTriggerRepository, WorkflowVersionRepository};
use loom_postgres::types::TriggerStatus;
use loom_runtime::PollRequest;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::service::{ServiceState, ServiceError};

/// Tracing target for polling scheduler operations.
const TRACING_TARGET: &str = "loom_server::background::polling";

/// Fleet-wide lock resource name guarding a single active scheduler tick.
const LOCK_RESOURCE: &str = "polling:loop";

/// Dedupe ledger TTL for polling-trigger events, matching webhook deliveries.
const DEDUPE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Runs the polling scheduler loop until `cancellation` fires.
///
/// `owner_id` identifies this process when contending for the scheduler
/// lock; it should be stable for the process's lifetime but need not be
/// globally unique beyond that.
pub async fn run_polling_scheduler(state: ServiceState, owner_id: String, cancellation: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_millis(state.polling_tick_interval_ms()));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!(target: TRACING_TARGET, owner_id = %owner_id, "polling scheduler started");

    loop {
        tokio::select! {
            () = cancellation.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(error) = run_tick(&state, &owner_id).await {
                    tracing::warn!(target: TRACING_TARGET, error = %error, "polling tick failed");
                }
            }
        }
    }

    tracing::info!(target: TRACING_TARGET, "polling scheduler stopped");
}

/// One scheduler tick: claims the lock, selects due triggers, and polls each
/// with bounded concurrency.
async fn run_tick(state: &ServiceState, owner_id: &str) -> Result<(), ServiceError> {
    let tick_ttl_ms = state.polling_tick_interval_ms().saturating_mul(3).max(1_000) as i64;
    let lease = match state.scheduler_lock().acquire(LOCK_RESOURCE, owner_id, tick_ttl_ms).await? {
        Some(lease) => lease,
        None => return Ok(()),
    };

    let now = Timestamp::now();
    let due = {
        let mut conn = state.pg_client().get_connection().await?;
        conn.find_due_polling_triggers(now, state.polling_batch_limit()).await?
    };

    if !due.is_empty() {
        tracing::debug!(target: TRACING_TARGET, due = due.len(), "polling due triggers");

        let semaphore = Arc::new(Semaphore::new(state.polling_concurrency().max(1)));
        let mut handles = Vec::with_capacity(due.len());
        for trigger in due {
            let semaphore = Arc::clone(&semaphore);
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else { return };
                let trigger_id = trigger.id;
                if let Err(error) = poll_trigger(&state, trigger).await {
                    tracing::warn!(target: TRACING_TARGET, trigger_id = %trigger_id, error = %error, "trigger poll failed");
                }
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    state.scheduler_lock().release(&lease).await?;
    Ok(())
}

/// Polls a single due trigger, enqueues any new events it reports, and
/// updates its cursor/backoff bookkeeping.
async fn poll_trigger(state: &ServiceState, trigger: WorkflowTrigger) -> Result<(), ServiceError> {
    let credentials = state
        .connection_loader()
        .load_connection_for_app(trigger.organization_id, &trigger.app_id)
        .await
        .map_err(ServiceError::from)?
        .map(|resolved| resolved.credentials);

    let request = PollRequest {
        trigger_id: trigger.id,
        organization_id: trigger.organization_id,
        cursor: trigger.cursor.clone(),
        credentials,
    };

    let outcome = state.engine().connectors().poll(&trigger.app_id, request).await;

    let mut conn = state.pg_client().get_connection().await?;

    match outcome {
        Ok(response) => {
            for event in response.events {
                enqueue_polling_event(state, &mut conn, &trigger, event).await?;
            }

            let next_poll_at = trigger
                .interval_seconds
                .map(|secs| Timestamp::now() + jiff::Span::new().seconds(i64::from(secs)));

            conn.update_workflow_trigger(
                trigger.id,
                UpdateWorkflowTrigger {
                    cursor: Some(response.cursor.or(trigger.cursor)),
                    last_poll_at: Some(Some(Timestamp::now().into())),
                    next_poll_at: Some(next_poll_at.map(Into::into)),
                    backoff_count: Some(0),
                    last_status: Some(TriggerStatus::Ok),
                    ..Default::default()
                },
            )
            .await?;
        }
        Err(error) => {
            let backoff_count = trigger.backoff_count + 1;
            tracing::warn!(
                target: TRACING_TARGET,
                trigger_id = %trigger.id,
                error = %error,
                backoff_count,
                "poll attempt failed"
            );

            if backoff_count >= state.polling_max_backoff_count() {
                state.trigger_registry().deactivate(trigger.id).await?;
                tracing::warn!(
                    target: TRACING_TARGET,
                    trigger_id = %trigger.id,
                    backoff_count,
                    "trigger auto-deactivated after exceeding backoff ceiling"
                );
            } else {
                let backoff_delay = jiff::Span::new().seconds(backoff_delay_seconds(backoff_count));
                conn.update_workflow_trigger(
                    trigger.id,
                    UpdateWorkflowTrigger {
                        last_poll_at: Some(Some(Timestamp::now().into())),
                        next_poll_at: Some(Some((Timestamp::now() + backoff_delay).into())),
                        backoff_count: Some(backoff_count),
                        last_status: Some(TriggerStatus::Error),
                        ..Default::default()
                    },
                )
                .await?;
            }
        }
    }

    Ok(())
}

/// Exponential backoff, capped at 10 minutes, for a failed poll attempt.
fn backoff_delay_seconds(backoff_count: i32) -> i64 {
    let capped = backoff_count.min(10);
    (2i64.saturating_pow(capped as u32)).min(600)
}

/// Dedupes and enqueues a single polling event as a new execution.
async fn enqueue_polling_event(
    state: &ServiceState,
    conn: &mut loom_postgres::PgConn,
    trigger: &WorkflowTrigger,
    event: serde_json::Value,
) -> Result<(), ServiceError> {
    let digest = {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(event.to_string().as_bytes());
        hex::encode(hasher.finalize())
    };

    let dedupe_scope = format!("polling.{}", trigger.id);
    let outcome = state.dedupe_store().record_if_absent(&dedupe_scope, &digest, DEDUPE_TTL_MS).await.map_err(ServiceError::from)?;
    if outcome == DedupeOutcome::Duplicate {
        tracing::debug!(target: TRACING_TARGET, trigger_id = %trigger.id, "duplicate polling event, skipped");
        return Ok(());
    }

    let workflow = conn
        .find_workflow_in_organization(trigger.organization_id, trigger.workflow_id)
        .await?
        .ok_or_else(|| ServiceError::internal("polling trigger references a missing workflow"))?;

    let Some(version_number) = workflow.active_version else {
        tracing::warn!(target: TRACING_TARGET, workflow_id = %workflow.id, "polling trigger's workflow has no deployed version, skipping");
        return Ok(());
    };

    let version = conn
        .find_workflow_version_by_number(workflow.id, version_number)
        .await?
        .ok_or_else(|| ServiceError::internal("deployed workflow version not found"))?;

    let new_execution = NewWorkflowExecution {
        workflow_id: workflow.id,
        workflow_version_id: version.id,
        organization_id: trigger.organization_id,
        trigger_id: Some(trigger.id),
        priority: QueuePriority::Default.to_string(),
        trigger_data: event.clone(),
    };
    let execution = conn.create_workflow_execution(new_execution).await?;

    let entry = ExecutionEntry::new(
        execution.id,
        execution.workflow_id,
        trigger.organization_id,
        QueuePriority::Default,
        ExecutionPayload { trigger_type: QueueTriggerKind::Polling, trigger_data: event, resume_state: None, resume_node_id: None },
    );
    state.execution_queue().enqueue(&entry).await.map_err(ServiceError::from)?;

    tracing::info!(target: TRACING_TARGET, execution_id = %execution.id, trigger_id = %trigger.id, "polling event enqueued");

    Ok(())
}
