//! Inline execution worker: dequeues executions and runs them through the
//! workflow runtime.
//!
//! Gated behind `ENABLE_INLINE_WORKER`; a deployment can instead run a
//! dedicated worker process built around the same [`run_worker_loop`] using
//! a separate [`loom_nats::ExecutionQueue`] consumer identity.

use std::time::Duration;

use jiff::Timestamp;
use loom_postgres::model::{NewResumeToken, NewWorkerHeartbeat, UpdateWorkflowExecution, WorkflowExecution};
use loom_postgres::query::{ResumeTokenRepository, WorkerHeartbeatRepository, WorkflowExecutionRepository, WorkflowVersionRepository};
use loom_postgres::types::ExecutionStatus;
use loom_runtime::definition::{NodeId, Workflow};
use loom_runtime::{CompiledGraph, ConnectionRegistry, ExecutionContext, ExecutionOutcome, NoopTokenRefreshHandler, QuotaLimits};
use loom_nats::ExecutionLease;
use tokio_util::sync::CancellationToken;

use crate::service::{ServiceError, ServiceState, sign_resume_token};

/// Tracing target for worker loop operations.
const TRACING_TARGET: &str = "loom_server::background::worker";

/// Worker kind recorded against [`loom_postgres::model::WorkerHeartbeat`].
const WORKER_TYPE: &str = "execution";

/// Delay before redelivering a lease the worker failed to even start
/// (missing workflow version, malformed graph, credentials unavailable).
const PREP_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Runs the inline execution worker loop until `cancellation` fires.
///
/// Heartbeats on `state.worker_heartbeat_interval_ms()` and, concurrently,
/// repeatedly dequeues and runs executions; each dequeued execution is
/// processed in its own task so a long-running execution never blocks the
/// next dequeue attempt (the engine's own semaphore bounds real concurrency).
pub async fn run_worker_loop(state: ServiceState, worker_id: String, cancellation: CancellationToken) {
    let mut heartbeat_ticker = tokio::time::interval(Duration::from_millis(state.worker_heartbeat_interval_ms()));
    heartbeat_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!(target: TRACING_TARGET, worker_id = %worker_id, "execution worker started");

    if let Err(error) = emit_heartbeat(&state, &worker_id).await {
        tracing::warn!(target: TRACING_TARGET, error = %error, "initial heartbeat failed");
    }

    loop {
        tokio::select! {
            () = cancellation.cancelled() => break,
            _ = heartbeat_ticker.tick() => {
                if let Err(error) = emit_heartbeat(&state, &worker_id).await {
                    tracing::warn!(target: TRACING_TARGET, error = %error, "heartbeat failed");
                }
            }
            result = state.execution_queue().dequeue() => {
                match result {
                    Ok(Some(lease)) => {
                        let state = state.clone();
                        let exec_cancellation = cancellation.child_token();
                        tokio::spawn(async move {
                            process_lease(&state, lease, exec_cancellation).await;
                        });
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!(target: TRACING_TARGET, error = %error, "dequeue failed");
                        tokio::time::sleep(PREP_RETRY_DELAY).await;
                    }
                }
            }
        }
    }

    tracing::info!(target: TRACING_TARGET, "execution worker stopped");
}

async fn emit_heartbeat(state: &ServiceState, worker_id: &str) -> Result<(), ServiceError> {
    let mut conn = state.pg_client().get_connection().await?;
    conn.record_worker_heartbeat(NewWorkerHeartbeat {
        worker_id: worker_id.to_string(),
        worker_type: WORKER_TYPE.to_string(),
        last_beat_at: Timestamp::now().into(),
    })
    .await?;
    Ok(())
}

/// Everything needed to run one execution, assembled from its persisted
/// record before the engine is invoked.
struct PreparedExecution {
    execution: WorkflowExecution,
    graph: CompiledGraph,
    connections: ConnectionRegistry,
}

async fn prepare_execution(state: &ServiceState, execution_id: uuid::Uuid, organization_id: uuid::Uuid) -> Result<PreparedExecution, ServiceError> {
    let mut conn = state.pg_client().get_connection().await?;

    let execution = conn
        .find_execution_in_organization(organization_id, execution_id)
        .await?
        .ok_or_else(|| ServiceError::internal("dequeued execution has no matching record"))?;

    let version = conn
        .find_workflow_version_by_id(execution.workflow_version_id)
        .await?
        .ok_or_else(|| ServiceError::internal("execution references a missing workflow version"))?;

    let workflow: Workflow = serde_json::from_value(version.graph)
        .map_err(|e| ServiceError::internal_with_source("stored workflow graph failed to parse", e))?;
    let graph = CompiledGraph::compile(&workflow).map_err(ServiceError::from)?;

    let connections = state
        .connection_loader()
        .load_organization_connections(organization_id)
        .await
        .map_err(ServiceError::from)?;

    Ok(PreparedExecution { execution, graph, connections })
}

/// Processes a single dequeued execution end to end: prepares the run,
/// dispatches it to the engine, and resolves the lease according to the
/// outcome.
async fn process_lease(state: &ServiceState, lease: ExecutionLease, cancellation: CancellationToken) {
    let execution_id = lease.entry.execution_id;
    let organization_id = lease.entry.organization_id;
    let attempt = lease.entry.attempt;
    let resume_node_id = lease.entry.payload.resume_node_id.clone();
    let resume_state = lease.entry.payload.resume_state.clone();
    let trigger_data = lease.entry.payload.trigger_data.clone();

    let prepared = match prepare_execution(state, execution_id, organization_id).await {
        Ok(prepared) => prepared,
        Err(error) => {
            tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %error, "failed to prepare execution, redelivering");
            let _ = lease.nack_retry(PREP_RETRY_DELAY).await;
            return;
        }
    };

    let resume_from = resume_node_id.as_deref().and_then(|id| id.parse::<NodeId>().ok());

    let ctx = match (resume_state, resume_from) {
        (Some(payload), Some(node_id)) => {
            let mut ctx = ExecutionContext::restore(
                execution_id,
                organization_id,
                prepared.execution.trigger_data.clone(),
                &prepared.execution.node_outputs,
            );
            ctx.seed_output(node_id, payload);
            ctx
        }
        _ => ExecutionContext::new(execution_id, organization_id, trigger_data),
    };

    let now = Timestamp::now();
    let mark_running = UpdateWorkflowExecution {
        status: Some(ExecutionStatus::Running),
        attempt: Some(attempt as i32),
        started_at: Some(Some(now.into())),
        ..Default::default()
    };
    if let Err(error) = update_execution(state, execution_id, mark_running).await {
        tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %error, "failed to mark execution running, redelivering");
        let _ = lease.nack_retry(PREP_RETRY_DELAY).await;
        return;
    }

    let token_refresh = NoopTokenRefreshHandler;
    let outcome = state
        .engine()
        .execute(
            &prepared.graph,
            &prepared.connections,
            &token_refresh,
            QuotaLimits::default(),
            &cancellation,
            ctx,
            resume_from,
        )
        .await;

    match outcome {
        ExecutionOutcome::Completed(ctx) => {
            let update = UpdateWorkflowExecution {
                status: Some(ExecutionStatus::Succeeded),
                node_outputs: Some(ctx.outputs_snapshot()),
                finished_at: Some(Some(Timestamp::now().into())),
                error: Some(None),
                ..Default::default()
            };
            if let Err(error) = update_execution(state, execution_id, update).await {
                tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %error, "failed to persist completed execution");
            }
            let _ = lease.ack().await;
            tracing::info!(target: TRACING_TARGET, execution_id = %execution_id, "execution completed");
        }
        ExecutionOutcome::Waiting { mut context, resume } => {
            if let Err(error) = suspend_execution(state, execution_id, &mut context, &resume).await {
                tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %error, "failed to suspend execution, redelivering");
                let _ = lease.nack_retry(PREP_RETRY_DELAY).await;
                return;
            }
            let _ = lease.ack().await;
            tracing::info!(target: TRACING_TARGET, execution_id = %execution_id, node_id = %resume.node_id, "execution suspended");
        }
        ExecutionOutcome::Failed { context, error } => {
            if error.is_retryable() && !lease.entry.exhausted() {
                let next = lease.entry.next_attempt();
                let update = UpdateWorkflowExecution {
                    status: Some(ExecutionStatus::Queued),
                    attempt: Some(next.attempt as i32),
                    node_outputs: Some(context.outputs_snapshot()),
                    error: Some(Some(error.to_string())),
                    ..Default::default()
                };
                match update_execution(state, execution_id, update).await {
                    Ok(()) => {
                        if let Err(enqueue_error) = state.execution_queue().enqueue(&next).await {
                            tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %enqueue_error, "failed to re-enqueue retried execution");
                        }
                        let _ = lease.ack().await;
                        tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, attempt = next.attempt, error = %error, "execution failed, retrying");
                    }
                    Err(update_error) => {
                        tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %update_error, "failed to persist retry state, redelivering");
                        let _ = lease.nack_retry(PREP_RETRY_DELAY).await;
                    }
                }
            } else {
                let update = UpdateWorkflowExecution {
                    status: Some(ExecutionStatus::Failed),
                    node_outputs: Some(context.outputs_snapshot()),
                    error: Some(Some(error.to_string())),
                    finished_at: Some(Some(Timestamp::now().into())),
                    ..Default::default()
                };
                if let Err(persist_error) = update_execution(state, execution_id, update).await {
                    tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %persist_error, "failed to persist failed execution");
                }
                let _ = lease.dead_letter().await;
                tracing::warn!(target: TRACING_TARGET, execution_id = %execution_id, error = %error, "execution failed, dead-lettered");
            }
        }
    }
}

/// Mints a resume token for a suspended execution, seeds its signed identity
/// into the suspending wait node's output, and persists the suspension.
async fn suspend_execution(
    state: &ServiceState,
    execution_id: uuid::Uuid,
    context: &mut ExecutionContext,
    resume: &loom_runtime::ResumeState,
) -> Result<(), ServiceError> {
    let mut conn = state.pg_client().get_connection().await?;

    let expires_at = Timestamp::now() + jiff::Span::new().seconds(resume.timeout_seconds);
    let token = conn
        .create_resume_token(NewResumeToken {
            execution_id,
            node_id: resume.node_id.to_string(),
            payload: resume.payload.clone(),
            expires_at: expires_at.into(),
        })
        .await?;

    let signature = sign_resume_token(
        state.auth_keys().secret_bytes(),
        token.id,
        execution_id,
        &token.node_id,
        token.expires_at.into(),
    );

    context.seed_output(
        resume.node_id,
        serde_json::json!({
            "status": "waiting",
            "resume_token_id": token.id,
            "resume_signature": signature,
            "expires_at": expires_at.to_string(),
        }),
    );

    let update = UpdateWorkflowExecution {
        status: Some(ExecutionStatus::Suspended),
        node_outputs: Some(context.outputs_snapshot()),
        ..Default::default()
    };
    conn.update_workflow_execution(execution_id, update).await?;
    Ok(())
}

async fn update_execution(state: &ServiceState, execution_id: uuid::Uuid, update: UpdateWorkflowExecution) -> Result<(), ServiceError> {
    let mut conn = state.pg_client().get_connection().await?;
    conn.update_workflow_execution(execution_id, update).await?;
    Ok(())
}
