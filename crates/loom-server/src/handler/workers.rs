//! Worker fleet and execution queue status.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use jiff::{SignedDuration, Timestamp};
use loom_nats::ExecutionQueue;
use loom_postgres::query::WorkerHeartbeatRepository;

use super::response::{QueueDepth, WorkerHeartbeatEntry, WorkersStatus};
use crate::extract::{Json, PgPool};
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for worker status operations.
const TRACING_TARGET: &str = "loom_server::handler::workers";

/// Threshold past which a worker's most recent heartbeat is reported stale.
const STALE_THRESHOLD: SignedDuration = SignedDuration::from_secs(120);

/// Returns the worker fleet's heartbeats and per-priority queue depth.
#[tracing::instrument(skip_all)]
async fn workers_status(
    State(queue): State<Arc<ExecutionQueue>>,
    PgPool(mut conn): PgPool,
) -> Result<Json<WorkersStatus>> {
    let now = Timestamp::now();

    let heartbeats = conn.list_worker_heartbeats().await?;
    let workers = heartbeats
        .into_iter()
        .map(|heartbeat| {
            let is_stale = now.duration_since(heartbeat.last_beat_at.into()) > STALE_THRESHOLD;
            WorkerHeartbeatEntry::from_model(heartbeat, is_stale)
        })
        .collect();

    let queue_depth = queue
        .queue_depth()
        .await?
        .into_iter()
        .map(|(priority, pending)| QueueDepth { priority: priority.to_string(), pending })
        .collect();

    tracing::debug!(target: TRACING_TARGET, "reported worker fleet status");

    Ok(Json(WorkersStatus { workers, queue_depth }))
}

fn workers_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Worker fleet status")
        .description("Returns every known worker's most recent heartbeat and per-priority-class queue depth.")
        .response::<200, Json<WorkersStatus>>()
}

/// Returns an [`ApiRouter`] with the worker status route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/workers/status", get_with(workers_status, workers_status_docs))
        .with_path_items(|item| item.tag("Workers"))
}
