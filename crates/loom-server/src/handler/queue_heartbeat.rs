//! Public, unauthenticated liveness probe over the worker fleet.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use jiff::{SignedDuration, Timestamp};
use loom_postgres::query::WorkerHeartbeatRepository;

use super::response::{QueueHeartbeat, QueueHeartbeatStatus};
use crate::extract::{Json, PgPool};
use crate::handler::Result;
use crate::service::ServiceState;

/// Threshold past which the absence of a recent heartbeat is reported as degraded.
const STALE_THRESHOLD: SignedDuration = SignedDuration::from_secs(120);

/// Reports whether any worker has beaten recently.
async fn queue_heartbeat(PgPool(mut conn): PgPool) -> Result<Json<QueueHeartbeat>> {
    let now = Timestamp::now();
    let heartbeats = conn.list_worker_heartbeats().await?;

    let latest_heartbeat_at = heartbeats.into_iter().map(|h| Timestamp::from(h.last_beat_at)).max();

    let status = match latest_heartbeat_at {
        Some(latest) if now.duration_since(latest) <= STALE_THRESHOLD => QueueHeartbeatStatus::Ok,
        _ => QueueHeartbeatStatus::Degraded,
    };

    let message = match status {
        QueueHeartbeatStatus::Ok => "worker fleet is reporting".to_string(),
        QueueHeartbeatStatus::Degraded => "no recent worker heartbeat".to_string(),
    };

    Ok(Json(QueueHeartbeat { status, message, latest_heartbeat_at }))
}

fn queue_heartbeat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Queue heartbeat probe")
        .description("Public health probe reporting whether any worker has beaten recently.")
        .response::<200, Json<QueueHeartbeat>>()
}

/// Returns an [`ApiRouter`] with the public queue heartbeat route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/production/queue/heartbeat", get_with(queue_heartbeat, queue_heartbeat_docs))
        .with_path_items(|item| item.tag("Workers"))
}
