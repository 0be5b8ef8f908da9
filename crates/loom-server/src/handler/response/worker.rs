//! Worker and queue status response types.

use jiff::Timestamp;
use loom_postgres::model::WorkerHeartbeat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single worker's most recent liveness signal.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerHeartbeatEntry {
    pub worker_id: String,
    pub worker_type: String,
    pub last_beat_at: Timestamp,
    /// Whether this worker's heartbeat is older than the staleness threshold.
    pub is_stale: bool,
}

impl WorkerHeartbeatEntry {
    pub fn from_model(model: WorkerHeartbeat, is_stale: bool) -> Self {
        Self {
            worker_id: model.worker_id,
            worker_type: model.worker_type,
            last_beat_at: model.last_beat_at.into(),
            is_stale,
        }
    }
}

/// Queue depth for a single priority class.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueDepth {
    pub priority: String,
    pub pending: u64,
}

/// `GET /workers/status` response: worker heartbeats and queue depth, scoped
/// to the caller's organization is not applicable here since workers and
/// queues are fleet-wide, not per-organization.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkersStatus {
    pub workers: Vec<WorkerHeartbeatEntry>,
    pub queue_depth: Vec<QueueDepth>,
}

/// `GET /production/queue/heartbeat` response: a public, unauthenticated
/// liveness probe over the worker fleet.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueHeartbeat {
    pub status: QueueHeartbeatStatus,
    pub message: String,
    pub latest_heartbeat_at: Option<Timestamp>,
}

/// Coarse status reported by the public queue heartbeat probe.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueueHeartbeatStatus {
    Ok,
    Degraded,
}
