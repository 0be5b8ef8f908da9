//! Execution queue entry: the durable, on-the-wire unit dequeued by workers.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use uuid::Uuid;

/// How an execution entered the queue; determines which producer attaches
/// `triggerData` and whether `resumeState` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Webhook,
    Polling,
    Manual,
    Resume,
}

/// Priority class. Ordering matches queue dequeue preference: `Resume` and
/// `Manual` entries always preempt `Default` ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueuePriority {
    Default = 0,
    Manual = 1,
    Resume = 2,
}

impl QueuePriority {
    /// JetStream subject suffix used to route this priority class to its own
    /// consumer so higher classes can be drained first.
    pub fn subject_suffix(self) -> &'static str {
        match self {
            QueuePriority::Default => "default",
            QueuePriority::Manual => "manual",
            QueuePriority::Resume => "resume",
        }
    }
}

/// Payload carried by a queue entry: what the Workflow Runtime needs to run
/// (or resume) an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub trigger_type: TriggerKind,
    pub trigger_data: Value,
    pub resume_state: Option<Value>,
    /// The wait node a resumed execution continues at. Always `Some` when
    /// `resume_state` is `Some`, and ignored otherwise.
    pub resume_node_id: Option<String>,
}

/// The durable, opaque-but-stable queue entry described in the external
/// interfaces: `{executionId, workflowId, organizationId, priority, attempt,
/// enqueuedAt, payload}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEntry {
    pub execution_id: Uuid,
    pub workflow_id: Uuid,
    pub organization_id: Uuid,
    pub priority: QueuePriority,
    pub attempt: u32,
    pub max_attempts: u32,
    pub enqueued_at: Timestamp,
    pub payload: ExecutionPayload,
}

impl ExecutionEntry {
    pub fn new(
        execution_id: Uuid,
        workflow_id: Uuid,
        organization_id: Uuid,
        priority: QueuePriority,
        payload: ExecutionPayload,
    ) -> Self {
        Self {
            execution_id,
            workflow_id,
            organization_id,
            priority,
            attempt: 1,
            max_attempts: 5,
            enqueued_at: Timestamp::now(),
            payload,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// True once `attempt` has exhausted `max_attempts` — the entry belongs
    /// in the dead-letter queue rather than being re-enqueued.
    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Next entry to re-enqueue after a `nack`, with `attempt` incremented.
    pub fn next_attempt(&self) -> Self {
        let mut next = self.clone();
        next.attempt += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ExecutionPayload {
        ExecutionPayload {
            trigger_type: TriggerKind::Webhook,
            trigger_data: serde_json::json!({"event": "X"}),
            resume_state: None,
            resume_node_id: None,
        }
    }

    #[test]
    fn priority_ordering_prefers_resume_then_manual() {
        assert!(QueuePriority::Resume > QueuePriority::Manual);
        assert!(QueuePriority::Manual > QueuePriority::Default);
    }

    #[test]
    fn attempt_tracking() {
        let entry = ExecutionEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            QueuePriority::Default,
            payload(),
        )
        .with_max_attempts(3);

        assert!(!entry.exhausted());
        let second = entry.next_attempt();
        assert_eq!(second.attempt, 2);
        let third = second.next_attempt();
        assert!(third.exhausted());
    }

    #[test]
    fn subject_suffix_matches_priority() {
        assert_eq!(QueuePriority::Resume.subject_suffix(), "resume");
        assert_eq!(QueuePriority::Default.subject_suffix(), "default");
    }
}
