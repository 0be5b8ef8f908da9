//! Durable execution queue: entry shape, priority classes, and the
//! JetStream-backed work-queue stream workers dequeue from.

mod entry;
mod execution;

pub use entry::{ExecutionEntry, ExecutionPayload, QueuePriority, TriggerKind};
pub use execution::{ExecutionLease, ExecutionQueue};
