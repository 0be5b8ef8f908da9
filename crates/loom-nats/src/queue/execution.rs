//! Durable, at-least-once execution queue backed by a JetStream work-queue stream.
//!
//! One consumer is bound per priority class so `dequeue` can drain `resume`
//! and `manual` entries ahead of `default` ones, matching the FIFO-within-
//! priority-class ordering guarantee.

use std::time::Duration;

use async_nats::jetstream::{self, AckKind, consumer::PullConsumer, stream};
use futures::StreamExt;
use tracing::{debug, instrument, warn};

use super::entry::{ExecutionEntry, QueuePriority};
use crate::{Error, Result, TRACING_TARGET_QUEUE};

const STREAM_NAME: &str = "EXECUTIONS";
const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(120);

/// A claimed queue entry bound to an underlying JetStream message. Exactly
/// one worker may `ack`/`nack` a given lease; the visibility timeout returns
/// the entry to the queue if the worker never responds (crash, panic).
pub struct ExecutionLease {
    pub entry: ExecutionEntry,
    message: jetstream::Message,
}

impl ExecutionLease {
    /// Mark the entry done; removes it from the stream permanently.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn ack(self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| Error::operation("execution_ack", e.to_string()))?;
        debug!(target: TRACING_TARGET_QUEUE, execution_id = %self.entry.execution_id, "execution acked");
        Ok(())
    }

    /// Re-deliver the entry after `delay`, for a retryable node/connector failure.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn nack_retry(self, delay: Duration) -> Result<()> {
        self.message
            .ack_with(AckKind::Nak(Some(delay)))
            .await
            .map_err(|e| Error::operation("execution_nack", e.to_string()))?;
        warn!(target: TRACING_TARGET_QUEUE, execution_id = %self.entry.execution_id, delay_ms = delay.as_millis() as u64, "execution nacked for retry");
        Ok(())
    }

    /// Terminate the entry: acks the message (removing it from the live
    /// stream) after the caller has persisted it to the dead-letter table
    /// and flipped the Execution Record to `failed`.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn dead_letter(self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| Error::operation("execution_dead_letter", e.to_string()))?;
        warn!(target: TRACING_TARGET_QUEUE, execution_id = %self.entry.execution_id, attempt = self.entry.attempt, "execution dead-lettered");
        Ok(())
    }
}

/// Durable FIFO-per-priority-class execution queue.
pub struct ExecutionQueue {
    jetstream: jetstream::Context,
    worker_id: String,
    consumers: tokio::sync::Mutex<Vec<(QueuePriority, PullConsumer)>>,
}

impl ExecutionQueue {
    #[instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context, worker_id: &str) -> Result<Self> {
        let config = stream::Config {
            name: STREAM_NAME.to_string(),
            description: Some("Durable workflow execution queue".to_string()),
            subjects: vec!["executions.>".to_string()],
            retention: stream::RetentionPolicy::WorkQueue,
            ..Default::default()
        };

        let stream = match jetstream.get_stream(STREAM_NAME).await {
            Ok(stream) => stream,
            Err(_) => jetstream
                .create_stream(config)
                .await
                .map_err(|e| Error::operation("execution_stream_create", e.to_string()))?,
        };

        let mut consumers = Vec::new();
        for priority in [QueuePriority::Resume, QueuePriority::Manual, QueuePriority::Default] {
            let suffix = priority.subject_suffix();
            let consumer_name = format!("worker_{worker_id}_{suffix}");
            let consumer_config = jetstream::consumer::pull::Config {
                name: Some(consumer_name.clone()),
                durable_name: Some(consumer_name.clone()),
                filter_subject: format!("executions.{suffix}"),
                ack_wait: VISIBILITY_TIMEOUT,
                max_deliver: 5,
                ..Default::default()
            };
            let consumer = stream
                .create_consumer(consumer_config)
                .await
                .map_err(|e| Error::consumer_error(&consumer_name, e.to_string()))?;
            consumers.push((priority, consumer));
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            worker_id: worker_id.to_string(),
            consumers: tokio::sync::Mutex::new(consumers),
        })
    }

    fn subject(priority: QueuePriority) -> String {
        format!("executions.{}", priority.subject_suffix())
    }

    /// Persist and publish a new execution entry. Idempotent when the
    /// caller supplies a stable `execution_id` (used by `enqueue_resume`).
    #[instrument(skip(self, entry), target = TRACING_TARGET_QUEUE)]
    pub async fn enqueue(&self, entry: &ExecutionEntry) -> Result<()> {
        let subject = Self::subject(entry.priority);
        let payload = serde_json::to_vec(entry)?;

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| Error::delivery_failed(&subject, e.to_string()))?
            .await
            .map_err(|e| Error::operation("execution_enqueue", e.to_string()))?;

        debug!(
            target: TRACING_TARGET_QUEUE,
            execution_id = %entry.execution_id,
            workflow_id = %entry.workflow_id,
            priority = %entry.priority,
            subject = %subject,
            "enqueued execution"
        );
        Ok(())
    }

    /// Returns the number of pending (undelivered) messages per priority
    /// class, for the `GET /workers/status` queue depth summary.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn queue_depth(&self) -> Result<Vec<(QueuePriority, u64)>> {
        let mut consumers = self.consumers.lock().await;
        let mut depths = Vec::with_capacity(consumers.len());
        for (priority, consumer) in consumers.iter_mut() {
            let info = consumer
                .info()
                .await
                .map_err(|e| Error::operation("execution_queue_depth", e.to_string()))?;
            depths.push((*priority, info.num_pending));
        }
        Ok(depths)
    }

    /// Atomically claim the oldest ready entry, preferring higher priority
    /// classes. Returns `None` if every consumer is currently empty.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn dequeue(&self) -> Result<Option<ExecutionLease>> {
        let consumers = self.consumers.lock().await;
        for (priority, consumer) in consumers.iter() {
            let mut messages = consumer
                .fetch()
                .max_messages(1)
                .messages()
                .await
                .map_err(|e| Error::operation("execution_fetch", e.to_string()))?;

            if let Some(Ok(message)) = messages.next().await {
                let entry: ExecutionEntry = match serde_json::from_slice(&message.payload) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(target: TRACING_TARGET_QUEUE, error = %e, worker_id = %self.worker_id, "dropping malformed execution entry");
                        message.ack().await.ok();
                        continue;
                    }
                };
                debug!(
                    target: TRACING_TARGET_QUEUE,
                    execution_id = %entry.execution_id,
                    priority = %priority,
                    worker_id = %self.worker_id,
                    "dequeued execution"
                );
                return Ok(Some(ExecutionLease { entry, message }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_matches_priority_suffix() {
        assert_eq!(ExecutionQueue::subject(QueuePriority::Resume), "executions.resume");
        assert_eq!(ExecutionQueue::subject(QueuePriority::Default), "executions.default");
    }
}
