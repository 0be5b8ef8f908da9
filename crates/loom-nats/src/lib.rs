#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! NATS client for the loom workflow automation platform.
//!
//! This crate provides a task-focused NATS/JetStream client with specialized modules for:
//! - **Client**: Connection management and configuration
//! - **KV**: Dedupe ledger, scheduler locks, and cache-aside reads on NATS KV
//! - **Queue**: Durable, priority-ordered execution queue for workflow runs
//!
//! # Architecture
//!
//! Each module provides focused operations for specific use cases while maintaining
//! access to the underlying NATS client for extensibility.

use std::time::Duration;

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "loom_nats::client";
pub const TRACING_TARGET_KV: &str = "loom_nats::kv";
pub const TRACING_TARGET_QUEUE: &str = "loom_nats::queue";
pub const TRACING_TARGET_CONNECTION: &str = "loom_nats::connection";

pub mod client;
pub mod kv;
pub mod queue;

// Re-export key types
pub use async_nats::Error as NatsError;
pub use client::{NatsClient, NatsConfig, NatsConnection, NatsCredentials, NatsTlsConfig};
pub use kv::{CacheStore, DedupeOutcome, DedupeStore, KvSchedulerLock, KvStore, Lease};
pub use queue::{ExecutionEntry, ExecutionLease, ExecutionPayload, ExecutionQueue, QueuePriority, TriggerKind};

/// Result type for all NATS operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for NATS operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// NATS client/connection errors
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// Serialization errors when sending messages
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation timeout
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Message delivery failed
    #[error("Message delivery failed to subject '{subject}': {reason}")]
    DeliveryFailed { subject: String, reason: String },

    /// Execution queue operation failed
    #[error("Execution queue error on '{queue}': {reason}")]
    JobQueueError { queue: String, reason: String },

    /// Consumer operation failed
    #[error("Consumer '{consumer}' error: {reason}")]
    ConsumerError { consumer: String, reason: String },

    /// Generic operation error with context
    #[error("NATS operation failed: {operation} - {details}")]
    Operation { operation: String, details: String },
}

impl Error {
    /// Check if this error indicates a temporary failure that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Timeout { .. } | Error::DeliveryFailed { .. }
        )
    }

    /// Get the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Connection(_) => "connection",
            Error::Serialization(_) => "serialization",
            Error::Timeout { .. } => "timeout",
            Error::DeliveryFailed { .. } => "delivery",
            Error::JobQueueError { .. } => "execution_queue",
            Error::ConsumerError { .. } => "consumer",
            Error::Operation { .. } => "operation",
        }
    }

    /// Create a delivery failed error
    pub fn delivery_failed(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create an execution queue error
    pub fn job_queue_error(queue: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::JobQueueError {
            queue: queue.into(),
            reason: reason.into(),
        }
    }

    /// Create a consumer error
    pub fn consumer_error(consumer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConsumerError {
            consumer: consumer.into(),
            reason: reason.into(),
        }
    }

    /// Create an operation error with context
    pub fn operation(op: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Operation {
            operation: op.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let conn_err = Error::Connection(async_nats::Error::new(
            async_nats::ErrorKind::Other,
            Some("test error"),
        ));
        assert_eq!(conn_err.category(), "connection");
        assert!(conn_err.is_retryable());

        let queue_err = Error::job_queue_error("EXECUTIONS", "stream not found");
        assert_eq!(queue_err.category(), "execution_queue");
        assert!(!queue_err.is_retryable());
    }
}
