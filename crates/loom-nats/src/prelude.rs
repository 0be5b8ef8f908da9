//! Prelude module for loom-nats.
//!
//! This module re-exports the most commonly used types and traits from loom-nats,
//! making it easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use loom_nats::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = NatsConfig::new("nats://localhost:4222", "my-token");
//! let client = NatsClient::connect(config).await?;
//! # Ok(())
//! # }
//! ```

// Client types
pub use crate::client::{NatsClient, NatsConfig, NatsConnection};
// Key-Value store types: cache, dedupe ledger, scheduler locks
pub use crate::kv::{CacheStore, DedupeOutcome, DedupeStore, KvSchedulerLock, KvStore, Lease};
// Execution queue types
pub use crate::queue::{
    ExecutionEntry, ExecutionLease, ExecutionPayload, ExecutionQueue, QueuePriority, TriggerKind,
};
// Error types
pub use crate::{Error, Result};
