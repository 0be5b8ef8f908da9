//! Database query repositories for all entities in the system.
//!
//! This module contains repository implementations that provide high-level
//! database operations for all entities, encapsulating common patterns
//! and providing type-safe interfaces.
//!
//! # Pagination
//!
//! All queries that may return large result sets use [`crate::types::OffsetPagination`]
//! or [`crate::types::CursorPagination`] to provide consistent, bounded pagination
//! across the system.

pub mod connection;
pub mod dedupe_entry;
pub mod organization;
pub mod resume_token;
pub mod scheduler_lock;
pub mod webhook_log;
pub mod worker_heartbeat;
pub mod workflow;
pub mod workflow_execution;
pub mod workflow_trigger;
pub mod workflow_version;

pub use connection::ConnectionRepository;
pub use dedupe_entry::DedupeEntryRepository;
pub use organization::OrganizationRepository;
pub use resume_token::ResumeTokenRepository;
pub use scheduler_lock::SchedulerLockRepository;
pub use webhook_log::WebhookLogRepository;
pub use worker_heartbeat::WorkerHeartbeatRepository;
pub use workflow::WorkflowRepository;
pub use workflow_execution::WorkflowExecutionRepository;
pub use workflow_trigger::WorkflowTriggerRepository;
pub use workflow_version::WorkflowVersionRepository;
