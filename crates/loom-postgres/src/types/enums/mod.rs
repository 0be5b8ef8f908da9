//! Database enumeration types for type-safe queries.
//!
//! This module provides strongly-typed enumerations that correspond to PostgreSQL ENUM types
//! defined in the database schema. Each enumeration provides serialization support for APIs
//! and database integration through Diesel.

mod credential_kind;
mod execution_status;
mod trigger_kind;
mod trigger_status;
mod webhook_log_source;

pub use credential_kind::CredentialKind;
pub use execution_status::ExecutionStatus;
pub use trigger_kind::TriggerKind;
pub use trigger_status::TriggerStatus;
pub use webhook_log_source::WebhookLogSource;
