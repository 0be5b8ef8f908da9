//! Centralized tracing target constants for structured logging.
//!
//! This module defines all tracing target strings used throughout the crate,
//! providing a single source of truth for log categorization and filtering.
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters.

/// Authentication-related operations including token validation and JWT processing.
pub const AUTHENTICATION: &str = "loom_server::authentication";

/// Authorization checks including organization-scope verification and access control.
pub const AUTHORIZATION: &str = "loom_server::authorization";

/// Request metrics and performance monitoring.
pub const METRICS: &str = "loom_server::metrics";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "loom_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const RECOVERY_PANIC: &str = "loom_server::recovery::panic";

/// JWT signing key management operations.
pub const SESSION_KEYS: &str = "loom_server::session_keys";

/// Health check caching and service availability monitoring.
pub const HEALTH_CACHE: &str = "loom_server::health_cache";
