//! Constants used throughout the application.

/// Database-related constants.
pub mod database {
    /// Default pagination limit.
    pub const DEFAULT_PAGE_SIZE: i64 = 50;

    /// Maximum pagination limit.
    pub const MAX_PAGE_SIZE: i64 = 1000;
}

/// Constants related to dedupe entries and webhook delivery.
pub mod dedupe {
    /// Default dedupe entry lifetime, in milliseconds.
    pub const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

    /// Maximum number of dedupe entries retained per scope before oldest-by-`created_at`
    /// eviction kicks in.
    pub const SCOPE_CAPACITY: i64 = 500;
}

/// Constants related to webhook signature verification.
pub mod webhook {
    /// Default replay tolerance for a signed delivery timestamp, in seconds.
    pub const DEFAULT_REPLAY_TOLERANCE_SECONDS: i64 = 300;
}

/// Constants related to polling triggers and backoff.
pub mod polling {
    /// Ceiling applied to the exponential backoff delay, in seconds.
    pub const MAX_BACKOFF_SECONDS: i64 = 3600;

    /// Consecutive failures after which a trigger auto-deactivates.
    pub const MAX_CONSECUTIVE_FAILURES: i32 = 10;
}

/// Constants related to workflow execution.
pub mod execution {
    /// Default per-connector-call timeout, in milliseconds.
    pub const DEFAULT_CONNECTOR_TIMEOUT_MS: i64 = 30_000;

    /// Default execution-wide deadline, in milliseconds.
    pub const DEFAULT_EXECUTION_TIMEOUT_MS: i64 = 24 * 60 * 60 * 1000;

    /// Default cap on loop-node iterations.
    pub const DEFAULT_MAX_LOOP_ITERATIONS: i32 = 1000;
}

/// Constants related to worker heartbeats.
pub mod heartbeat {
    /// Default interval between worker heartbeats, in milliseconds.
    pub const DEFAULT_INTERVAL_MS: i64 = 10_000;

    /// Staleness threshold past which a worker is considered unhealthy, in seconds.
    pub const DEFAULT_STALE_THRESHOLD_SECONDS: i64 = 120;
}
