//! Common error type shared across the loom platform crates.
//!
//! Each per-crate error type (`loom-postgres::Error`, `loom-nats::Error`,
//! `loom-webhook::Error`, `loom-runtime::Error`) converts into this one at
//! the service boundary so the server layer can reason about recovery
//! (retry, dead-letter, 4xx vs 5xx) from a single taxonomy.

use std::error::Error as StdError;
use std::time::Duration;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for loom platform operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The specific kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error for additional context.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Creates a new error with the given kind and source error.
    pub fn with_source(kind: ErrorKind, source: BoxedError) -> Self {
        Self {
            kind,
            source: Some(source),
        }
    }

    /// True for errors that should surface as a 4xx response rather than be
    /// retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Validation
                | ErrorKind::Signature
                | ErrorKind::MissingReference
                | ErrorKind::ConnectorHttp4xx
                | ErrorKind::QuotaExceeded
        )
    }

    /// True for errors the caller should retry (node retry policy for
    /// connector failures, provider-supplied backoff for rate limits).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ConnectorHttp5xx
                | ErrorKind::ConnectorTimeout
                | ErrorKind::ConnectorNetwork
                | ErrorKind::RateLimited
                | ErrorKind::QueueUnavailable
        )
    }

    /// Suggested delay before retrying, for errors where `is_retryable` holds.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self.kind {
            ErrorKind::RateLimited => Some(Duration::from_secs(60)),
            ErrorKind::ConnectorHttp5xx => Some(Duration::from_secs(10)),
            ErrorKind::ConnectorTimeout => Some(Duration::from_secs(5)),
            ErrorKind::ConnectorNetwork => Some(Duration::from_secs(5)),
            ErrorKind::QueueUnavailable => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Error kind taxonomy covering ingress, scheduling, queueing, and runtime
/// node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Request body or query parameters failed validation. Reported 4xx,
    /// never retried.
    #[error("validation failed")]
    Validation,

    /// Webhook signature verification failed. Reported 400, logged, never
    /// retried.
    #[error("signature verification failed")]
    Signature,

    /// A duplicate delivery was absorbed at ingress. Reported 2xx.
    #[error("duplicate delivery")]
    Duplicate,

    /// A parameter reference pointed at a node or field that does not exist.
    /// The node fails; the execution fails unless an `onError` edge exists.
    #[error("missing reference")]
    MissingReference,

    /// A connector call failed with a 4xx response. Node fails, not retried.
    #[error("connector returned a client error")]
    ConnectorHttp4xx,

    /// A connector call failed with a 5xx response. Retried per the node's
    /// retry policy, then dead-lettered.
    #[error("connector returned a server error")]
    ConnectorHttp5xx,

    /// A connector call timed out. Retried per the node's retry policy, then
    /// dead-lettered.
    #[error("connector call timed out")]
    ConnectorTimeout,

    /// A connector call failed at the network layer. Retried per the node's
    /// retry policy, then dead-lettered.
    #[error("connector network error")]
    ConnectorNetwork,

    /// The upstream provider signaled a rate limit. Retried with the
    /// provider-supplied or default backoff.
    #[error("rate limited")]
    RateLimited,

    /// The organization's execution quota was exceeded. Node fails, audited,
    /// never retried.
    #[error("quota exceeded")]
    QuotaExceeded,

    /// A connection's credential could not be refreshed. Node fails, the
    /// connection is marked stale.
    #[error("token refresh failed")]
    TokenRefreshFailed,

    /// The execution queue is unavailable. Ingress returns 5xx so the
    /// external provider's own retry policy re-delivers.
    #[error("queue unavailable")]
    QueueUnavailable,

    /// A scheduler lock lease was lost mid-tick. The current tick aborts;
    /// the next tick re-acquires.
    #[error("scheduler lock lost")]
    SchedulerLockLost,

    /// An execution ran past its configured timeout and was terminated.
    #[error("execution timed out")]
    ExecutionTimeout,

    /// An unexpected internal failure. Execution terminated `failed`; alert.
    #[error("internal error")]
    Internal,
}

impl Error {
    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    pub fn signature() -> Self {
        Self::new(ErrorKind::Signature)
    }

    pub fn duplicate() -> Self {
        Self::new(ErrorKind::Duplicate)
    }

    pub fn missing_reference() -> Self {
        Self::new(ErrorKind::MissingReference)
    }

    pub fn quota_exceeded() -> Self {
        Self::new(ErrorKind::QuotaExceeded)
    }

    pub fn token_refresh_failed() -> Self {
        Self::new(ErrorKind::TokenRefreshFailed)
    }

    pub fn queue_unavailable() -> Self {
        Self::new(ErrorKind::QueueUnavailable)
    }

    pub fn scheduler_lock_lost() -> Self {
        Self::new(ErrorKind::SchedulerLockLost)
    }

    pub fn execution_timeout() -> Self {
        Self::new(ErrorKind::ExecutionTimeout)
    }

    pub fn internal(source: BoxedError) -> Self {
        Self::with_source(ErrorKind::Internal, source)
    }

    pub fn connector_http_4xx(source: BoxedError) -> Self {
        Self::with_source(ErrorKind::ConnectorHttp4xx, source)
    }

    pub fn connector_http_5xx(source: BoxedError) -> Self {
        Self::with_source(ErrorKind::ConnectorHttp5xx, source)
    }

    pub fn connector_timeout() -> Self {
        Self::new(ErrorKind::ConnectorTimeout)
    }

    pub fn connector_network(source: BoxedError) -> Self {
        Self::with_source(ErrorKind::ConnectorNetwork, source)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorKind::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_5xx_is_retryable_with_backoff() {
        let err = Error::new(ErrorKind::ConnectorHttp5xx);
        assert!(err.is_retryable());
        assert!(err.retry_delay().is_some());
    }

    #[test]
    fn quota_exceeded_is_a_client_error_and_not_retryable() {
        let err = Error::quota_exceeded();
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_has_no_retry_delay() {
        let err = Error::validation();
        assert!(err.retry_delay().is_none());
    }
}
