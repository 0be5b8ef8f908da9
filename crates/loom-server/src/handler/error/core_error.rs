//! Shared platform error to HTTP error conversion.
//!
//! `loom-webhook` has no error type of its own; its fallible operations
//! (signature verification, replay checks) return [`loom_core::Error`]
//! directly, so this is the conversion the webhook ingress handler relies on.

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for platform error translation.
const TRACING_TARGET: &str = "loom_server::core_error";

impl<'a> From<loom_core::Error> for HttpError<'a> {
    fn from(error: loom_core::Error) -> Self {
        let context = error.source.as_ref().map(|source| source.to_string());

        let kind = match error.kind {
            loom_core::ErrorKind::Validation => ErrorKind::BadRequest,
            loom_core::ErrorKind::Signature => ErrorKind::BadRequest,
            loom_core::ErrorKind::Duplicate => ErrorKind::Conflict,
            loom_core::ErrorKind::MissingReference => ErrorKind::BadRequest,
            loom_core::ErrorKind::ConnectorHttp4xx => ErrorKind::BadRequest,
            loom_core::ErrorKind::QuotaExceeded => ErrorKind::TooManyRequests,
            loom_core::ErrorKind::RateLimited => ErrorKind::TooManyRequests,
            loom_core::ErrorKind::ConnectorHttp5xx
            | loom_core::ErrorKind::ConnectorTimeout
            | loom_core::ErrorKind::ConnectorNetwork
            | loom_core::ErrorKind::TokenRefreshFailed
            | loom_core::ErrorKind::QueueUnavailable
            | loom_core::ErrorKind::SchedulerLockLost
            | loom_core::ErrorKind::ExecutionTimeout
            | loom_core::ErrorKind::Internal => ErrorKind::InternalServerError,
        };

        let message = match error.kind {
            loom_core::ErrorKind::Signature => Some("Webhook signature verification failed"),
            loom_core::ErrorKind::Duplicate => Some("Duplicate delivery"),
            loom_core::ErrorKind::QuotaExceeded => Some("Organization execution quota exceeded"),
            loom_core::ErrorKind::RateLimited => Some("Rate limited"),
            _ => None,
        };

        if kind != ErrorKind::InternalServerError {
            tracing::warn!(target: TRACING_TARGET, kind = ?error.kind, "rejected request");
        } else {
            tracing::error!(target: TRACING_TARGET, kind = ?error.kind, "internal platform error");
        }

        let mut http_error = kind.into_error();
        if let Some(message) = message {
            http_error = http_error.with_message(message);
        }
        if let Some(context) = context {
            http_error = http_error.with_context(context);
        }
        http_error
    }
}
