//! NATS error to HTTP error conversion implementation.
//!
//! This module provides conversion from NATS client errors to appropriate HTTP errors
//! with proper status codes and user-friendly messages.

use super::http_error::{Error as HttpError, ErrorKind};

impl<'a> From<loom_nats::Error> for HttpError<'a> {
    fn from(nats_error: loom_nats::Error) -> Self {
        match nats_error {
            loom_nats::Error::Connection(ref source) => ErrorKind::InternalServerError
                .with_message("Service temporarily unavailable")
                .with_context(format!("Unable to reach messaging service: {}", source)),

            loom_nats::Error::Timeout { timeout } => ErrorKind::InternalServerError
                .with_message("Request timed out")
                .with_context(format!("Operation exceeded {:?}", timeout)),

            loom_nats::Error::DeliveryFailed {
                ref subject,
                ref reason,
            } => ErrorKind::InternalServerError
                .with_message("Message delivery failed")
                .with_context(format!("Failed to deliver message to '{}': {}", subject, reason)),

            loom_nats::Error::Serialization(_) => ErrorKind::BadRequest
                .with_message("Invalid request or response data format")
                .with_context("Failed to serialize data for the messaging layer"),

            loom_nats::Error::JobQueueError {
                ref queue,
                ref reason,
            } => ErrorKind::InternalServerError
                .with_message("Execution queue operation failed")
                .with_resource(queue.clone())
                .with_context(reason.clone()),

            loom_nats::Error::ConsumerError {
                ref consumer,
                ref reason,
            } => ErrorKind::InternalServerError
                .with_message("Consumer operation failed")
                .with_resource(consumer.clone())
                .with_context(reason.clone()),

            loom_nats::Error::Operation {
                ref operation,
                ref details,
            } => ErrorKind::InternalServerError
                .with_message(format!("Operation '{}' failed", operation))
                .with_context(details.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_timeout_conversion() {
        let nats_err = loom_nats::Error::Timeout { timeout: Duration::from_secs(30) };
        let http_err: HttpError = nats_err.into();

        assert_eq!(http_err.kind(), ErrorKind::InternalServerError);
        assert!(http_err.context().unwrap().contains("30s"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let nats_err = loom_nats::Error::Serialization(json_err);
        let http_err: HttpError = nats_err.into();

        assert_eq!(http_err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_job_queue_error_conversion() {
        let nats_err = loom_nats::Error::JobQueueError {
            queue: "executions".to_string(),
            reason: "stream unavailable".to_string(),
        };
        let http_err: HttpError = nats_err.into();

        assert_eq!(http_err.kind(), ErrorKind::InternalServerError);
        assert_eq!(http_err.resource(), Some("executions"));
        assert!(http_err.context().unwrap().contains("stream unavailable"));
    }

    #[test]
    fn test_delivery_failed_conversion() {
        let nats_err = loom_nats::Error::DeliveryFailed {
            subject: "webhooks.deliver".to_string(),
            reason: "no responder".to_string(),
        };
        let http_err: HttpError = nats_err.into();

        assert_eq!(http_err.kind(), ErrorKind::InternalServerError);
        assert!(http_err.context().unwrap().contains("webhooks.deliver"));
    }

    #[test]
    fn test_operation_error_conversion() {
        let nats_err = loom_nats::Error::Operation {
            operation: "lock_acquire".to_string(),
            details: "lease expired".to_string(),
        };
        let http_err: HttpError = nats_err.into();

        assert_eq!(http_err.kind(), ErrorKind::InternalServerError);
        assert!(http_err.message().unwrap().contains("lock_acquire"));
    }
}
