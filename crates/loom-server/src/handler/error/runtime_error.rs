//! Workflow execution error to HTTP error conversion implementation.

use super::http_error::{Error as HttpError, ErrorKind};

impl<'a> From<loom_runtime::Error> for HttpError<'a> {
    fn from(runtime_error: loom_runtime::Error) -> Self {
        match runtime_error {
            loom_runtime::Error::InvalidDefinition(ref message) => ErrorKind::BadRequest
                .with_message("Invalid workflow definition")
                .with_context(message.clone()),

            loom_runtime::Error::CycleDetected(node_id) => ErrorKind::BadRequest
                .with_message("Workflow definition contains a cycle")
                .with_context(format!("cycle through node {}", node_id)),

            loom_runtime::Error::InvalidNodeConfig {
                ref node_id,
                ref message,
            } => ErrorKind::BadRequest
                .with_message("Invalid node configuration")
                .with_context(format!("node {}: {}", node_id, message)),

            loom_runtime::Error::MissingReference {
                ref node_id,
                ref referenced,
                ref path,
            } => ErrorKind::BadRequest
                .with_message("Workflow references an unresolvable path")
                .with_context(format!("node {} references {:?} on node {}", node_id, path, referenced)),

            loom_runtime::Error::CredentialsNotFound(connection_id) => ErrorKind::BadRequest
                .with_message("Connection not found")
                .with_resource(connection_id.to_string())
                .with_context("The workflow references a connection that does not exist"),

            loom_runtime::Error::TokenRefreshFailed(connection_id) => ErrorKind::InternalServerError
                .with_message("Failed to refresh connection credentials")
                .with_resource(connection_id.to_string()),

            loom_runtime::Error::NodeFailed {
                ref node_id,
                ref message,
                ..
            } => ErrorKind::InternalServerError
                .with_message("Workflow execution failed")
                .with_context(format!("node {}: {}", node_id, message)),

            loom_runtime::Error::QuotaExceeded {
                organization_id,
                ref limit,
            } => ErrorKind::TooManyRequests
                .with_message("Execution quota exceeded")
                .with_resource(organization_id.to_string())
                .with_context(limit.clone()),

            loom_runtime::Error::Cancelled => ErrorKind::Conflict
                .with_message("Workflow execution was cancelled"),

            loom_runtime::Error::Timeout => ErrorKind::InternalServerError
                .with_message("Workflow execution timed out"),

            loom_runtime::Error::Storage(pg_error) => pg_error.into(),

            loom_runtime::Error::Encryption(ref source) => {
                tracing::error!(target: "loom_server::runtime", error = %source, "credential encryption error");
                ErrorKind::InternalServerError.into_error()
            }

            loom_runtime::Error::Serialization(_) => ErrorKind::BadRequest
                .with_message("Invalid request or response data format"),

            loom_runtime::Error::Internal(ref message) => {
                tracing::error!(target: "loom_server::runtime", error = %message, "internal runtime error");
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_conversion() {
        let runtime_error = loom_runtime::Error::QuotaExceeded {
            organization_id: uuid::Uuid::nil(),
            limit: "max_concurrent_runs".to_string(),
        };
        let http_error: HttpError = runtime_error.into();

        assert_eq!(http_error.kind(), ErrorKind::TooManyRequests);
    }

    #[test]
    fn test_cancelled_conversion() {
        let http_error: HttpError = loom_runtime::Error::Cancelled.into();
        assert_eq!(http_error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_invalid_definition_conversion() {
        let runtime_error = loom_runtime::Error::InvalidDefinition("dangling edge".to_string());
        let http_error: HttpError = runtime_error.into();

        assert_eq!(http_error.kind(), ErrorKind::BadRequest);
        assert!(http_error.context().unwrap().contains("dangling edge"));
    }
}
