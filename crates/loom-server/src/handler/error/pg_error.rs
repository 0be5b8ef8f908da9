//! Constraint violation to HTTP error conversion handlers.
//!
//! This module converts PostgreSQL errors and constraint violations into
//! appropriate HTTP error responses.

use loom_postgres::PgError;
use loom_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

/// Tracing target for postgres error translation.
const TRACING_TARGET: &str = "loom_server::postgres_constraints";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        let message = constraint.to_string();
        match constraint {
            ConstraintViolation::Organization(_) => ErrorKind::BadRequest
                .with_message("Invalid organization reference")
                .with_context(message),
            ConstraintViolation::Connection(_) => ErrorKind::BadRequest
                .with_message("Invalid connection reference")
                .with_context(message),
            ConstraintViolation::Workflow(_) => ErrorKind::BadRequest
                .with_message("Invalid workflow reference")
                .with_context(message),
            ConstraintViolation::WorkflowVersion(_) => ErrorKind::BadRequest
                .with_message("Invalid workflow version")
                .with_context(message),
            ConstraintViolation::WorkflowTrigger(_) => ErrorKind::BadRequest
                .with_message("Invalid workflow trigger")
                .with_context(message),
            ConstraintViolation::WebhookLog(_) => ErrorKind::Conflict
                .with_message("Duplicate webhook delivery")
                .with_context(message),
            ConstraintViolation::WorkflowExecution(_) => ErrorKind::BadRequest
                .with_message("Invalid execution state")
                .with_context(message),
            ConstraintViolation::ResumeToken(_) => ErrorKind::Gone
                .with_message("Resume token is invalid or already consumed")
                .with_context(message),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(ref config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(ref connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(ref migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if let Some(constraint) = error.constraint_violation() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = %constraint,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(ref unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
