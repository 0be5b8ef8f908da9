//! Workflow execution error types.

use thiserror::Error;
use uuid::Uuid;

use crate::definition::NodeId;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling or executing a workflow graph.
///
/// This converts into [`loom_core::Error`] at the service boundary, the same
/// way [`loom_postgres::PgError`] and `loom-nats`'s error type do.
#[derive(Debug, Error)]
pub enum Error {
    /// Workflow definition is structurally invalid (dangling edge, unknown
    /// branch, empty graph).
    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),

    /// The graph contains a cycle not contained within a single loop node's body.
    #[error("workflow graph contains a cycle through node {0}")]
    CycleDetected(NodeId),

    /// Node configuration is invalid.
    #[error("invalid config for node {node_id}: {message}")]
    InvalidNodeConfig {
        /// ID of the node with invalid config.
        node_id: NodeId,
        /// Error message.
        message: String,
    },

    /// A `ref` parameter pointed at a node or JSON path that does not exist.
    #[error("node {node_id} references unknown path {path:?} on node {referenced}")]
    MissingReference {
        /// The node whose parameter contained the dangling reference.
        node_id: NodeId,
        /// The node that was referenced.
        referenced: NodeId,
        /// The JSON path that could not be resolved.
        path: String,
    },

    /// No connection was registered for a connection id an action node referenced.
    #[error("connection {0} not found")]
    CredentialsNotFound(Uuid),

    /// A connection's credential could not be refreshed.
    #[error("token refresh failed for connection {0}")]
    TokenRefreshFailed(Uuid),

    /// A connector call failed.
    #[error("node {node_id} failed: {message}")]
    NodeFailed {
        /// ID of the failed node.
        node_id: NodeId,
        /// Error message.
        message: String,
        /// Whether the node's retry policy should be consulted for another attempt.
        retryable: bool,
    },

    /// The organization's execution quota was exceeded.
    #[error("quota exceeded for organization {organization_id}: {limit}")]
    QuotaExceeded {
        /// The organization whose quota was exceeded.
        organization_id: Uuid,
        /// Human-readable description of the limit that was hit.
        limit: String,
    },

    /// Workflow execution was cancelled.
    #[error("workflow execution cancelled")]
    Cancelled,

    /// Workflow execution timed out.
    #[error("workflow execution timed out")]
    Timeout,

    /// Database operation failed.
    #[error("database error: {0}")]
    Storage(#[from] loom_postgres::PgError),

    /// Credential encryption or decryption failed.
    #[error("encryption error: {0}")]
    Encryption(#[from] loom_core::crypto::CryptoError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns whether this error should be retried per the failing node's
    /// retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::NodeFailed { retryable: true, .. })
    }
}
