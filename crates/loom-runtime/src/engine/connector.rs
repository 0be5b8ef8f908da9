//! Connector dispatch: invoking app-specific operations from action nodes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::definition::NodeId;
use crate::error::{Error, Result};

/// Everything a [`Connector`] needs to execute a single operation.
#[derive(Debug, Clone)]
pub struct ConnectorRequest {
    /// The app-specific operation identifier (e.g. `"post_message"`).
    pub operation_id: String,
    /// Resolved operation parameters.
    pub parameters: serde_json::Value,
    /// Decrypted credentials, if the operation requires auth.
    pub credentials: Option<serde_json::Value>,
    /// The execution this call belongs to.
    pub execution_id: Uuid,
    /// The action node making this call.
    pub node_id: NodeId,
}

impl ConnectorRequest {
    /// `executionId + ":" + nodeId`, which connectors MUST propagate to their
    /// SaaS APIs where supported so retried calls are deduplicated upstream.
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}", self.execution_id, self.node_id)
    }
}

/// The result of a connector call: the operation's output plus any
/// token-level usage to record against the organization's quota.
#[derive(Debug, Clone, Default)]
pub struct ConnectorResponse {
    /// The operation's JSON output, recorded as the node's result.
    pub output: serde_json::Value,
    /// Tokens consumed by this call, if the connector reports usage (e.g. an
    /// LLM completion connector). Zero for connectors with no token concept.
    pub tokens_used: u64,
    /// Rotated credentials, if the connector refreshed an OAuth2 token while
    /// servicing this call. The caller must persist these via
    /// [`super::connection::TokenRefreshHandler`].
    pub refreshed_credentials: Option<serde_json::Value>,
}

impl ConnectorResponse {
    /// Wraps a bare output value with no reported token usage.
    pub fn new(output: serde_json::Value) -> Self {
        Self {
            output,
            tokens_used: 0,
            refreshed_credentials: None,
        }
    }
}

/// Everything a [`Connector`] needs to check a polling trigger for new events.
#[derive(Debug, Clone)]
pub struct PollRequest {
    /// The trigger this poll attempt belongs to.
    pub trigger_id: Uuid,
    /// Owning organization, for credential/quota scoping.
    pub organization_id: Uuid,
    /// Opaque cursor from the trigger's last successful poll, if any.
    pub cursor: Option<serde_json::Value>,
    /// Decrypted credentials, if the trigger's app requires auth to poll.
    pub credentials: Option<serde_json::Value>,
}

/// The result of a poll attempt: new events in connector-reported order,
/// plus the cursor to persist for the next poll.
#[derive(Debug, Clone, Default)]
pub struct PollResponse {
    /// Newly observed events, oldest first.
    pub events: Vec<serde_json::Value>,
    /// Cursor to persist against the trigger for the next poll attempt.
    pub cursor: Option<serde_json::Value>,
}

/// A connector executes operations against one external app (e.g. `"slack"`).
#[async_trait]
pub trait Connector: Send + Sync {
    /// Executes `request.operation_id` and returns its output.
    ///
    /// Implementations should map transport failures to [`Error::NodeFailed`]
    /// with `retryable` reflecting whether the node's retry policy applies
    /// (e.g. a 5xx or timeout is retryable; a 4xx validation error is not).
    async fn execute(&self, request: ConnectorRequest) -> Result<ConnectorResponse>;

    /// Checks for new events since `request.cursor`. Connectors with no
    /// polling-trigger support can rely on the default, which reports no
    /// new events and leaves the cursor untouched.
    async fn poll(&self, request: PollRequest) -> Result<PollResponse> {
        let _ = request;
        Ok(PollResponse::default())
    }
}

/// Looks up a [`Connector`] implementation by app id.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("apps", &self.connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConnectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector implementation under `app_id`.
    pub fn register(&mut self, app_id: impl Into<String>, connector: Arc<dyn Connector>) {
        self.connectors.insert(app_id.into(), connector);
    }

    /// Dispatches `request` to the connector registered for `app_id`.
    pub async fn execute(
        &self,
        app_id: &str,
        request: ConnectorRequest,
    ) -> Result<ConnectorResponse> {
        let connector = self.connectors.get(app_id).ok_or_else(|| {
            Error::InvalidNodeConfig {
                node_id: request.node_id,
                message: format!("no connector registered for app {app_id:?}"),
            }
        })?;
        connector.execute(request).await
    }

    /// Dispatches a poll attempt to the connector registered for `app_id`.
    /// Returns an empty [`PollResponse`] if no connector is registered for
    /// `app_id`, rather than failing the polling scheduler's whole tick.
    pub async fn poll(&self, app_id: &str, request: PollRequest) -> Result<PollResponse> {
        match self.connectors.get(app_id) {
            Some(connector) => connector.poll(request).await,
            None => Ok(PollResponse::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoConnector;

    #[async_trait]
    impl Connector for EchoConnector {
        async fn execute(&self, request: ConnectorRequest) -> Result<ConnectorResponse> {
            Ok(ConnectorResponse::new(request.parameters))
        }
    }

    #[tokio::test]
    async fn dispatches_to_the_registered_app() {
        let mut registry = ConnectorRegistry::new();
        registry.register("slack", Arc::new(EchoConnector));

        let request = ConnectorRequest {
            operation_id: "post_message".into(),
            parameters: serde_json::json!({"text": "hi"}),
            credentials: None,
            execution_id: Uuid::now_v7(),
            node_id: NodeId::new(),
        };
        let response = registry.execute("slack", request).await.unwrap();
        assert_eq!(response.output, serde_json::json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn unregistered_app_fails_node_config() {
        let registry = ConnectorRegistry::new();
        let request = ConnectorRequest {
            operation_id: "noop".into(),
            parameters: serde_json::Value::Null,
            credentials: None,
            execution_id: Uuid::now_v7(),
            node_id: NodeId::new(),
        };
        let err = registry.execute("unknown", request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidNodeConfig { .. }));
    }

    #[test]
    fn idempotency_key_combines_execution_and_node() {
        let execution_id = Uuid::now_v7();
        let node_id = NodeId::new();
        let request = ConnectorRequest {
            operation_id: "op".into(),
            parameters: serde_json::Value::Null,
            credentials: None,
            execution_id,
            node_id,
        };
        assert_eq!(
            request.idempotency_key(),
            format!("{execution_id}:{node_id}")
        );
    }
}
