//! Workflow execution engine: dispatches a compiled graph node by node.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use jiff::Timestamp;
use loom_core::common::Timing;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;

use super::EngineConfig;
use super::connection::{ConnectionRegistry, TokenRefreshHandler};
use super::connector::{ConnectorRegistry, ConnectorRequest};
use super::context::{ExecutionContext, NodeResult, is_truthy};
use super::quota::{QuotaLimits, QuotaTracker};
use crate::definition::{ActionNode, ConditionNode, LoopNode, Node, NodeId, NodeKind, TransformNode, WaitNode};
use crate::error::{Error, Result};
use crate::graph::CompiledGraph;

/// Tracing target for engine operations.
pub const TRACING_TARGET: &str = "loom::runtime::engine";

/// Describes how a suspended execution can be continued later.
///
/// Produced by a `wait` node; the caller is responsible for persisting this
/// as a [`loom_postgres::model::ResumeToken`] and redeeming it by calling
/// [`Engine::execute`] again with `resume_from` set to [`Self::node_id`].
#[derive(Debug, Clone)]
pub struct ResumeState {
    /// The wait node the execution suspended at.
    pub node_id: NodeId,
    /// Opaque payload to deliver back on resume.
    pub payload: Value,
    /// How long the minted resume token should remain valid.
    pub timeout_seconds: i64,
}

/// The terminal, or suspended, outcome of one dispatch attempt.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Every reachable node ran to completion.
    Completed(ExecutionContext),
    /// A wait node suspended the run; it must be resumed via [`ResumeState`].
    Waiting {
        /// Accumulated context up to the suspension point.
        context: ExecutionContext,
        /// How to resume this execution later.
        resume: ResumeState,
    },
    /// A node failed and exhausted its retry policy (or has none).
    Failed {
        /// Accumulated context up to the failure point.
        context: ExecutionContext,
        /// The error that terminated the run.
        error: Error,
    },
}

/// What a single node's dispatch produced, before output propagation.
enum DispatchOutcome {
    /// The node completed; follow every unconditional outbound edge.
    Continue,
    /// A condition node resolved to this branch; only matching edges are followed.
    Branch(String),
    /// A wait node suspended the run.
    Waiting(ResumeState),
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The workflow execution engine.
///
/// Walks a [`CompiledGraph`] in topological order starting from its entry
/// (or a resume point), dispatching each reachable node by kind, resolving
/// parameters and credentials immediately before each action, and enforcing
/// per-organization quotas before every connector call.
pub struct Engine {
    config: EngineConfig,
    semaphore: Arc<Semaphore>,
    connectors: ConnectorRegistry,
    quota: QuotaTracker,
}

impl Engine {
    /// Creates a new engine with the given configuration and connector registry.
    pub fn new(config: EngineConfig, connectors: ConnectorRegistry) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_runs));

        tracing::info!(
            target: TRACING_TARGET,
            max_concurrent_runs = config.max_concurrent_runs,
            execution_timeout_secs = config.execution_timeout.as_secs(),
            "workflow engine initialized"
        );

        Self {
            config,
            semaphore,
            connectors,
            quota: QuotaTracker::new(),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the number of execution slots not currently in use.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Returns the shared quota tracker, so a caller can inspect usage
    /// between executions.
    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Returns the connector registry, so a caller outside action dispatch
    /// (e.g. the polling scheduler) can reach the same registered connectors.
    pub fn connectors(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    /// Runs `ctx` through `graph`, starting at the trigger node, or at
    /// `resume_from` when redeeming a resume token.
    ///
    /// Same `graph`, `ctx.trigger_data()`, and connector responses always
    /// produce identical [`NodeResult`]s modulo timestamps: parameter
    /// resolution is pure over already-captured node outputs.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        graph: &CompiledGraph,
        connections: &ConnectionRegistry,
        token_refresh: &dyn TokenRefreshHandler,
        quota_limits: QuotaLimits,
        cancellation: &CancellationToken,
        mut ctx: ExecutionContext,
        resume_from: Option<NodeId>,
    ) -> ExecutionOutcome {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return ExecutionOutcome::Failed {
                    context: ctx,
                    error: Error::Internal("engine semaphore closed".into()),
                };
            }
        };

        let order = graph.topological_order();
        let start_index = match resume_from {
            None => 0,
            Some(node_id) => match order.iter().position(|id| *id == node_id) {
                Some(idx) => idx,
                None => {
                    return ExecutionOutcome::Failed {
                        context: ctx,
                        error: Error::InvalidDefinition(format!(
                            "resume node {node_id} not found in compiled graph"
                        )),
                    };
                }
            },
        };

        let start_node = match resume_from {
            Some(node_id) => node_id,
            None => graph.entry_node(),
        };

        let mut reachable = std::collections::HashSet::new();
        reachable.insert(start_node);

        let deadline = Instant::now() + self.config.execution_timeout;

        tracing::debug!(
            target: TRACING_TARGET,
            execution_id = %ctx.execution_id,
            node_count = order.len() - start_index,
            "starting workflow execution"
        );

        for (index, &node_id) in order[start_index..].iter().enumerate() {
            if !reachable.contains(&node_id) {
                continue;
            }
            if cancellation.is_cancelled() {
                return ExecutionOutcome::Failed {
                    context: ctx,
                    error: Error::Cancelled,
                };
            }
            if Instant::now() >= deadline {
                return ExecutionOutcome::Failed {
                    context: ctx,
                    error: Error::Timeout,
                };
            }

            let Some(node) = graph.node(&node_id) else {
                return ExecutionOutcome::Failed {
                    context: ctx,
                    error: Error::InvalidDefinition(format!(
                        "node {node_id} missing from compiled graph"
                    )),
                };
            };

            // A resume always names the wait node it suspended at as
            // `resume_from`; that node already ran (and recorded its output,
            // now holding whatever the caller seeded before resuming) on the
            // suspending attempt, so re-entering it here must not re-suspend.
            let is_resumed_wait = index == 0 && resume_from.is_some() && matches!(node.kind, NodeKind::Wait(_));

            let outcome = if is_resumed_wait {
                Ok(DispatchOutcome::Continue)
            } else {
                self.dispatch_node(
                    graph,
                    node_id,
                    node,
                    connections,
                    token_refresh,
                    quota_limits,
                    cancellation,
                    &mut ctx,
                )
                .await
            };

            match outcome {
                Ok(DispatchOutcome::Waiting(resume)) => {
                    return ExecutionOutcome::Waiting { context: ctx, resume };
                }
                Ok(outcome) => {
                    let taken = match outcome {
                        DispatchOutcome::Branch(branch) => branch,
                        _ => String::new(),
                    };
                    for edge in graph.outgoing(&node_id) {
                        if edge.matches_branch(&taken) {
                            reachable.insert(edge.to);
                        }
                    }
                }
                Err(error) => return ExecutionOutcome::Failed { context: ctx, error },
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            execution_id = %ctx.execution_id,
            nodes_executed = ctx.results().count(),
            "workflow execution completed"
        );

        ExecutionOutcome::Completed(ctx)
    }

    /// Dispatches a single node by kind. Boxed because [`Self::dispatch_loop`]
    /// recurses back into this for the loop's body nodes.
    #[allow(clippy::too_many_arguments)]
    fn dispatch_node<'a>(
        &'a self,
        graph: &'a CompiledGraph,
        node_id: NodeId,
        node: &'a Node,
        connections: &'a ConnectionRegistry,
        token_refresh: &'a dyn TokenRefreshHandler,
        quota_limits: QuotaLimits,
        cancellation: &'a CancellationToken,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, Result<DispatchOutcome>> {
        Box::pin(async move {
            match &node.kind {
                NodeKind::Trigger(_) => self.dispatch_trigger(node_id, ctx),
                NodeKind::Action(action) => {
                    self.dispatch_action(
                        node_id,
                        action,
                        connections,
                        token_refresh,
                        quota_limits,
                        cancellation,
                        ctx,
                    )
                    .await
                }
                NodeKind::Transform(transform) => self.dispatch_transform(node_id, transform, ctx),
                NodeKind::Condition(condition) => self.dispatch_condition(node_id, condition, ctx),
                NodeKind::Loop(loop_node) => {
                    self.dispatch_loop(
                        graph,
                        node_id,
                        loop_node,
                        connections,
                        token_refresh,
                        quota_limits,
                        cancellation,
                        ctx,
                    )
                    .await
                }
                NodeKind::Wait(wait) => self.dispatch_wait(node_id, wait, ctx),
            }
        })
    }

    fn dispatch_trigger(&self, node_id: NodeId, ctx: &mut ExecutionContext) -> Result<DispatchOutcome> {
        ctx.record(NodeResult {
            node_id,
            output: ctx.trigger_data().clone(),
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });
        Ok(DispatchOutcome::Continue)
    }

    fn dispatch_transform(
        &self,
        node_id: NodeId,
        transform: &TransformNode,
        ctx: &mut ExecutionContext,
    ) -> Result<DispatchOutcome> {
        let output = ctx.resolve_params(node_id, &transform.shape)?;
        ctx.record(NodeResult {
            node_id,
            output: output.clone(),
            parameters_snapshot: output,
            timing: Timing::instant(),
            attempt: 1,
        });
        Ok(DispatchOutcome::Continue)
    }

    fn dispatch_condition(
        &self,
        node_id: NodeId,
        condition: &ConditionNode,
        ctx: &mut ExecutionContext,
    ) -> Result<DispatchOutcome> {
        let resolved = ctx.resolve_template(node_id, &condition.expression)?;
        let branch = if is_truthy(&resolved) {
            ConditionNode::TRUE_BRANCH
        } else {
            ConditionNode::FALSE_BRANCH
        };
        ctx.record(NodeResult {
            node_id,
            output: serde_json::json!({"branch": branch, "result": resolved}),
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });
        Ok(DispatchOutcome::Branch(branch.to_string()))
    }

    fn dispatch_wait(
        &self,
        node_id: NodeId,
        wait: &WaitNode,
        ctx: &mut ExecutionContext,
    ) -> Result<DispatchOutcome> {
        tracing::info!(
            target: TRACING_TARGET,
            node_id = %node_id,
            description = wait.description.as_deref().unwrap_or(""),
            "execution suspended at wait node"
        );
        ctx.record(NodeResult {
            node_id,
            output: Value::Null,
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });
        Ok(DispatchOutcome::Waiting(ResumeState {
            node_id,
            payload: serde_json::json!({}),
            timeout_seconds: wait.timeout_seconds.unwrap_or(24 * 3600),
        }))
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch_action(
        &self,
        node_id: NodeId,
        action: &ActionNode,
        connections: &ConnectionRegistry,
        token_refresh: &dyn TokenRefreshHandler,
        quota_limits: QuotaLimits,
        cancellation: &CancellationToken,
        ctx: &mut ExecutionContext,
    ) -> Result<DispatchOutcome> {
        let parameters = ctx.resolve_params(node_id, &action.parameters)?;

        let credentials = match &action.auth {
            Some(auth) => {
                let connection = connections
                    .get(auth.connection_id)
                    .ok_or(Error::CredentialsNotFound(auth.connection_id))?;
                Some(connection.credentials.clone())
            }
            None => None,
        };

        let node_started_at = Timestamp::now();
        let mut attempts_failed = 0u32;

        let response = loop {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }

            self.quota
                .check_and_record(ctx.organization_id, quota_limits, 0)
                .await?;

            let request = ConnectorRequest {
                operation_id: action.operation_id.clone(),
                parameters: parameters.clone(),
                credentials: credentials.clone(),
                execution_id: ctx.execution_id,
                node_id,
            };

            let call = self.connectors.execute(&action.app_id, request);
            let result = match timeout(self.config.connector_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(Error::NodeFailed {
                    node_id,
                    message: format!(
                        "connector call exceeded {:?} timeout",
                        self.config.connector_timeout
                    ),
                    retryable: true,
                }),
            };

            match result {
                Ok(response) => break response,
                Err(error) if error.is_retryable() && action.retry.allows_retry(attempts_failed) => {
                    attempts_failed += 1;
                    tracing::warn!(
                        target: TRACING_TARGET,
                        node_id = %node_id,
                        attempt = attempts_failed,
                        error = %error,
                        "action node failed, retrying"
                    );
                    tokio::time::sleep(action.retry.delay_for(attempts_failed)).await;
                }
                Err(error) => return Err(error),
            }
        };

        self.quota
            .record_tokens(ctx.organization_id, quota_limits, response.tokens_used)
            .await?;

        if let (Some(refreshed), Some(auth)) = (&response.refreshed_credentials, &action.auth) {
            token_refresh
                .on_token_refreshed(auth.connection_id, refreshed)
                .await
                .map_err(|_| Error::TokenRefreshFailed(auth.connection_id))?;
        }

        ctx.record(NodeResult {
            node_id,
            output: response.output,
            parameters_snapshot: parameters,
            timing: Timing::new(node_started_at, Timestamp::now()),
            attempt: attempts_failed + 1,
        });

        Ok(DispatchOutcome::Continue)
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch_loop(
        &self,
        graph: &CompiledGraph,
        node_id: NodeId,
        loop_node: &LoopNode,
        connections: &ConnectionRegistry,
        token_refresh: &dyn TokenRefreshHandler,
        quota_limits: QuotaLimits,
        cancellation: &CancellationToken,
        ctx: &mut ExecutionContext,
    ) -> Result<DispatchOutcome> {
        let input = ctx.resolve_param(node_id, &loop_node.input)?;
        let items = input.as_array().cloned().ok_or_else(|| Error::InvalidNodeConfig {
            node_id,
            message: "loop input did not resolve to an array".into(),
        })?;

        let cap = loop_node.max_iterations as usize;
        if items.len() > cap {
            tracing::warn!(
                target: TRACING_TARGET,
                node_id = %node_id,
                total = items.len(),
                max_iterations = cap,
                "loop input exceeds max_iterations, truncating"
            );
        }

        let mut last_outputs = Vec::new();
        for item in items.into_iter().take(cap) {
            if cancellation.is_cancelled() {
                ctx.unbind_loop_var(&loop_node.item_var);
                return Err(Error::Cancelled);
            }
            ctx.bind_loop_var(loop_node.item_var.clone(), item);

            for &body_id in &loop_node.body {
                let Some(body_node) = graph.node(&body_id) else {
                    ctx.unbind_loop_var(&loop_node.item_var);
                    return Err(Error::InvalidDefinition(format!(
                        "loop body references unknown node {body_id}"
                    )));
                };

                let outcome = self
                    .dispatch_node(
                        graph,
                        body_id,
                        body_node,
                        connections,
                        token_refresh,
                        quota_limits,
                        cancellation,
                        ctx,
                    )
                    .await;

                match outcome {
                    Ok(DispatchOutcome::Waiting(_)) => {
                        ctx.unbind_loop_var(&loop_node.item_var);
                        return Err(Error::InvalidNodeConfig {
                            node_id: body_id,
                            message: "wait nodes are not supported inside a loop body".into(),
                        });
                    }
                    Ok(_) => {}
                    Err(error) => {
                        ctx.unbind_loop_var(&loop_node.item_var);
                        return Err(error);
                    }
                }
            }

            if let Some(&last_body) = loop_node.body.last() {
                last_outputs.push(ctx.output(&last_body).cloned().unwrap_or(Value::Null));
            }
            ctx.unbind_loop_var(&loop_node.item_var);
        }

        ctx.record(NodeResult {
            node_id,
            output: Value::Array(last_outputs),
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });

        Ok(DispatchOutcome::Continue)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("available_slots", &self.available_slots())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::definition::{ActionNode, AuthRef, ParamValue, RetryPolicy, TriggerNode, Workflow};
    use crate::engine::connection::NoopTokenRefreshHandler;
    use crate::engine::connector::{Connector, ConnectorResponse};

    struct EchoConnector;

    #[async_trait]
    impl Connector for EchoConnector {
        async fn execute(&self, request: ConnectorRequest) -> Result<ConnectorResponse> {
            Ok(ConnectorResponse::new(request.parameters))
        }
    }

    struct FlakyConnector {
        failures_remaining: AtomicU32,
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn execute(&self, request: ConnectorRequest) -> Result<ConnectorResponse> {
            if self.failures_remaining.fetch_sub(1, Ordering::SeqCst) > 0 {
                return Err(Error::NodeFailed {
                    node_id: request.node_id,
                    message: "transient failure".into(),
                    retryable: true,
                });
            }
            Ok(ConnectorResponse::new(serde_json::json!({"ok": true})))
        }
    }

    fn engine_with(connector: Arc<dyn Connector>) -> Engine {
        let mut connectors = ConnectorRegistry::new();
        connectors.register("slack", connector);
        Engine::new(EngineConfig::default(), connectors)
    }

    async fn run(
        engine: &Engine,
        graph: &CompiledGraph,
        ctx: ExecutionContext,
        resume_from: Option<NodeId>,
    ) -> ExecutionOutcome {
        let connections = ConnectionRegistry::new();
        let handler = NoopTokenRefreshHandler;
        let cancellation = CancellationToken::new();
        let limits = QuotaLimits::default();
        engine
            .execute(graph, &connections, &handler, limits, &cancellation, ctx, resume_from)
            .await
    }

    #[tokio::test]
    async fn executes_trigger_then_action_and_records_output() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let action_id = NodeId::new();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            action_id,
            Node::new(NodeKind::Action(ActionNode {
                app_id: "slack".into(),
                operation_id: "post_message".into(),
                parameters: HashMap::from([(
                    "text".to_string(),
                    ParamValue::static_value(serde_json::json!("hi")),
                )]),
                auth: None,
                retry: RetryPolicy::default(),
            })),
        )
        .connect(trigger_id, action_id);

        let graph = CompiledGraph::compile(&wf).unwrap();
        let engine = engine_with(Arc::new(EchoConnector));
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Completed(ctx) => {
                assert_eq!(
                    ctx.output(&action_id).unwrap(),
                    &serde_json::json!({"text": "hi"})
                );
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_a_retryable_failure_until_it_succeeds() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let action_id = NodeId::new();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            action_id,
            Node::new(NodeKind::Action(ActionNode {
                app_id: "slack".into(),
                operation_id: "post_message".into(),
                parameters: HashMap::new(),
                auth: None,
                retry: RetryPolicy::default(),
            })),
        )
        .connect(trigger_id, action_id);

        let graph = CompiledGraph::compile(&wf).unwrap();
        let connector = Arc::new(FlakyConnector {
            failures_remaining: AtomicU32::new(2),
        });
        let mut connectors = ConnectorRegistry::new();
        connectors.register("slack", connector as Arc<dyn Connector>);
        let engine = Engine::new(EngineConfig::default(), connectors);
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Completed(ctx) => {
                assert_eq!(ctx.output(&action_id).unwrap(), &serde_json::json!({"ok": true}));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn condition_false_branch_skips_its_successor() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let cond_id = NodeId::new();
        let yes_id = NodeId::new();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            cond_id,
            Node::new(NodeKind::Condition(ConditionNode {
                expression: "false".into(),
            })),
        )
        .add_node(
            yes_id,
            Node::new(NodeKind::Action(ActionNode {
                app_id: "slack".into(),
                operation_id: "post_message".into(),
                parameters: HashMap::new(),
                auth: None,
                retry: RetryPolicy::default(),
            })),
        )
        .connect(trigger_id, cond_id)
        .add_edge(crate::definition::Edge::branched(
            cond_id,
            yes_id,
            ConditionNode::TRUE_BRANCH,
        ));

        let graph = CompiledGraph::compile(&wf).unwrap();
        let engine = engine_with(Arc::new(EchoConnector));
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Completed(ctx) => {
                assert!(ctx.output(&yes_id).is_none());
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wait_node_suspends_and_resume_continues_from_it() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let wait_id = NodeId::new();
        let action_id = NodeId::new();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            wait_id,
            Node::new(NodeKind::Wait(WaitNode {
                description: Some("waiting for approval".into()),
                timeout_seconds: Some(3600),
            })),
        )
        .add_node(
            action_id,
            Node::new(NodeKind::Action(ActionNode {
                app_id: "slack".into(),
                operation_id: "post_message".into(),
                parameters: HashMap::new(),
                auth: None,
                retry: RetryPolicy::default(),
            })),
        )
        .connect(trigger_id, wait_id)
        .connect(wait_id, action_id);

        let graph = CompiledGraph::compile(&wf).unwrap();
        let engine = engine_with(Arc::new(EchoConnector));
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        let (ctx, resume) = match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Waiting { context, resume } => (context, resume),
            other => panic!("expected Waiting, got {other:?}"),
        };
        assert_eq!(resume.node_id, wait_id);
        assert_eq!(resume.timeout_seconds, 3600);

        match run(&engine, &graph, ctx, Some(wait_id)).await {
            ExecutionOutcome::Completed(ctx) => {
                assert!(ctx.output(&action_id).is_some());
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn loop_node_binds_item_var_per_iteration() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let loop_id = NodeId::new();
        let body_id = NodeId::new();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            loop_id,
            Node::new(NodeKind::Loop(LoopNode {
                input: ParamValue::static_value(serde_json::json!(["a", "b", "c"])),
                item_var: "item".into(),
                body: vec![body_id],
                max_iterations: 10,
            })),
        )
        .add_node(
            body_id,
            Node::new(NodeKind::Transform(TransformNode {
                shape: HashMap::from([(
                    "value".to_string(),
                    ParamValue::expression("{{item}}"),
                )]),
            })),
        )
        .connect(trigger_id, loop_id);

        let graph = CompiledGraph::compile(&wf).unwrap();
        let engine = engine_with(Arc::new(EchoConnector));
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Completed(ctx) => {
                let output = ctx.output(&loop_id).unwrap();
                assert_eq!(
                    output,
                    &serde_json::json!([{"value": "a"}, {"value": "b"}, {"value": "c"}])
                );
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_connection_fails_with_credentials_not_found() {
        let mut wf = Workflow::new();
        let trigger_id = NodeId::new();
        let action_id = NodeId::new();
        let connection_id = Uuid::now_v7();
        wf.add_node(
            trigger_id,
            Node::new(NodeKind::Trigger(TriggerNode {
                app_id: "slack".into(),
                trigger_id: "message_posted".into(),
            })),
        )
        .add_node(
            action_id,
            Node::new(NodeKind::Action(ActionNode {
                app_id: "slack".into(),
                operation_id: "post_message".into(),
                parameters: HashMap::new(),
                auth: Some(AuthRef { connection_id }),
                retry: RetryPolicy::default(),
            })),
        )
        .connect(trigger_id, action_id);

        let graph = CompiledGraph::compile(&wf).unwrap();
        let engine = engine_with(Arc::new(EchoConnector));
        let ctx = ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), Value::Null);

        match run(&engine, &graph, ctx, None).await {
            ExecutionOutcome::Failed { error, .. } => {
                assert!(matches!(error, Error::CredentialsNotFound(id) if id == connection_id));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
