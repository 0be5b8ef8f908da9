//! Node definition types.

use std::collections::HashMap;
use std::str::FromStr;

use derive_builder::Builder;
use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::param::ParamValue;
use super::retry::RetryPolicy;
use super::util::Position;

/// Unique identifier for a node in a workflow graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new random node ID.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a node ID from an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the UUID as bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

impl AsRef<Uuid> for NodeId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

/// A workflow node definition with metadata and kind.
///
/// Nodes are categorized by their role in execution:
/// - **Trigger**: the entry point that started the run.
/// - **Action**: invokes a connector operation against an external app.
/// - **Transform**: reshapes data declaratively, no external call.
/// - **Condition**: picks an outbound branch based on a boolean expression.
/// - **Loop**: iterates a child scope over an input sequence.
/// - **Wait**: suspends the execution pending an external resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "NodeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with")
)]
pub struct Node {
    /// Display name of the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub name: Option<String>,
    /// Description of what this node does.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub description: Option<String>,
    /// Position in the visual editor.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub position: Option<Position>,
    /// The node kind/type.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Creates a new node with the given kind.
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            name: None,
            description: None,
            position: None,
            kind: kind.into(),
        }
    }

    /// Returns a builder for creating a node.
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    /// Returns whether this is the workflow's entry point.
    pub const fn is_trigger(&self) -> bool {
        self.kind.is_trigger()
    }

    /// Returns whether this node invokes a connector operation.
    pub const fn is_action(&self) -> bool {
        self.kind.is_action()
    }

    /// Returns whether this is a transform node.
    pub const fn is_transform(&self) -> bool {
        self.kind.is_transform()
    }

    /// Returns whether this is a condition node.
    pub const fn is_condition(&self) -> bool {
        self.kind.is_condition()
    }

    /// Returns whether this is a loop node.
    pub const fn is_loop(&self) -> bool {
        self.kind.is_loop()
    }

    /// Returns whether this node suspends the execution.
    pub const fn is_wait(&self) -> bool {
        self.kind.is_wait()
    }

    /// Returns the retry policy applicable to this node, if any.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.kind.retry_policy()
    }
}

/// Reference to a connection to resolve credentials from before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRef {
    /// The `Connection` record to resolve credentials from.
    pub connection_id: Uuid,
}

/// Node kind enum for workflow graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point: the trigger that started this run.
    Trigger(TriggerNode),
    /// Invokes a connector operation against an external app.
    Action(ActionNode),
    /// Evaluates a declarative data shape with no external call.
    Transform(TransformNode),
    /// Evaluates a boolean expression and picks an outbound branch.
    Condition(ConditionNode),
    /// Iterates a child scope over an input sequence.
    Loop(LoopNode),
    /// Suspends the execution pending an external resume.
    Wait(WaitNode),
}

impl NodeKind {
    /// Returns whether this is a trigger node.
    pub const fn is_trigger(&self) -> bool {
        matches!(self, NodeKind::Trigger(_))
    }

    /// Returns whether this is an action node.
    pub const fn is_action(&self) -> bool {
        matches!(self, NodeKind::Action(_))
    }

    /// Returns whether this is a transform node.
    pub const fn is_transform(&self) -> bool {
        matches!(self, NodeKind::Transform(_))
    }

    /// Returns whether this is a condition node.
    pub const fn is_condition(&self) -> bool {
        matches!(self, NodeKind::Condition(_))
    }

    /// Returns whether this is a loop node.
    pub const fn is_loop(&self) -> bool {
        matches!(self, NodeKind::Loop(_))
    }

    /// Returns whether this is a wait node.
    pub const fn is_wait(&self) -> bool {
        matches!(self, NodeKind::Wait(_))
    }

    /// Returns the retry policy applicable to this kind, if any.
    ///
    /// Only action nodes perform fallible external work, so only they carry
    /// a retry policy.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        match self {
            NodeKind::Action(action) => Some(action.retry),
            _ => None,
        }
    }
}

/// Entry-point node: identifies which trigger started this run.
///
/// Carries no executable behavior of its own; it exists so the graph has a
/// well-defined topological root and so node results can record what kicked
/// off the execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerNode {
    /// The connector app the trigger belongs to (e.g. `"slack"`).
    pub app_id: String,
    /// The app-specific trigger identifier (e.g. `"message_posted"`).
    pub trigger_id: String,
}

/// Invokes a connector operation against an external app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "ActionNodeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with")
)]
pub struct ActionNode {
    /// The connector app to invoke (e.g. `"slack"`).
    pub app_id: String,
    /// The app-specific operation identifier (e.g. `"post_message"`).
    pub operation_id: String,
    /// Operation parameters, resolved immediately before dispatch.
    #[builder(default)]
    pub parameters: HashMap<String, ParamValue>,
    /// The connection to resolve credentials from, if the operation requires auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub auth: Option<AuthRef>,
    /// Retry policy applied when the connector call fails.
    #[builder(default)]
    pub retry: RetryPolicy,
}

/// Evaluates a declarative data shape; its resolved parameters become its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformNode {
    /// The output shape: each entry is resolved against prior node outputs.
    pub shape: HashMap<String, ParamValue>,
}

/// Evaluates a boolean expression and selects an outbound branch.
///
/// Outbound [`super::Edge`]s tagged with a matching `branch` are followed;
/// others are excluded for this execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionNode {
    /// Mustache-style boolean expression, evaluated over prior node outputs.
    pub expression: String,
}

impl ConditionNode {
    /// Branch label an edge must carry to be followed when the condition is true.
    pub const TRUE_BRANCH: &'static str = "true";
    /// Branch label an edge must carry to be followed when the condition is false.
    pub const FALSE_BRANCH: &'static str = "false";
}

/// Iterates a child scope over an input sequence.
///
/// The referenced `body` nodes are not part of the graph's main topological
/// order: the loop dispatch runs them once per iteration in an isolated
/// child scope, so a loop body can exist without introducing a cycle in the
/// outer graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopNode {
    /// The sequence to iterate over.
    pub input: ParamValue,
    /// Name the current item is bound to within the child scope.
    pub item_var: String,
    /// Node ids executed, in order, for each iteration.
    pub body: Vec<NodeId>,
    /// Upper bound on iterations, regardless of `input`'s length.
    #[serde(default = "LoopNode::default_max_iterations")]
    pub max_iterations: u32,
}

impl LoopNode {
    /// Default iteration cap when a loop node doesn't specify one.
    pub const fn default_max_iterations() -> u32 {
        1000
    }
}

/// Suspends the execution pending an external resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitNode {
    /// Optional human-readable reason surfaced while the execution is suspended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upper bound, in seconds, on how long the execution may remain
    /// suspended before the minted resume token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
}
