//! Workflow definition types.
//!
//! This module contains serializable, frontend-friendly types for defining workflows.
//! These types are designed for:
//! - Easy serialization to/from JSON
//! - Frontend consumption and editing
//! - Storage in the `workflow_versions.graph` column
//!
//! To execute a workflow, definitions must be compiled into a [`crate::graph::CompiledGraph`]
//! using the [`crate::engine::Engine`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod edge;
mod metadata;
mod node;
mod param;
mod retry;
mod util;

pub use edge::Edge;
pub use metadata::WorkflowMetadata;
pub use node::{
    ActionNode, AuthRef, ConditionNode, LoopNode, Node, NodeId, NodeKind, TransformNode,
    TriggerNode, WaitNode,
};
pub use param::{ParamMode, ParamValue};
pub use retry::{BackoffPolicy, RetryPolicy};
pub use util::Position;

/// Serializable workflow definition.
///
/// This is the JSON-friendly representation of a workflow graph. It contains
/// all the information needed to compile and execute a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Nodes in the workflow, keyed by their ID.
    pub nodes: HashMap<NodeId, Node>,
    /// Edges connecting nodes.
    pub edges: Vec<Edge>,
    /// Workflow metadata.
    #[serde(default)]
    pub metadata: WorkflowMetadata,
}

impl Workflow {
    /// Creates a new empty workflow definition.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            metadata: WorkflowMetadata::default(),
        }
    }

    /// Creates a workflow definition with metadata.
    pub fn with_metadata(metadata: WorkflowMetadata) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            metadata,
        }
    }

    /// Adds a node to the workflow.
    pub fn add_node(&mut self, id: NodeId, node: Node) -> &mut Self {
        self.nodes.insert(id, node);
        self
    }

    /// Adds a node definition with default metadata.
    pub fn add_node_def(&mut self, id: NodeId, def: NodeKind) -> &mut Self {
        self.nodes.insert(id, Node::new(def));
        self
    }

    /// Adds an edge to the workflow.
    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Adds a simple, unconditional edge between two nodes.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        self.edges.push(Edge::new(from, to));
        self
    }

    /// Returns an iterator over trigger nodes.
    pub fn trigger_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_trigger())
    }

    /// Returns an iterator over action nodes.
    pub fn action_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_action())
    }

    /// Returns an iterator over transform nodes.
    pub fn transform_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_transform())
    }

    /// Returns an iterator over condition nodes.
    pub fn condition_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_condition())
    }

    /// Returns an iterator over loop nodes.
    pub fn loop_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_loop())
    }

    /// Returns an iterator over wait nodes.
    pub fn wait_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| node.is_wait())
    }

    /// Returns every node id referenced as a loop body member.
    ///
    /// These ids are excluded from the outer graph's topological order: the
    /// loop dispatch executes them directly in a child scope.
    pub fn loop_body_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.values().flat_map(|node| match &node.kind {
            NodeKind::Loop(loop_node) => loop_node.body.iter(),
            _ => [].iter(),
        })
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    /// Creates a deterministic NodeId for testing.
    fn test_node_id(n: u128) -> NodeId {
        NodeId::from_uuid(Uuid::from_u128(n))
    }

    fn trigger_node() -> Node {
        Node::new(NodeKind::Trigger(TriggerNode {
            app_id: "slack".into(),
            trigger_id: "message_posted".into(),
        }))
    }

    fn action_node() -> Node {
        Node::new(NodeKind::Action(ActionNode {
            app_id: "slack".into(),
            operation_id: "post_message".into(),
            parameters: HashMap::new(),
            auth: None,
            retry: RetryPolicy::default(),
        }))
    }

    fn condition_node() -> Node {
        Node::new(NodeKind::Condition(ConditionNode {
            expression: "{{trigger.ok}}".into(),
        }))
    }

    #[test]
    fn workflow_new_is_empty() {
        let def = Workflow::new();
        assert!(def.nodes.is_empty());
        assert!(def.edges.is_empty());
    }

    #[test]
    fn workflow_add_node_inserts_by_id() {
        let mut def = Workflow::new();
        let id = test_node_id(1);
        def.add_node(id, trigger_node());
        assert_eq!(def.nodes.len(), 1);
        assert!(def.nodes.contains_key(&id));
    }

    #[test]
    fn workflow_connect_adds_unconditional_edge() {
        let mut def = Workflow::new();
        let id1 = test_node_id(1);
        let id2 = test_node_id(2);
        def.add_node(id1, trigger_node())
            .add_node(id2, action_node())
            .connect(id1, id2);

        assert_eq!(def.edges.len(), 1);
        assert_eq!(def.edges[0].from, id1);
        assert_eq!(def.edges[0].to, id2);
        assert!(def.edges[0].branch.is_none());
    }

    #[test]
    fn workflow_node_iterators_filter_by_kind() {
        let mut def = Workflow::new();
        def.add_node(test_node_id(1), trigger_node())
            .add_node(test_node_id(2), action_node())
            .add_node(test_node_id(3), condition_node());

        assert_eq!(def.trigger_nodes().count(), 1);
        assert_eq!(def.action_nodes().count(), 1);
        assert_eq!(def.condition_nodes().count(), 1);
        assert_eq!(def.transform_nodes().count(), 0);
    }

    #[test]
    fn workflow_loop_body_nodes_collects_referenced_ids() {
        let mut def = Workflow::new();
        let loop_id = test_node_id(1);
        let body_id = test_node_id(2);
        def.add_node(
            loop_id,
            Node::new(NodeKind::Loop(LoopNode {
                input: ParamValue::static_value(serde_json::json!([1, 2, 3])),
                item_var: "item".into(),
                body: vec![body_id],
                max_iterations: LoopNode::default_max_iterations(),
            })),
        );

        let collected: Vec<&NodeId> = def.loop_body_nodes().collect();
        assert_eq!(collected, vec![&body_id]);
    }

    #[test]
    fn workflow_serialization_roundtrips() {
        let mut def = Workflow::new();
        let id1 = test_node_id(1);
        let id2 = test_node_id(2);
        def.add_node(id1, trigger_node())
            .add_node(id2, action_node())
            .connect(id1, id2);

        let json = serde_json::to_string(&def).expect("serialization failed");
        let deserialized: Workflow = serde_json::from_str(&json).expect("deserialization failed");

        assert_eq!(def.nodes.len(), deserialized.nodes.len());
        assert_eq!(def.edges.len(), deserialized.edges.len());
    }
}
