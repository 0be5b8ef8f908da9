//! Compiled, execution-ready representation of a [`crate::definition::Workflow`].

use std::collections::{HashMap, HashSet};

use petgraph::graph::DiGraph;

use crate::definition::{Edge, Node, NodeId, Workflow};
use crate::error::{Error, Result};

/// A workflow definition compiled into a dispatch-ready graph.
///
/// Compilation resolves the definition's loosely-typed `nodes`/`edges` into:
/// - a single validated entry point (the trigger node),
/// - a topological execution order over every node **except** loop bodies
///   (a loop's body nodes are dispatched directly by the loop node that owns
///   them, in an isolated child scope, so they never participate in the
///   outer graph's cycle detection), and
/// - an adjacency map for propagating outputs along outbound edges.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    nodes: HashMap<NodeId, Node>,
    outgoing: HashMap<NodeId, Vec<Edge>>,
    order: Vec<NodeId>,
    entry: NodeId,
}

impl CompiledGraph {
    /// Compiles a workflow definition into an execution-ready graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] if an edge references an unknown
    /// node, or if the workflow does not have exactly one trigger node, and
    /// [`Error::CycleDetected`] if the non-loop-body subgraph is cyclic.
    pub fn compile(workflow: &Workflow) -> Result<Self> {
        let body_ids: HashSet<NodeId> = workflow.loop_body_nodes().copied().collect();

        for edge in &workflow.edges {
            if !workflow.nodes.contains_key(&edge.from) {
                return Err(Error::InvalidDefinition(format!(
                    "edge references unknown source node {}",
                    edge.from
                )));
            }
            if !workflow.nodes.contains_key(&edge.to) {
                return Err(Error::InvalidDefinition(format!(
                    "edge references unknown target node {}",
                    edge.to
                )));
            }
        }

        let mut triggers = workflow.trigger_nodes().map(|(id, _)| *id);
        let entry = triggers.next().ok_or_else(|| {
            Error::InvalidDefinition("workflow has no trigger node".to_string())
        })?;
        if triggers.next().is_some() {
            return Err(Error::InvalidDefinition(
                "workflow has more than one trigger node".to_string(),
            ));
        }

        let mut graph = DiGraph::<NodeId, ()>::new();
        let mut indices = HashMap::with_capacity(workflow.nodes.len());
        for id in workflow.nodes.keys().filter(|id| !body_ids.contains(id)) {
            indices.insert(*id, graph.add_node(*id));
        }

        let mut outgoing: HashMap<NodeId, Vec<Edge>> = HashMap::new();
        for edge in &workflow.edges {
            if body_ids.contains(&edge.from) || body_ids.contains(&edge.to) {
                continue;
            }
            let (Some(&from), Some(&to)) = (indices.get(&edge.from), indices.get(&edge.to)) else {
                continue;
            };
            graph.add_edge(from, to, ());
            outgoing.entry(edge.from).or_default().push(edge.clone());
        }

        let order = petgraph::algo::toposort(&graph, None)
            .map_err(|cycle| Error::CycleDetected(graph[cycle.node_id()]))?
            .into_iter()
            .map(|idx| graph[idx])
            .collect();

        Ok(Self {
            nodes: workflow.nodes.clone(),
            outgoing,
            order,
            entry,
        })
    }

    /// Returns the node with the given id, if present.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns the outbound edges for a node, empty if it has none.
    pub fn outgoing(&self, id: &NodeId) -> &[Edge] {
        self.outgoing.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns the dispatch order for every non-loop-body node.
    pub fn topological_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Returns the workflow's single entry point.
    pub fn entry_node(&self) -> NodeId {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::definition::{
        ActionNode, ConditionNode, NodeKind, RetryPolicy, TriggerNode, WaitNode,
    };

    fn trigger() -> Node {
        Node::new(NodeKind::Trigger(TriggerNode {
            app_id: "slack".into(),
            trigger_id: "message_posted".into(),
        }))
    }

    fn action() -> Node {
        Node::new(NodeKind::Action(ActionNode {
            app_id: "slack".into(),
            operation_id: "post_message".into(),
            parameters: HashMap::new(),
            auth: None,
            retry: RetryPolicy::default(),
        }))
    }

    #[test]
    fn compiles_linear_workflow_in_order() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        let a = NodeId::new();
        wf.add_node(t, trigger()).add_node(a, action()).connect(t, a);

        let compiled = CompiledGraph::compile(&wf).unwrap();
        assert_eq!(compiled.entry_node(), t);
        assert_eq!(compiled.topological_order(), &[t, a]);
        assert_eq!(compiled.outgoing(&t).len(), 1);
    }

    #[test]
    fn rejects_workflow_with_no_trigger() {
        let mut wf = Workflow::new();
        wf.add_node(NodeId::new(), action());
        assert!(matches!(
            CompiledGraph::compile(&wf),
            Err(Error::InvalidDefinition(_))
        ));
    }

    #[test]
    fn rejects_cycle_outside_a_loop() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        let a = NodeId::new();
        let b = NodeId::new();
        wf.add_node(t, trigger())
            .add_node(a, action())
            .add_node(b, action())
            .connect(t, a)
            .connect(a, b)
            .connect(b, a);

        assert!(matches!(
            CompiledGraph::compile(&wf),
            Err(Error::CycleDetected(_))
        ));
    }

    #[test]
    fn loop_body_nodes_are_excluded_from_outer_order() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        let loop_id = NodeId::new();
        let body = NodeId::new();
        wf.add_node(t, trigger())
            .add_node(
                loop_id,
                Node::new(NodeKind::Loop(crate::definition::LoopNode {
                    input: crate::definition::ParamValue::static_value(serde_json::json!([1])),
                    item_var: "item".into(),
                    body: vec![body],
                    max_iterations: 10,
                })),
            )
            .add_node(body, action())
            .connect(t, loop_id);

        let compiled = CompiledGraph::compile(&wf).unwrap();
        assert_eq!(compiled.topological_order(), &[t, loop_id]);
        assert!(compiled.node(&body).is_some());
    }

    #[test]
    fn condition_branch_edges_are_retained() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        let cond = NodeId::new();
        let yes = NodeId::new();
        wf.add_node(t, trigger())
            .add_node(
                cond,
                Node::new(NodeKind::Condition(ConditionNode {
                    expression: "{{trigger.ok}}".into(),
                })),
            )
            .add_node(yes, action())
            .connect(t, cond)
            .add_edge(Edge::branched(cond, yes, ConditionNode::TRUE_BRANCH));

        let compiled = CompiledGraph::compile(&wf).unwrap();
        let edges = compiled.outgoing(&cond);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].matches_branch(ConditionNode::TRUE_BRANCH));
        assert!(!edges[0].matches_branch(ConditionNode::FALSE_BRANCH));
    }

    #[test]
    fn unknown_wait_node_edge_target_is_rejected() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        wf.add_node(t, trigger());
        wf.add_edge(Edge::new(t, NodeId::new()));

        assert!(matches!(
            CompiledGraph::compile(&wf),
            Err(Error::InvalidDefinition(_))
        ));
    }

    #[test]
    fn wait_node_is_included_in_order() {
        let mut wf = Workflow::new();
        let t = NodeId::new();
        let w = NodeId::new();
        wf.add_node(t, trigger())
            .add_node(
                w,
                Node::new(NodeKind::Wait(WaitNode {
                    description: None,
                    timeout_seconds: None,
                })),
            )
            .connect(t, w);

        let compiled = CompiledGraph::compile(&wf).unwrap();
        assert_eq!(compiled.topological_order(), &[t, w]);
    }
}
