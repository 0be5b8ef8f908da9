//! Edge types for connecting nodes in a workflow graph.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::NodeId;

/// An edge connecting two nodes in the workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Builder)]
#[builder(
    name = "EdgeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct Edge {
    /// Source node ID.
    pub from: NodeId,
    /// Target node ID.
    pub to: NodeId,
    /// Optional port/slot name on the source node.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub from_port: Option<String>,
    /// Optional port/slot name on the target node.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub to_port: Option<String>,
    /// Branch label required of the source condition node for this edge to
    /// be followed. `None` means the edge is always followed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub branch: Option<String>,
}

impl EdgeBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.from.is_none() {
            return Err("from is required".into());
        }
        if self.to.is_none() {
            return Err("to is required".into());
        }
        Ok(())
    }
}

impl Edge {
    /// Creates a new edge between two nodes.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            from_port: None,
            to_port: None,
            branch: None,
        }
    }

    /// Creates a branch-gated edge out of a condition node.
    pub fn branched(from: NodeId, to: NodeId, branch: impl Into<String>) -> Self {
        Self {
            from,
            to,
            from_port: None,
            to_port: None,
            branch: Some(branch.into()),
        }
    }

    /// Returns a builder for creating an edge.
    pub fn builder() -> EdgeBuilder {
        EdgeBuilder::default()
    }

    /// Returns whether this edge is followed given a condition node's resolved branch.
    ///
    /// Edges with no `branch` are unconditional and always followed.
    pub fn matches_branch(&self, taken: &str) -> bool {
        self.branch.as_deref().is_none_or(|b| b == taken)
    }
}
