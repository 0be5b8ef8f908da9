//! Parameter value types for node inputs.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A single parameter value attached to a node.
///
/// Values are resolved against the execution's accumulated node outputs
/// immediately before the node runs. A bare JSON literal (no `mode` tag) is
/// treated as [`ParamValue::Static`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A parameter with an explicit resolution mode.
    Mode(ParamMode),
    /// A raw literal, used as-is.
    Literal(serde_json::Value),
}

/// How a [`ParamValue`] should be resolved into a concrete JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParamMode {
    /// Used as-is.
    Static {
        /// The literal value.
        value: serde_json::Value,
    },
    /// Dereferenced from a previously recorded node output.
    Ref {
        /// The node whose recorded output to read from.
        node_id: NodeId,
        /// A dot-separated path into that node's output.
        path: String,
    },
    /// Mustache-style `{{path}}` substitution over the combined input scope.
    Expression {
        /// The template string.
        template: String,
    },
}

impl ParamValue {
    /// Creates a static parameter from any serializable value.
    pub fn static_value(value: impl Into<serde_json::Value>) -> Self {
        Self::Mode(ParamMode::Static {
            value: value.into(),
        })
    }

    /// Creates a reference parameter pointing at another node's output.
    pub fn reference(node_id: NodeId, path: impl Into<String>) -> Self {
        Self::Mode(ParamMode::Ref {
            node_id,
            path: path.into(),
        })
    }

    /// Creates an expression parameter with a Mustache-style template.
    pub fn expression(template: impl Into<String>) -> Self {
        Self::Mode(ParamMode::Expression {
            template: template.into(),
        })
    }

    /// Returns the node this parameter references, if it is a `ref` parameter.
    pub fn referenced_node(&self) -> Option<NodeId> {
        match self {
            Self::Mode(ParamMode::Ref { node_id, .. }) => Some(*node_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_roundtrips_without_mode_tag() {
        let json = serde_json::json!(42);
        let value: ParamValue = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(value, ParamValue::Literal(json));
    }

    #[test]
    fn static_mode_roundtrips() {
        let value = ParamValue::static_value(serde_json::json!("hello"));
        let json = serde_json::to_value(&value).unwrap();
        let back: ParamValue = serde_json::from_value(json).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn ref_reports_referenced_node() {
        let node = NodeId::new();
        let value = ParamValue::reference(node, "body.id");
        assert_eq!(value.referenced_node(), Some(node));
    }
}
