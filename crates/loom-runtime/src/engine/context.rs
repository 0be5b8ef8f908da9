//! Accumulated per-node state for a single workflow execution.

use std::collections::HashMap;

use loom_core::common::Timing;
use serde_json::Value;
use uuid::Uuid;

use crate::definition::{NodeId, ParamMode, ParamValue};
use crate::error::{Error, Result};

/// The recorded outcome of a single node's dispatch.
#[derive(Debug, Clone)]
pub struct NodeResult {
    /// The node this result belongs to.
    pub node_id: NodeId,
    /// The node's output, available to downstream `ref`/`expression` parameters.
    pub output: Value,
    /// The resolved parameters the node was dispatched with, for audit/replay.
    pub parameters_snapshot: Value,
    /// How long this attempt took.
    pub timing: Timing,
    /// 1-indexed attempt number this result corresponds to.
    pub attempt: u32,
}

/// Execution-scoped state threaded through a single run of a [`crate::graph::CompiledGraph`].
///
/// Holds the trigger payload and every completed node's recorded output, and
/// resolves [`ParamValue`]s against them.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The execution this context belongs to.
    pub execution_id: Uuid,
    /// The owning organization, for quota/credential scoping.
    pub organization_id: Uuid,
    trigger_data: Value,
    outputs: HashMap<NodeId, NodeResult>,
    loop_vars: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Creates a fresh context for a new run.
    pub fn new(execution_id: Uuid, organization_id: Uuid, trigger_data: Value) -> Self {
        Self {
            execution_id,
            organization_id,
            trigger_data,
            outputs: HashMap::new(),
            loop_vars: HashMap::new(),
        }
    }

    /// Binds a loop node's `item_var` to the current iteration's item,
    /// making it resolvable as `{{<item_var>.path}}` within the loop body.
    pub fn bind_loop_var(&mut self, name: impl Into<String>, value: Value) {
        self.loop_vars.insert(name.into(), value);
    }

    /// Removes a loop variable binding once the iteration it scoped has finished.
    pub fn unbind_loop_var(&mut self, name: &str) {
        self.loop_vars.remove(name);
    }

    /// The data the triggering event carried.
    pub fn trigger_data(&self) -> &Value {
        &self.trigger_data
    }

    /// Records a node's result, overwriting any prior attempt for that node.
    pub fn record(&mut self, result: NodeResult) {
        self.outputs.insert(result.node_id, result);
    }

    /// Returns the recorded output for a node, if it has completed.
    pub fn output(&self, node_id: &NodeId) -> Option<&Value> {
        self.outputs.get(node_id).map(|result| &result.output)
    }

    /// Returns every recorded node result so far, for snapshotting into an
    /// Execution Record's `node_outputs` column.
    pub fn results(&self) -> impl Iterator<Item = &NodeResult> {
        self.outputs.values()
    }

    /// Snapshot of every recorded node's output, keyed by node id as a
    /// string, matching the shape persisted in an Execution Record's
    /// `node_outputs` column.
    pub fn outputs_snapshot(&self) -> Value {
        let map = self.outputs.iter().map(|(id, result)| (id.to_string(), result.output.clone())).collect();
        Value::Object(map)
    }

    /// Rebuilds a context from a previously persisted `node_outputs`
    /// snapshot, for resuming a suspended execution. Entries that don't
    /// parse as a node id are dropped rather than failing the resume.
    pub fn restore(execution_id: Uuid, organization_id: Uuid, trigger_data: Value, node_outputs: &Value) -> Self {
        let mut ctx = Self::new(execution_id, organization_id, trigger_data);
        if let Value::Object(map) = node_outputs {
            for (key, output) in map {
                if let Ok(node_id) = key.parse::<NodeId>() {
                    ctx.seed_output(node_id, output.clone());
                }
            }
        }
        ctx
    }

    /// Overwrites a single node's recorded output directly, bypassing
    /// dispatch. Used to deliver a resume token's payload to the wait node
    /// it targets before re-entering [`super::Engine::execute`].
    pub fn seed_output(&mut self, node_id: NodeId, output: Value) {
        let now = jiff::Timestamp::now();
        self.outputs.insert(
            node_id,
            NodeResult {
                node_id,
                output,
                parameters_snapshot: Value::Null,
                timing: Timing::new(now, now),
                attempt: 1,
            },
        );
    }

    /// Resolves a single parameter against trigger data and prior node outputs.
    pub fn resolve_param(&self, requesting_node: NodeId, param: &ParamValue) -> Result<Value> {
        match param {
            ParamValue::Literal(value) => Ok(value.clone()),
            ParamValue::Mode(ParamMode::Static { value }) => Ok(value.clone()),
            ParamValue::Mode(ParamMode::Ref { node_id, path }) => {
                let output = self.output(node_id).ok_or_else(|| Error::MissingReference {
                    node_id: requesting_node,
                    referenced: *node_id,
                    path: path.clone(),
                })?;
                resolve_json_path(output, path).ok_or_else(|| Error::MissingReference {
                    node_id: requesting_node,
                    referenced: *node_id,
                    path: path.clone(),
                })
            }
            ParamValue::Mode(ParamMode::Expression { template }) => Ok(Value::String(
                self.resolve_template(requesting_node, template)?,
            )),
        }
    }

    /// Resolves every entry of a parameter map, e.g. an action node's
    /// `parameters` or a transform node's `shape`.
    pub fn resolve_params(
        &self,
        requesting_node: NodeId,
        params: &HashMap<String, ParamValue>,
    ) -> Result<Value> {
        let mut resolved = serde_json::Map::with_capacity(params.len());
        for (key, param) in params {
            resolved.insert(key.clone(), self.resolve_param(requesting_node, param)?);
        }
        Ok(Value::Object(resolved))
    }

    /// Mustache-style `{{path}}` substitution over the combined scope
    /// (`trigger` plus every completed node's output, keyed by node id).
    pub fn resolve_template(&self, requesting_node: NodeId, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let Some(end) = rest[start..].find("}}") else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let path = rest[start + 2..start + end].trim();
            let value = self.resolve_scoped_path(path).ok_or_else(|| {
                let (referenced, tail) = path
                    .split_once('.')
                    .and_then(|(head, tail)| head.parse::<NodeId>().ok().map(|id| (id, tail)))
                    .unwrap_or((requesting_node, path));
                Error::MissingReference {
                    node_id: requesting_node,
                    referenced,
                    path: tail.to_string(),
                }
            })?;
            out.push_str(&scalar_to_string(&value));
            rest = &rest[start + end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Resolves a dot-path over the combined `trigger`/loop-variable/node-output
    /// scope, e.g. `trigger.channel`, `item.id`, or `<node-id>.body.id`.
    fn resolve_scoped_path(&self, path: &str) -> Option<Value> {
        let (head, tail) = path.split_once('.').unwrap_or((path, ""));
        let root = if head == "trigger" {
            self.trigger_data.clone()
        } else if let Some(value) = self.loop_vars.get(head) {
            value.clone()
        } else {
            let node_id: NodeId = head.parse().ok()?;
            self.output(&node_id)?.clone()
        };
        if tail.is_empty() {
            Some(root)
        } else {
            resolve_json_path(&root, tail)
        }
    }
}

/// Evaluates whether a resolved condition-node expression result is truthy.
pub fn is_truthy(resolved: &str) -> bool {
    !matches!(resolved.trim(), "" | "false" | "0")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves a dot-separated path into a JSON value, with numeric segments
/// treated as array indices (e.g. `"items.0.id"`).
fn resolve_json_path(value: &Value, path: &str) -> Option<Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = if let Ok(index) = segment.parse::<usize>() {
            current.as_array()?.get(index)?
        } else {
            current.as_object()?.get(segment)?
        };
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_trigger(trigger_data: Value) -> ExecutionContext {
        ExecutionContext::new(Uuid::now_v7(), Uuid::now_v7(), trigger_data)
    }

    #[test]
    fn resolves_static_and_literal_params() {
        let ctx = ctx_with_trigger(Value::Null);
        let node = NodeId::new();
        assert_eq!(
            ctx.resolve_param(node, &ParamValue::static_value(serde_json::json!(1)))
                .unwrap(),
            serde_json::json!(1)
        );
        assert_eq!(
            ctx.resolve_param(node, &ParamValue::Literal(serde_json::json!("x")))
                .unwrap(),
            serde_json::json!("x")
        );
    }

    #[test]
    fn resolves_ref_param_from_prior_output() {
        let mut ctx = ctx_with_trigger(Value::Null);
        let upstream = NodeId::new();
        ctx.record(NodeResult {
            node_id: upstream,
            output: serde_json::json!({"body": {"id": 42}}),
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });

        let requesting = NodeId::new();
        let resolved = ctx
            .resolve_param(requesting, &ParamValue::reference(upstream, "body.id"))
            .unwrap();
        assert_eq!(resolved, serde_json::json!(42));
    }

    #[test]
    fn missing_ref_path_fails_with_missing_reference() {
        let mut ctx = ctx_with_trigger(Value::Null);
        let upstream = NodeId::new();
        ctx.record(NodeResult {
            node_id: upstream,
            output: serde_json::json!({"body": {}}),
            parameters_snapshot: Value::Null,
            timing: Timing::instant(),
            attempt: 1,
        });

        let requesting = NodeId::new();
        let err = ctx
            .resolve_param(requesting, &ParamValue::reference(upstream, "body.missing"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingReference { .. }));
    }

    #[test]
    fn resolves_expression_template_over_trigger_scope() {
        let ctx = ctx_with_trigger(serde_json::json!({"channel": "general"}));
        let node = NodeId::new();
        let resolved = ctx
            .resolve_template(node, "post to #{{trigger.channel}}")
            .unwrap();
        assert_eq!(resolved, "post to #general");
    }

    #[test]
    fn resolves_array_index_segments() {
        let ctx = ctx_with_trigger(serde_json::json!({"items": [{"id": "a"}, {"id": "b"}]}));
        let node = NodeId::new();
        let resolved = ctx.resolve_template(node, "{{trigger.items.1.id}}").unwrap();
        assert_eq!(resolved, "b");
    }

    #[test]
    fn resolves_loop_variable_bound_for_the_current_iteration() {
        let mut ctx = ctx_with_trigger(Value::Null);
        let node = NodeId::new();
        ctx.bind_loop_var("item", serde_json::json!({"id": "a"}));
        assert_eq!(
            ctx.resolve_template(node, "{{item.id}}").unwrap(),
            "a"
        );
        ctx.unbind_loop_var("item");
        assert!(ctx.resolve_template(node, "{{item.id}}").is_err());
    }

    #[test]
    fn truthy_check_treats_empty_false_and_zero_as_false() {
        assert!(!is_truthy(""));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("0"));
        assert!(is_truthy("true"));
        assert!(is_truthy("1"));
    }
}
