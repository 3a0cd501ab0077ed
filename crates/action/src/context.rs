//! The structured context every action sees on `execute`/`resume`.

use std::collections::HashMap;

use indexmap::IndexMap;
use prana_core::{ExecutionId, NodeKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `$execution` — run bookkeeping visible to the action and its
/// templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The execution this run belongs to.
    pub execution_id: ExecutionId,
    /// The node currently executing.
    pub current_node_key: NodeKey,
    /// This node's per-node run counter.
    pub run_index: u64,
    /// This node's global execution-order position.
    pub execution_index: u64,
    /// `true` when `run_index > 0` — this is a loop-back run, not the
    /// node's first.
    pub loopback: bool,
}

/// The full context an [`crate::Action`] receives: multi-port input, the
/// rest of the run's state, and workflow-scoped variables and
/// environment.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// `$input` — `port_name → data` for this invocation.
    pub input: IndexMap<String, Value>,
    /// `$nodes` — every other node's latest output.
    pub nodes: HashMap<NodeKey, Value>,
    /// `$node_contexts` — every other node's latest context data.
    pub node_contexts: HashMap<NodeKey, Value>,
    /// `$vars` — workflow-scoped variables.
    pub vars: Map<String, Value>,
    /// `$env` — caller-supplied environment, plugged in verbatim.
    pub env: Map<String, Value>,
    /// `$execution` — run bookkeeping.
    pub execution: ExecutionContext,
}

impl ActionContext {
    /// The single value at `$input.main`, if present — the common case
    /// for simple, single-input nodes.
    #[must_use]
    pub fn main_input(&self) -> Option<&Value> {
        self.input.get(prana_graph::MAIN)
    }

    /// A previous run's output for `node_key`, as seen via `$nodes`.
    #[must_use]
    pub fn node_output(&self, node_key: &NodeKey) -> Option<&Value> {
        self.nodes.get(node_key)
    }

    /// This node's own context data from its previous run, read via
    /// `$nodes[self].context` — how loop-aware actions recover state on
    /// loop-back.
    #[must_use]
    pub fn own_previous_context(&self) -> Option<&Value> {
        self.node_contexts.get(&self.execution.current_node_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionContext {
        let mut input = IndexMap::new();
        input.insert("main".to_string(), serde_json::json!({"a": 1}));
        ActionContext {
            input,
            nodes: HashMap::new(),
            node_contexts: HashMap::new(),
            vars: Map::new(),
            env: Map::new(),
            execution: ExecutionContext {
                execution_id: ExecutionId::v4(),
                current_node_key: NodeKey::new("n1"),
                run_index: 0,
                execution_index: 0,
                loopback: false,
            },
        }
    }

    #[test]
    fn main_input_accessor() {
        let ctx = sample();
        assert_eq!(ctx.main_input(), Some(&serde_json::json!({"a": 1})));
    }

    #[test]
    fn own_previous_context_absent_on_first_run() {
        let ctx = sample();
        assert!(ctx.own_previous_context().is_none());
    }

    #[test]
    fn own_previous_context_present_on_loopback() {
        let mut ctx = sample();
        ctx.execution.run_index = 1;
        ctx.execution.loopback = true;
        ctx.node_contexts
            .insert(NodeKey::new("n1"), serde_json::json!({"batch": 2}));
        assert_eq!(ctx.own_previous_context(), Some(&serde_json::json!({"batch": 2})));
    }
}
