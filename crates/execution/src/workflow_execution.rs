//! The persistent workflow execution record and its ephemeral runtime
//! index.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use prana_core::{ExecutionId, NodeKey, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node_execution::NodeExecution;
use crate::status::WorkflowStatus;
use crate::suspension::SuspensionType;

/// A pending write to a node's input port, used to resolve multi-producer
/// ports on latest-wins-by-`execution_index` policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInput {
    /// The routed data.
    pub data: Value,
    /// The `execution_index` of the producer that wrote it; later writers
    /// with a greater index replace earlier ones.
    pub written_at_execution_index: u64,
}

/// The durable record of one workflow run. The host is expected to
/// persist this verbatim between steps; [`ExecutionRuntime`] is rebuilt
/// from it on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Stable identifier for this execution.
    pub id: ExecutionId,
    /// The workflow (and version) this execution was compiled from.
    pub execution_graph_ref: WorkflowId,
    /// Current workflow-level status.
    pub status: WorkflowStatus,
    /// The node type that triggered this run (informational).
    pub trigger_type: String,
    /// Workflow-scoped variables, mutable via
    /// `ActionOutcome::CompletedWithSharedState`.
    pub vars: Map<String, Value>,
    /// Every run of every node, in append order, grouped by node.
    #[serde(default)]
    pub node_executions: HashMap<NodeKey, Vec<NodeExecution>>,
    /// The next `execution_index` to assign.
    pub current_execution_index: u64,
    /// The node currently suspended, if `status == suspended`.
    pub suspended_node_key: Option<NodeKey>,
    /// The kind of the current suspension.
    pub suspension_type: Option<SuspensionType>,
    /// The current suspension's type-specific data.
    pub suspension_data: Option<Value>,
    /// When the current suspension began.
    pub suspended_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Caller-supplied data captured at `initialize_execution` time.
    pub preparation_data: Map<String, Value>,
    /// Free-form host metadata, opaque to the engine.
    pub metadata: Map<String, Value>,
}

impl WorkflowExecution {
    /// Start a brand-new execution record for `graph`, not yet running.
    #[must_use]
    pub fn new(
        id: ExecutionId,
        execution_graph_ref: WorkflowId,
        trigger_type: impl Into<String>,
        vars: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            execution_graph_ref,
            status: WorkflowStatus::Pending,
            trigger_type: trigger_type.into(),
            vars,
            node_executions: HashMap::new(),
            current_execution_index: 0,
            suspended_node_key: None,
            suspension_type: None,
            suspension_data: None,
            suspended_at: None,
            preparation_data: Map::new(),
            metadata: Map::new(),
        }
    }

    /// The runs recorded for `node_key`, oldest first.
    #[must_use]
    pub fn runs_of(&self, node_key: &NodeKey) -> &[NodeExecution] {
        self.node_executions
            .get(node_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The next `run_index` that would be assigned to `node_key`.
    #[must_use]
    pub fn next_run_index(&self, node_key: &NodeKey) -> u64 {
        self.runs_of(node_key).len() as u64
    }

    /// Allocate and return the next `execution_index`, incrementing the
    /// counter.
    pub fn next_execution_index(&mut self) -> u64 {
        let index = self.current_execution_index;
        self.current_execution_index += 1;
        index
    }
}

/// Ephemeral, derivable-from-persistent-state runtime index kept beside a
/// [`WorkflowExecution`] while it is active in a process. Never persisted
/// directly; rebuilt by
/// [`crate::mutators::rebuild_runtime`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionRuntime {
    /// Each node's latest output, for `$nodes.X.output`.
    pub nodes: HashMap<NodeKey, Value>,
    /// Each node's latest context data, for `$nodes.X.context`.
    pub node_contexts: HashMap<NodeKey, Value>,
    /// Caller-supplied environment, plugged in verbatim on
    /// start/resume.
    pub env: Map<String, Value>,
    /// Nodes that are ready or pending, in activation order (branch
    /// following needs insertion order, hence `IndexSet` rather than a
    /// plain set).
    pub active_nodes: IndexSet<NodeKey>,
    /// Distance from the trigger along the path that activated each node.
    pub node_depth: HashMap<NodeKey, u64>,
    /// Data routed to a node's input port but not yet consumed, keyed by
    /// destination. Latest write (by `execution_index`) wins.
    pub pending_inputs: HashMap<(NodeKey, String), PendingInput>,
    /// Main-loop iteration counter, checked against `max_iterations`.
    pub iteration_count: u64,
    /// Ordered trace of every node key executed, for diagnostics.
    pub executed_nodes: Vec<NodeKey>,
}

impl ExecutionRuntime {
    /// A fresh runtime with the given environment and nothing else
    /// populated, used when starting a brand-new execution (as opposed to
    /// rebuilding one from history).
    #[must_use]
    pub fn fresh(env: Map<String, Value>) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    /// Record or overwrite the pending input for `(node_key, port)` if
    /// `execution_index` is newer than any prior writer.
    pub fn route_input(
        &mut self,
        node_key: NodeKey,
        port: impl Into<String>,
        data: Value,
        execution_index: u64,
    ) {
        let key = (node_key, port.into());
        let should_write = self
            .pending_inputs
            .get(&key)
            .is_none_or(|existing| execution_index >= existing.written_at_execution_index);
        if should_write {
            self.pending_inputs.insert(
                key,
                PendingInput {
                    data,
                    written_at_execution_index: execution_index,
                },
            );
        }
    }

    /// Collect every pending input addressed to `node_key` into a
    /// `port → data` map, consuming it from the pending set. Ports are
    /// collected in sorted order so the result (and the `input_data` a
    /// host persists from it) is stable across runs, independent of the
    /// underlying map's iteration order.
    pub fn take_routed_input(&mut self, node_key: &NodeKey) -> IndexMap<String, Value> {
        let mut collected = IndexMap::new();
        let mut keys: Vec<_> = self
            .pending_inputs
            .keys()
            .filter(|(key, _)| key == node_key)
            .cloned()
            .collect();
        keys.sort_by(|a, b| a.1.cmp(&b.1));
        for key in keys {
            if let Some(pending) = self.pending_inputs.remove(&key) {
                collected.insert(key.1, pending.data);
            }
        }
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_execution_index_increments() {
        let mut exec = WorkflowExecution::new(
            ExecutionId::v4(),
            WorkflowId::v4(),
            "trigger.manual",
            Map::new(),
        );
        assert_eq!(exec.next_execution_index(), 0);
        assert_eq!(exec.next_execution_index(), 1);
        assert_eq!(exec.current_execution_index, 2);
    }

    #[test]
    fn next_run_index_is_zero_for_unrun_node() {
        let exec = WorkflowExecution::new(
            ExecutionId::v4(),
            WorkflowId::v4(),
            "trigger.manual",
            Map::new(),
        );
        assert_eq!(exec.next_run_index(&NodeKey::new("a")), 0);
    }

    #[test]
    fn route_input_latest_wins() {
        let mut runtime = ExecutionRuntime::fresh(Map::new());
        runtime.route_input(NodeKey::new("n"), "main", serde_json::json!(1), 0);
        runtime.route_input(NodeKey::new("n"), "main", serde_json::json!(2), 5);
        runtime.route_input(NodeKey::new("n"), "main", serde_json::json!(99), 3);

        let routed = runtime.take_routed_input(&NodeKey::new("n"));
        assert_eq!(routed.get("main"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn take_routed_input_drains_pending_set() {
        let mut runtime = ExecutionRuntime::fresh(Map::new());
        runtime.route_input(NodeKey::new("n"), "main", serde_json::json!(1), 0);
        let _ = runtime.take_routed_input(&NodeKey::new("n"));
        assert!(runtime.pending_inputs.is_empty());
    }

    #[test]
    fn multi_port_input_collects_all_ports() {
        let mut runtime = ExecutionRuntime::fresh(Map::new());
        runtime.route_input(NodeKey::new("n"), "a", serde_json::json!("x"), 0);
        runtime.route_input(NodeKey::new("n"), "b", serde_json::json!("y"), 1);

        let routed = runtime.take_routed_input(&NodeKey::new("n"));
        assert_eq!(routed.len(), 2);
    }

    #[test]
    fn multi_port_input_order_is_stable_regardless_of_write_order() {
        let mut runtime = ExecutionRuntime::fresh(Map::new());
        runtime.route_input(NodeKey::new("n"), "zeta", serde_json::json!(1), 0);
        runtime.route_input(NodeKey::new("n"), "alpha", serde_json::json!(2), 1);
        runtime.route_input(NodeKey::new("n"), "mid", serde_json::json!(3), 2);

        let routed = runtime.take_routed_input(&NodeKey::new("n"));
        let ports: Vec<&str> = routed.keys().map(String::as_str).collect();
        assert_eq!(ports, vec!["alpha", "mid", "zeta"]);
    }
}
