//! The persistent, append-only record of a single node run.

use prana_core::NodeKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::status::NodeExecutionStatus;
use crate::suspension::SuspensionType;

/// One recorded run of a node. `node_executions[node_key]` is an ordered
/// list of these; its length is the number of times the node has run.
///
/// Append-only: once a `NodeExecution` transitions to `completed` or
/// `failed` it is never mutated again. The one narrow exception is a
/// `suspended` entry, which is mutated in place by `resume_node` when the
/// suspension clears (see [`crate::mutators::complete_suspended_node`]) —
/// resuming does not create a second history entry for the same attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExecution {
    /// The node this execution belongs to.
    pub node_key: NodeKey,
    /// Current status of this run.
    pub status: NodeExecutionStatus,
    /// Global, workflow-wide monotonic position in execution order.
    pub execution_index: u64,
    /// Per-node monotonic counter: 0 on first execution, 1 on first
    /// loop-back, and so on.
    pub run_index: u64,
    /// Rendered parameters as they were at the moment execution started.
    pub params_snapshot: Map<String, Value>,
    /// The multi-port input map supplied to this run.
    pub input_data: Map<String, Value>,
    /// The action's output data, once completed.
    pub output_data: Option<Value>,
    /// The output port the action routed through, once completed.
    pub output_port: Option<String>,
    /// Per-node metadata the action produced (e.g. loop state), read back
    /// on the next run via `$nodes[self].context`.
    pub context_data: Option<Value>,
    /// Structured error payload, once failed.
    pub error_data: Option<Value>,
    /// The suspension kind, if this run suspended.
    pub suspension_type: Option<SuspensionType>,
    /// The suspension's type-specific data, if this run suspended.
    pub suspension_data: Option<Value>,
    /// When this run started.
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When this run reached a terminal or suspended state.
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl NodeExecution {
    /// Construct a freshly started execution record, status `running`.
    #[must_use]
    pub fn start(
        node_key: NodeKey,
        execution_index: u64,
        run_index: u64,
        params_snapshot: Map<String, Value>,
        input_data: Map<String, Value>,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            node_key,
            status: NodeExecutionStatus::Running,
            execution_index,
            run_index,
            params_snapshot,
            input_data,
            output_data: None,
            output_port: None,
            context_data: None,
            error_data: None,
            suspension_type: None,
            suspension_data: None,
            started_at,
            completed_at: None,
        }
    }

    /// Returns `true` for a loop-back run (any run after the first).
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        self.run_index > 0
    }
}
