//! Workflow lifecycle events emitted to the event bus.

use prana_core::{ExecutionId, NodeKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lifecycle event the engine emits as it drives an execution.
///
/// Emitted in the order the engine performs the corresponding action;
/// per node, always `NodeStarting` before the matching
/// `NodeCompleted`/`NodeFailed`/`NodeSuspended`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A workflow execution began.
    ExecutionStarted {
        /// The execution that started.
        execution_id: ExecutionId,
    },
    /// A workflow execution reached `completed`.
    ExecutionCompleted {
        /// The execution that completed.
        execution_id: ExecutionId,
    },
    /// A workflow execution reached `failed`.
    ExecutionFailed {
        /// The execution that failed.
        execution_id: ExecutionId,
        /// Structured error payload.
        error: Value,
    },
    /// A workflow execution reached `suspended`.
    ExecutionSuspended {
        /// The execution that suspended.
        execution_id: ExecutionId,
        /// The node that suspended it.
        node_key: NodeKey,
    },
    /// A suspended workflow execution resumed.
    ExecutionResumed {
        /// The execution that resumed.
        execution_id: ExecutionId,
    },
    /// A node was selected for execution and is about to run.
    NodeStarting {
        /// The execution this node belongs to.
        execution_id: ExecutionId,
        /// The node about to run.
        node_key: NodeKey,
        /// Its per-node run counter for this run.
        run_index: u64,
    },
    /// A node finished successfully.
    NodeCompleted {
        /// The execution this node belongs to.
        execution_id: ExecutionId,
        /// The node that completed.
        node_key: NodeKey,
        /// The port it routed through.
        output_port: String,
    },
    /// A node failed.
    NodeFailed {
        /// The execution this node belongs to.
        execution_id: ExecutionId,
        /// The node that failed.
        node_key: NodeKey,
        /// Structured error payload.
        error: Value,
    },
    /// A node suspended.
    NodeSuspended {
        /// The execution this node belongs to.
        execution_id: ExecutionId,
        /// The node that suspended.
        node_key: NodeKey,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_tag_is_snake_case() {
        let event = Event::NodeStarting {
            execution_id: ExecutionId::v4(),
            node_key: NodeKey::new("n1"),
            run_index: 0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "node_starting");
    }

    #[test]
    fn serde_roundtrip() {
        let event = Event::ExecutionCompleted {
            execution_id: ExecutionId::v4(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let _back: Event = serde_json::from_str(&json).unwrap();
    }
}
