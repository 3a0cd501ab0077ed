//! Execution error types.

use prana_core::NodeKey;
use thiserror::Error;

use crate::status::{NodeExecutionStatus, WorkflowStatus};

/// Errors that can occur while tracking or mutating execution state.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A workflow-level state transition is not valid from the current status.
    #[error("invalid workflow transition from {from} to {to}")]
    InvalidWorkflowTransition {
        /// Current status.
        from: WorkflowStatus,
        /// Attempted target status.
        to: WorkflowStatus,
    },

    /// A node-level state transition is not valid from the current status.
    #[error("invalid node transition from {from} to {to}")]
    InvalidNodeTransition {
        /// Current status.
        from: NodeExecutionStatus,
        /// Attempted target status.
        to: NodeExecutionStatus,
    },

    /// A referenced node does not exist in the compiled execution graph.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Resume was called against a node with no suspended execution.
    #[error("node {0:?} has no suspended execution to resume")]
    NoSuspendedExecution(NodeKey),

    /// The resume token passed does not match the pending suspension.
    #[error("resume token does not match suspended execution for node {0:?}")]
    ResumeTokenMismatch(NodeKey),

    /// A serialization or deserialization error on persisted execution state.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
