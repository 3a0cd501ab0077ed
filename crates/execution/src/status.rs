//! Workflow- and node-level execution status.

use serde::{Deserialize, Serialize};

/// The overall status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Created but not yet started.
    Pending,
    /// Actively executing nodes.
    Running,
    /// Waiting on one or more suspended nodes; no node is currently active.
    Suspended,
    /// Every reachable node finished without failing.
    Completed,
    /// A node failed and no `Continue` policy routed around it.
    Failed,
}

impl WorkflowStatus {
    /// Returns `true` if the workflow has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Suspended => write!(f, "suspended"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The status of a single recorded node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExecutionStatus {
    /// Started and not yet finished.
    Running,
    /// Returned `ActionOutcome::Completed` or `CompletedWithSharedState`.
    Completed,
    /// Returned `ActionOutcome::Failed`.
    Failed,
    /// Returned `ActionOutcome::Suspended`; awaiting an external resume.
    Suspended,
}

impl NodeExecutionStatus {
    /// Returns `true` if this status will never change without an explicit
    /// resume (`Suspended`) or is already final.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for NodeExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}
