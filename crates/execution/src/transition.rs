//! State machine transition validation for workflow and node statuses.

use crate::error::ExecutionError;
use crate::status::{NodeExecutionStatus, WorkflowStatus};

/// Returns `true` if the workflow-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_workflow(from: WorkflowStatus, to: WorkflowStatus) -> bool {
    matches!(
        (from, to),
        (WorkflowStatus::Pending, WorkflowStatus::Running)
            | (WorkflowStatus::Running, WorkflowStatus::Suspended)
            | (WorkflowStatus::Running, WorkflowStatus::Completed)
            | (WorkflowStatus::Running, WorkflowStatus::Failed)
            | (WorkflowStatus::Suspended, WorkflowStatus::Running)
            | (WorkflowStatus::Suspended, WorkflowStatus::Failed)
    )
}

/// Validate a workflow-level transition, returning an error if invalid.
pub fn validate_workflow_transition(
    from: WorkflowStatus,
    to: WorkflowStatus,
) -> Result<(), ExecutionError> {
    if can_transition_workflow(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidWorkflowTransition { from, to })
    }
}

/// Returns `true` if the node-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_node(from: NodeExecutionStatus, to: NodeExecutionStatus) -> bool {
    matches!(
        (from, to),
        (NodeExecutionStatus::Running, NodeExecutionStatus::Completed)
            | (NodeExecutionStatus::Running, NodeExecutionStatus::Failed)
            | (NodeExecutionStatus::Running, NodeExecutionStatus::Suspended)
            | (NodeExecutionStatus::Suspended, NodeExecutionStatus::Completed)
            | (NodeExecutionStatus::Suspended, NodeExecutionStatus::Failed)
            | (NodeExecutionStatus::Suspended, NodeExecutionStatus::Suspended)
    )
}

/// Validate a node-level transition, returning an error if invalid.
pub fn validate_node_transition(
    from: NodeExecutionStatus,
    to: NodeExecutionStatus,
) -> Result<(), ExecutionError> {
    if can_transition_node(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidNodeTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_workflow_transitions() {
        assert!(can_transition_workflow(
            WorkflowStatus::Pending,
            WorkflowStatus::Running
        ));
        assert!(can_transition_workflow(
            WorkflowStatus::Running,
            WorkflowStatus::Suspended
        ));
        assert!(can_transition_workflow(
            WorkflowStatus::Suspended,
            WorkflowStatus::Running
        ));
        assert!(can_transition_workflow(
            WorkflowStatus::Running,
            WorkflowStatus::Completed
        ));
    }

    #[test]
    fn invalid_workflow_transitions() {
        assert!(!can_transition_workflow(
            WorkflowStatus::Completed,
            WorkflowStatus::Running
        ));
        assert!(!can_transition_workflow(
            WorkflowStatus::Pending,
            WorkflowStatus::Completed
        ));
    }

    #[test]
    fn validate_workflow_transition_err_message() {
        let err =
            validate_workflow_transition(WorkflowStatus::Failed, WorkflowStatus::Running)
                .unwrap_err();
        assert!(err.to_string().contains("invalid workflow transition"));
    }

    #[test]
    fn valid_node_transitions() {
        assert!(can_transition_node(
            NodeExecutionStatus::Running,
            NodeExecutionStatus::Completed
        ));
        assert!(can_transition_node(
            NodeExecutionStatus::Running,
            NodeExecutionStatus::Suspended
        ));
        assert!(can_transition_node(
            NodeExecutionStatus::Suspended,
            NodeExecutionStatus::Completed
        ));
    }

    #[test]
    fn suspended_can_resuspend() {
        assert!(can_transition_node(
            NodeExecutionStatus::Suspended,
            NodeExecutionStatus::Suspended
        ));
    }

    #[test]
    fn invalid_node_transitions() {
        assert!(!can_transition_node(
            NodeExecutionStatus::Completed,
            NodeExecutionStatus::Running
        ));
        assert!(!can_transition_node(
            NodeExecutionStatus::Failed,
            NodeExecutionStatus::Completed
        ));
    }
}
