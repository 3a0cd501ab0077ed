//! Errors produced while compiling a [`crate::Workflow`] into an
//! [`crate::ExecutionGraph`].

use prana_core::NodeKey;
use thiserror::Error;

/// Failure modes of [`crate::compile`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// No node in the workflow resolves to `ActionKind::Trigger`.
    #[error("workflow has no trigger nodes")]
    NoTriggerNodes,

    /// More than one trigger node exists and none was specified to
    /// disambiguate.
    #[error("workflow has multiple trigger nodes ({0:?}); specify one explicitly")]
    MultipleTriggersFound(Vec<NodeKey>),

    /// A trigger node key was specified explicitly but does not exist in
    /// the workflow.
    #[error("trigger node {0:?} not found in workflow")]
    TriggerNodeNotFound(NodeKey),

    /// A trigger node key was specified explicitly but its `node_type`
    /// does not resolve to `ActionKind::Trigger`.
    #[error("node {key:?} of type {node_type:?} is not a trigger")]
    NodeNotTrigger {
        /// The node that was asked to act as the trigger.
        key: NodeKey,
        /// Its actual, non-trigger action type.
        node_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            CompileError::NoTriggerNodes.to_string(),
            "workflow has no trigger nodes"
        );
    }
}
