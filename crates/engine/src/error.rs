//! Engine-level errors: stalls, caps, and the other failure modes that
//! are not an action's own doing.

use prana_core::NodeKey;
use thiserror::Error;

/// Errors the graph executor itself can raise, as distinct from a node's
/// action failing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `active_nodes` is non-empty but none of them are actually ready —
    /// a graph-construction bug, not a normal stall.
    #[error("no ready nodes found while {0} node(s) remain active")]
    NoReadyNodes(usize),

    /// The main loop hit `max_iterations` without the workflow reaching
    /// a terminal state.
    #[error("infinite loop protection triggered after {0} iterations")]
    InfiniteLoopProtection(u64),

    /// `resume_workflow` was called on an execution that is not
    /// suspended, or whose `suspended_node_key` does not resolve.
    #[error("invalid suspended execution: {0}")]
    InvalidSuspendedExecution(String),

    /// A node's rendered parameters failed validation.
    #[error("action error: {0}")]
    Action(#[from] prana_action::ActionError),

    /// A mutation of the execution state or runtime failed.
    #[error("execution state error: {0}")]
    Execution(#[from] prana_execution::ExecutionError),

    /// Compiling the workflow into an execution graph failed.
    #[error("compile error: {0}")]
    Compile(#[from] prana_graph::CompileError),

    /// A template failed to render.
    #[error("template render error on node {node_key:?}: {message}")]
    TemplateRenderError {
        /// The node whose params failed to render.
        node_key: NodeKey,
        /// The renderer's error message.
        message: String,
    },
}
