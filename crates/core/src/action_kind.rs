//! The coarse kind an action specification declares itself as.
//!
//! Lives in `prana-core` (rather than `prana-action`, where the rest of the
//! action interface lives) because the graph compiler needs it for trigger
//! selection without depending on the whole action crate — see
//! [`prana_graph`]'s `ActionKindResolver` port trait.

use serde::{Deserialize, Serialize};

/// What role an action plays in a workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Entry point of a workflow; exactly one is selected per execution.
    Trigger,
    /// A regular unit of work.
    Action,
    /// Conditional / branching / switch-style routing.
    Logic,
    /// Suspends execution pending an external event or timer.
    Wait,
    /// A terminal node that shapes the workflow's final output.
    Output,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Logic => "logic",
            Self::Wait => "wait",
            Self::Output => "output",
        };
        f.write_str(s)
    }
}
