//! What an action hands back to the executor after `execute`/`resume`.

use prana_execution::SuspensionType;
use serde_json::{Map, Value};

use crate::PortName;

/// The result of running an action once.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Finished; route `output_data` through `output_port`. The port must
    /// be declared by the action's [`crate::ActionSpecification`] unless
    /// its output ports are dynamic.
    Completed {
        /// The produced output.
        output_data: Value,
        /// The port to route through.
        output_port: PortName,
        /// Optional per-node metadata read back on the node's next run
        /// (e.g. loop state) via `$nodes[self].context`.
        context_data: Option<Value>,
    },

    /// Like `Completed`, but additionally patches workflow-scoped `vars`.
    CompletedWithSharedState {
        /// The produced output.
        output_data: Value,
        /// The port to route through.
        output_port: PortName,
        /// Merged into the execution's `vars` by the executor.
        shared_state_patch: Map<String, Value>,
        /// Optional per-node metadata, as in `Completed`.
        context_data: Option<Value>,
    },

    /// Paused; the host is expected to eventually trigger a resume.
    Suspended {
        /// What kind of external event resumes this node.
        suspension_type: SuspensionType,
        /// Type-specific suspension payload.
        data: Value,
    },

    /// Failed. `output_port` defaults to `"error"` when routing is
    /// requested by an `on_error: continue` policy.
    Failed {
        /// Structured error payload.
        error: Value,
        /// Optional explicit routing port; `None` means `"error"`.
        output_port: Option<PortName>,
    },
}

impl ActionOutcome {
    /// Shorthand for a `Completed` outcome through the default `"main"`
    /// port with no context data.
    #[must_use]
    pub fn completed(output_data: Value) -> Self {
        Self::Completed {
            output_data,
            output_port: prana_graph::MAIN.to_string(),
            context_data: None,
        }
    }

    /// Shorthand for a `Failed` outcome with no explicit routing port.
    #[must_use]
    pub fn failed(error: Value) -> Self {
        Self::Failed {
            error,
            output_port: None,
        }
    }
}
