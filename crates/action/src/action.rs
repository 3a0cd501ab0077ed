//! The action trait every node type implements.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::metadata::ActionSpecification;
use crate::outcome::ActionOutcome;

/// A unit of work a node can be bound to. Implementations are registered
/// with an [`crate::ActionRegistry`] at host startup and looked up by
/// [`ActionSpecification::name`].
///
/// `execute`/`resume` are `async fn` because actions may need to perform
/// I/O (HTTP calls, reading a queue, talking to a database); the graph
/// executor still awaits exactly one node at a time — this is
/// cooperative concurrency within a node, not parallel node execution.
#[async_trait]
pub trait Action: Send + Sync {
    /// The static description of this action.
    fn specification(&self) -> ActionSpecification;

    /// Validate and normalize `params` before `execute`. The default
    /// passes them through unchanged.
    fn validate_params(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ActionError> {
        Ok(params)
    }

    /// Run the action once.
    async fn execute(&self, params: Map<String, Value>, context: ActionContext) -> ActionOutcome;

    /// Resume a previously suspended run. Only meaningful for actions
    /// that can return `ActionOutcome::Suspended`; the default fails,
    /// since most actions never suspend.
    async fn resume(
        &self,
        _params: Map<String, Value>,
        _context: ActionContext,
        _resume_data: Value,
    ) -> ActionOutcome {
        ActionOutcome::failed(serde_json::json!({
            "code": "resume_not_supported",
            "message": "this action does not support resuming",
        }))
    }
}
