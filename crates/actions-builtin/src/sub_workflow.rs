//! Synchronous sub-workflow calls.
//!
//! `sub_workflow.call` suspends the node with [`SuspensionType::SubWorkflowSync`]
//! on its first run and relies entirely on the host to start the child
//! workflow, wait for it, and call back into `resume` with the child's
//! result — the action itself never runs a child execution.

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_core::{ActionKind, WorkflowId};
use prana_execution::{FailureStrategy, SubWorkflowSuspension, SuspensionType};
use serde_json::{Map, Value};

/// `sub_workflow.call` — params `{ "workflow_id": <uuid>, "input": <template>,
/// "timeout_ms": <int> }`. Suspends on first run; on resume, completes
/// with the child's result through `"main"`, or fails if the host reports
/// the child failed and `failure_strategy` is `propagate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallSubWorkflow;

#[async_trait]
impl Action for CallSubWorkflow {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new(
            "sub_workflow.call",
            ActionKind::Wait,
            vec!["main".into()],
            vec!["main".into()],
        )
    }

    async fn execute(&self, params: Map<String, Value>, context: ActionContext) -> ActionOutcome {
        let Some(workflow_id) = params
            .get("workflow_id")
            .and_then(Value::as_str)
            .and_then(|s| WorkflowId::parse(s).ok())
        else {
            return ActionOutcome::failed(serde_json::json!({
                "code": "validation_error",
                "message": "sub_workflow.call requires a uuid \"workflow_id\" param",
            }));
        };
        let input_data = params
            .get("input")
            .cloned()
            .or_else(|| context.main_input().cloned())
            .unwrap_or(Value::Null);
        let timeout_ms = params.get("timeout_ms").and_then(Value::as_u64).unwrap_or(60_000);

        ActionOutcome::Suspended {
            suspension_type: SuspensionType::SubWorkflowSync,
            data: serde_json::to_value(SubWorkflowSuspension {
                workflow_id,
                input_data,
                timeout_ms,
                failure_strategy: FailureStrategy::Propagate,
            })
            .expect("SubWorkflowSuspension always serializes"),
        }
    }

    async fn resume(
        &self,
        _params: Map<String, Value>,
        _context: ActionContext,
        resume_data: Value,
    ) -> ActionOutcome {
        let succeeded = resume_data
            .get("succeeded")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let output = resume_data.get("output").cloned().unwrap_or(Value::Null);

        if succeeded {
            ActionOutcome::completed(output)
        } else {
            ActionOutcome::failed(serde_json::json!({
                "code": "sub_workflow_failed",
                "message": "child workflow did not complete successfully",
                "output": output,
            }))
        }
    }
}
