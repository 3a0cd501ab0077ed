//! The manual trigger: the simplest possible entry point for a workflow.
//!
//! Every execution's first node receives `routed_input = { "main": input_data }`;
//! this action just echoes that straight through as its output, so
//! `$nodes.<trigger key>.output` downstream is exactly the caller's
//! `input_data`.

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_core::ActionKind;
use serde_json::{Map, Value};

/// `trigger.manual` — starts a workflow, echoing the caller's input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTrigger;

#[async_trait]
impl Action for ManualTrigger {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new("trigger.manual", ActionKind::Trigger, vec![], vec!["main".into()])
    }

    async fn execute(&self, _params: Map<String, Value>, context: ActionContext) -> ActionOutcome {
        let input = context.main_input().cloned().unwrap_or(Value::Null);
        ActionOutcome::completed(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prana_core::{ExecutionId, NodeKey};
    use std::collections::HashMap;

    fn ctx_with_main(value: Value) -> ActionContext {
        let mut input = indexmap::IndexMap::new();
        input.insert("main".to_string(), value);
        ActionContext {
            input,
            nodes: HashMap::new(),
            node_contexts: HashMap::new(),
            vars: Map::new(),
            env: Map::new(),
            execution: prana_action::ExecutionContext {
                execution_id: ExecutionId::v4(),
                current_node_key: NodeKey::new("trigger"),
                run_index: 0,
                execution_index: 0,
                loopback: false,
            },
        }
    }

    #[tokio::test]
    async fn echoes_the_caller_supplied_input() {
        let outcome = ManualTrigger
            .execute(Map::new(), ctx_with_main(serde_json::json!({"value": 10})))
            .await;
        match outcome {
            ActionOutcome::Completed { output_data, output_port, .. } => {
                assert_eq!(output_data, serde_json::json!({"value": 10}));
                assert_eq!(output_port, "main");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }
}
