//! Numeric data transforms.
//!
//! Data transformation happens via template parameters, not connection
//! fields; `data.compute` is the simplest possible
//! transform action, doing one arithmetic operation on a rendered numeric
//! parameter. Real hosts plug in a far richer "data merge" action —
//! this one exists to drive the sequential-chain scenario in the tests.

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_core::ActionKind;
use serde_json::{Map, Value};

/// `data.compute` — params `{ "op": "add"|"multiply", "value":
/// <template, numeric>, "operand": <number> }`. Completes with
/// `{ "value": <result> }` on `"main"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compute;

#[async_trait]
impl Action for Compute {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new("data.compute", ActionKind::Action, vec!["main".into()], vec!["main".into()])
    }

    async fn execute(&self, params: Map<String, Value>, _context: ActionContext) -> ActionOutcome {
        let Some(value) = params.get("value") else {
            return ActionOutcome::failed(serde_json::json!({
                "code": "validation_error",
                "message": "data.compute requires a numeric \"value\" param",
            }));
        };
        let operand = params.get("operand").cloned().unwrap_or(serde_json::json!(0));
        let op = params.get("op").and_then(Value::as_str).unwrap_or("add");

        // Prefer exact integer arithmetic when both operands are whole
        // numbers, so e.g. doubling `10` yields `20`, not `20.0`.
        let result = match (value.as_i64(), operand.as_i64()) {
            (Some(a), Some(b)) => match op {
                "add" => serde_json::json!(a + b),
                "multiply" => serde_json::json!(a * b),
                other => {
                    return ActionOutcome::failed(serde_json::json!({
                        "code": "validation_error",
                        "message": format!("unknown op {other:?}"),
                    }));
                }
            },
            _ => {
                let Some(a) = value.as_f64() else {
                    return ActionOutcome::failed(serde_json::json!({
                        "code": "validation_error",
                        "message": "data.compute requires a numeric \"value\" param",
                    }));
                };
                let b = operand.as_f64().unwrap_or(0.0);
                match op {
                    "add" => serde_json::json!(a + b),
                    "multiply" => serde_json::json!(a * b),
                    other => {
                        return ActionOutcome::failed(serde_json::json!({
                            "code": "validation_error",
                            "message": format!("unknown op {other:?}"),
                        }));
                    }
                }
            }
        };

        ActionOutcome::completed(serde_json::json!({ "value": result }))
    }
}
