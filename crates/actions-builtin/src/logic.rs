//! Conditional branching.
//!
//! Connections carry no condition fields — routing is done
//! inside the action by choosing an output port. `logic.if_condition`
//! compares two rendered values and routes through `"true"` or `"false"`;
//! the comparison itself (`$input.main.x > 5`) happens here rather than in
//! the template language, which only resolves paths.

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionError, ActionSpecification};
use prana_core::ActionKind;
use serde_json::{Map, Value};

/// `logic.if_condition` — params `{ "value": <template>, "operator":
/// "gt"|"lt"|"gte"|"lte"|"eq"|"neq", "against": <number> }`. Routes the
/// untouched `$input.main` through `"true"` or `"false"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfCondition;

fn compare(value: f64, operator: &str, against: f64) -> Result<bool, ActionError> {
    match operator {
        "gt" => Ok(value > against),
        "gte" => Ok(value >= against),
        "lt" => Ok(value < against),
        "lte" => Ok(value <= against),
        "eq" => Ok((value - against).abs() < f64::EPSILON),
        "neq" => Ok((value - against).abs() >= f64::EPSILON),
        other => Err(ActionError::ValidationError(format!("unknown operator {other:?}"))),
    }
}

#[async_trait]
impl Action for IfCondition {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new(
            "logic.if_condition",
            ActionKind::Logic,
            vec!["main".into()],
            vec!["true".into(), "false".into()],
        )
    }

    async fn execute(&self, params: Map<String, Value>, context: ActionContext) -> ActionOutcome {
        let value = match params.get("value").and_then(Value::as_f64) {
            Some(v) => v,
            None => {
                return ActionOutcome::failed(serde_json::json!({
                    "code": "validation_error",
                    "message": "if_condition requires a numeric \"value\" param",
                }));
            }
        };
        let against = params.get("against").and_then(Value::as_f64).unwrap_or(0.0);
        let operator = params.get("operator").and_then(Value::as_str).unwrap_or("gt");

        let result = match compare(value, operator, against) {
            Ok(r) => r,
            Err(err) => return ActionOutcome::failed(serde_json::json!({"code": err.code(), "message": err.to_string()})),
        };

        let output_data = context.main_input().cloned().unwrap_or(Value::Null);
        ActionOutcome::Completed {
            output_data,
            output_port: if result { "true" } else { "false" }.to_string(),
            context_data: None,
        }
    }
}
