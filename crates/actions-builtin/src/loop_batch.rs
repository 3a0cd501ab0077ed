//! Batch iteration over an ordinary graph cycle.
//!
//! There is no dedicated loop construct: a loop is just a connection
//! back to an earlier node. `data.for_each_batch`
//! carries its own cursor across runs via `context_data`, read back on
//! the next run through `$nodes[self].context` — the same mechanism any
//! stateful node uses to remember where it left off.

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_core::ActionKind;
use serde_json::{Map, Value};

/// `data.for_each_batch` — first run reads `{ "items": [...], "batch_size":
/// <int> }` from its rendered params; every loop-back run instead reads
/// its own previous `remaining`/`batch_size` from `$nodes[self].context`.
/// Emits the next slice on `"batch"`, or `{}` on `"done"` once nothing is
/// left.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForEachBatch;

#[derive(Debug, Clone)]
struct Cursor {
    remaining: Vec<Value>,
    batch_size: usize,
}

impl ForEachBatch {
    fn start(params: &Map<String, Value>) -> Result<Cursor, Value> {
        let items = match params.get("items") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(serde_json::json!({
                    "code": "validation_error",
                    "message": "for_each_batch requires an array \"items\" param",
                }));
            }
        };
        let batch_size = params
            .get("batch_size")
            .and_then(Value::as_u64)
            .unwrap_or(1)
            .max(1) as usize;
        Ok(Cursor {
            remaining: items,
            batch_size,
        })
    }

    fn resume(context: &ActionContext) -> Option<Cursor> {
        let ctx = context.own_previous_context()?;
        let remaining = ctx.get("remaining")?.as_array()?.clone();
        let batch_size = ctx.get("batch_size")?.as_u64()? as usize;
        Some(Cursor { remaining, batch_size })
    }
}

#[async_trait]
impl Action for ForEachBatch {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new(
            "data.for_each_batch",
            ActionKind::Action,
            vec!["main".into()],
            vec!["batch".into(), "done".into()],
        )
    }

    async fn execute(&self, params: Map<String, Value>, context: ActionContext) -> ActionOutcome {
        let cursor = if context.execution.loopback {
            match Self::resume(&context) {
                Some(c) => c,
                None => {
                    return ActionOutcome::failed(serde_json::json!({
                        "code": "validation_error",
                        "message": "missing loop-back context for for_each_batch",
                    }));
                }
            }
        } else {
            match Self::start(&params) {
                Ok(c) => c,
                Err(error) => return ActionOutcome::failed(error),
            }
        };

        if cursor.remaining.is_empty() {
            return ActionOutcome::Completed {
                output_data: serde_json::json!({}),
                output_port: "done".to_string(),
                context_data: Some(serde_json::json!({
                    "remaining": Vec::<Value>::new(),
                    "batch_size": cursor.batch_size,
                    "has_more_item": false,
                })),
            };
        }

        let take = cursor.batch_size.min(cursor.remaining.len());
        let batch: Vec<Value> = cursor.remaining[..take].to_vec();
        let rest: Vec<Value> = cursor.remaining[take..].to_vec();
        let has_more = !rest.is_empty();

        ActionOutcome::Completed {
            output_data: serde_json::json!({ "batch": batch }),
            output_port: "batch".to_string(),
            context_data: Some(serde_json::json!({
                "remaining": rest,
                "batch_size": cursor.batch_size,
                "has_more_item": has_more,
            })),
        }
    }
}
