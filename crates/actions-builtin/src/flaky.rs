//! Actions that fail on purpose, for exercising `on_error` policies and
//! downstream error routing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_core::ActionKind;
use serde_json::{Map, Value};

/// `test.always_fail` — fails unconditionally with a fixed error payload.
/// Exists purely to drive error-continuation scenarios in tests; no real
/// host would register this.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

#[async_trait]
impl Action for AlwaysFail {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new(
            "test.always_fail",
            ActionKind::Action,
            vec!["main".into()],
            vec!["main".into()],
        )
    }

    async fn execute(&self, params: Map<String, Value>, _context: ActionContext) -> ActionOutcome {
        let message = params
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("this action always fails")
            .to_string();
        ActionOutcome::failed(serde_json::json!({
            "code": "always_fails",
            "message": message,
        }))
    }
}

/// `test.flaky` — fails until it has been invoked `succeed_after` times,
/// then completes. Shares its attempt counter across invocations (a
/// single `Flaky` instance is registered once, as actions normally are),
/// so it exercises the engine's `retry_on_failed`/`max_retries` node
/// settings and the `retry` suspension type the way a real
/// transient-failure action (a rate-limited HTTP call, say) would.
#[derive(Clone)]
pub struct Flaky {
    attempts: Arc<AtomicU32>,
    succeed_after: u32,
}

impl Flaky {
    /// An action that fails on every attempt before the `succeed_after`th
    /// (1-indexed) and completes from then on.
    #[must_use]
    pub fn new(succeed_after: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            succeed_after,
        }
    }

    /// Total number of times `execute` has run so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Action for Flaky {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new(
            "test.flaky",
            ActionKind::Action,
            vec!["main".into()],
            vec!["main".into()],
        )
    }

    async fn execute(&self, _params: Map<String, Value>, _context: ActionContext) -> ActionOutcome {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < self.succeed_after {
            ActionOutcome::failed(serde_json::json!({"code": "flaky", "attempt": attempt}))
        } else {
            ActionOutcome::completed(serde_json::json!({"attempt": attempt}))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prana_core::{ExecutionId, NodeKey};
    use std::collections::HashMap;

    fn ctx() -> ActionContext {
        ActionContext {
            input: indexmap::IndexMap::new(),
            nodes: HashMap::new(),
            node_contexts: HashMap::new(),
            vars: Map::new(),
            env: Map::new(),
            execution: prana_action::ExecutionContext {
                execution_id: ExecutionId::v4(),
                current_node_key: NodeKey::new("boom"),
                run_index: 0,
                execution_index: 0,
                loopback: false,
            },
        }
    }

    #[tokio::test]
    async fn always_fails_with_the_declared_code() {
        let outcome = AlwaysFail.execute(Map::new(), ctx()).await;
        match outcome {
            ActionOutcome::Failed { error, .. } => assert_eq!(error["code"], "always_fails"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn flaky_fails_until_succeed_after_then_completes() {
        let flaky = Flaky::new(3);

        for expected_attempt in 1..3 {
            let outcome = flaky.execute(Map::new(), ctx()).await;
            match outcome {
                ActionOutcome::Failed { error, .. } => assert_eq!(error["attempt"], expected_attempt),
                other => panic!("expected Failed on attempt {expected_attempt}, got {other:?}"),
            }
        }

        match flaky.execute(Map::new(), ctx()).await {
            ActionOutcome::Completed { output_data, .. } => assert_eq!(output_data["attempt"], 3),
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(flaky.attempts(), 3);
    }
}
