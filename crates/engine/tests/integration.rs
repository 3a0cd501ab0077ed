//! End-to-end scenarios exercising the full stack: workflow → compiler →
//! execution state → graph executor → actions, run through the
//! [`Engine`] facade exactly as a host would.

use std::sync::Arc;

use async_trait::async_trait;
use prana_action::{Action, ActionContext, ActionOutcome, ActionSpecification};
use prana_actions_builtin::{AlwaysFail, CallSubWorkflow, Compute, ForEachBatch, IfCondition, ManualTrigger};
use prana_core::{ActionKind, ExecutionId, NodeKey, WorkflowId};
use prana_engine::{Engine, EngineError, GraphExecutorConfig, StepResult};
use prana_execution::{NodeExecutionStatus, WorkflowStatus};
use prana_graph::{Connection, Node, NodeSettings, OnErrorPolicy, Workflow};
use serde_json::{Map, Value};

/// Completes on `"main"` with its input echoed back untouched. Used
/// wherever a scenario needs a node that just marks "this branch ran"
/// without transforming data.
struct PassThrough;

#[async_trait]
impl Action for PassThrough {
    fn specification(&self) -> ActionSpecification {
        ActionSpecification::new("test.pass_through", ActionKind::Action, vec!["main".into()], vec!["main".into()])
    }

    async fn execute(&self, _params: Map<String, Value>, context: ActionContext) -> ActionOutcome {
        ActionOutcome::completed(context.main_input().cloned().unwrap_or(Value::Null))
    }
}

fn v1() -> semver::Version {
    semver::Version::new(1, 0, 0)
}

fn base_engine() -> Engine {
    let mut engine = Engine::new();
    engine.register_action(Arc::new(ManualTrigger));
    engine.register_action(Arc::new(IfCondition));
    engine.register_action(Arc::new(Compute));
    engine.register_action(Arc::new(ForEachBatch));
    engine.register_action(Arc::new(CallSubWorkflow));
    engine.register_action(Arc::new(AlwaysFail));
    engine.register_action(Arc::new(PassThrough));
    engine
}

fn params(fields: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in fields {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

// 1. Sequential chain: trigger -> A doubles -> B adds 1.
#[tokio::test]
async fn sequential_chain_produces_expected_outputs_at_every_step() {
    let engine = base_engine();

    let mut wf = Workflow::new(WorkflowId::v4(), "sequential-chain", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(
        Node::new(NodeKey::new("a"), "data.compute").with_params(params(&[
            ("op", Value::String("multiply".into())),
            ("value", Value::String("{{ $input.main.value }}".into())),
            ("operand", serde_json::json!(2)),
        ])),
    );
    wf.add_node(
        Node::new(NodeKey::new("b"), "data.compute").with_params(params(&[
            ("op", Value::String("add".into())),
            ("value", Value::String("{{ $input.main.value }}".into())),
            ("operand", serde_json::json!(1)),
        ])),
    );
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("a"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("a"), "main", NodeKey::new("b"), "main"));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let result = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, serde_json::json!({"value": 10}))
        .await
        .unwrap();

    assert_eq!(result, StepResult::Completed);
    assert_eq!(execution.status, WorkflowStatus::Completed);
    assert_eq!(
        execution.runs_of(&NodeKey::new("trigger"))[0].output_data,
        Some(serde_json::json!({"value": 10}))
    );
    assert_eq!(
        execution.runs_of(&NodeKey::new("a"))[0].output_data,
        Some(serde_json::json!({"value": 20}))
    );
    assert_eq!(
        execution.runs_of(&NodeKey::new("b"))[0].output_data,
        Some(serde_json::json!({"value": 21}))
    );
}

// 2. IF/ELSE branch: only the taken branch ever runs.
#[tokio::test]
async fn if_condition_routes_through_exactly_one_branch() {
    let engine = base_engine();

    let mut wf = Workflow::new(WorkflowId::v4(), "if-else", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(
        Node::new(NodeKey::new("cond"), "logic.if_condition").with_params(params(&[
            ("value", Value::String("{{ $input.main.x }}".into())),
            ("operator", Value::String("gt".into())),
            ("against", serde_json::json!(5)),
        ])),
    );
    wf.add_node(Node::new(NodeKey::new("t"), "test.pass_through"));
    wf.add_node(Node::new(NodeKey::new("f"), "test.pass_through"));
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("cond"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("cond"), "true", NodeKey::new("t"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("cond"), "false", NodeKey::new("f"), "main"));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let result = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, serde_json::json!({"x": 7}))
        .await
        .unwrap();

    assert_eq!(result, StepResult::Completed);
    assert_eq!(
        execution.runs_of(&NodeKey::new("cond"))[0].output_port.as_deref(),
        Some("true")
    );
    assert_eq!(execution.runs_of(&NodeKey::new("t")).len(), 1);
    assert!(execution.runs_of(&NodeKey::new("f")).is_empty());
}

// 3. Suspend and resume around a synchronous sub-workflow call.
#[tokio::test]
async fn sub_workflow_sync_suspends_then_resumes_with_child_output() {
    let engine = base_engine();

    let mut wf = Workflow::new(WorkflowId::v4(), "calls-child", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(
        Node::new(NodeKey::new("call_sub"), "sub_workflow.call")
            .with_params(params(&[("workflow_id", serde_json::json!(WorkflowId::v4().to_string()))])),
    );
    wf.add_node(Node::new(NodeKey::new("after"), "test.pass_through"));
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("call_sub"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("call_sub"), "main", NodeKey::new("after"), "main"));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let result = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, serde_json::json!({"n": 1}))
        .await
        .unwrap();
    assert_eq!(result, StepResult::Suspended);
    assert_eq!(execution.status, WorkflowStatus::Suspended);
    assert_eq!(execution.suspended_node_key, Some(NodeKey::new("call_sub")));

    let child_result = serde_json::json!({"succeeded": true, "output": {"total": 42}});
    let result = engine
        .resume_workflow(&graph, &mut execution, &mut runtime, child_result)
        .await
        .unwrap();

    assert_eq!(result, StepResult::Completed);
    assert_eq!(execution.status, WorkflowStatus::Completed);
    assert_eq!(
        execution.runs_of(&NodeKey::new("call_sub"))[0].output_data,
        Some(serde_json::json!({"total": 42}))
    );
    assert_eq!(
        execution.runs_of(&NodeKey::new("after"))[0].output_data,
        Some(serde_json::json!({"total": 42}))
    );
}

// 4. For-each batch loop over [1..5] with batch_size=2.
#[tokio::test]
async fn for_each_batch_loop_drains_the_collection_in_batches() {
    let engine = base_engine();

    let mut wf = Workflow::new(WorkflowId::v4(), "batch-loop", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(
        Node::new(NodeKey::new("loop"), "data.for_each_batch").with_params(params(&[
            ("items", serde_json::json!([1, 2, 3, 4, 5])),
            ("batch_size", serde_json::json!(2)),
        ])),
    );
    wf.add_node(Node::new(NodeKey::new("process"), "test.pass_through"));
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("loop"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("loop"), "batch", NodeKey::new("process"), "main"));
    wf.add_connection(Connection::new(
        NodeKey::new("process"),
        "main",
        NodeKey::new("loop"),
        "batch_results",
    ));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let result = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, Value::Null)
        .await
        .unwrap();

    assert_eq!(result, StepResult::Completed);
    assert_eq!(execution.status, WorkflowStatus::Completed);

    let loop_runs = execution.runs_of(&NodeKey::new("loop"));
    assert_eq!(loop_runs.len(), 4);
    assert_eq!(loop_runs[0].output_data, Some(serde_json::json!({"batch": [1, 2]})));
    assert_eq!(loop_runs[0].context_data.as_ref().unwrap()["has_more_item"], true);
    assert_eq!(loop_runs[1].output_data, Some(serde_json::json!({"batch": [3, 4]})));
    assert_eq!(loop_runs[2].output_data, Some(serde_json::json!({"batch": [5]})));
    assert_eq!(loop_runs[2].context_data.as_ref().unwrap()["has_more_item"], false);
    assert_eq!(loop_runs[3].output_data, Some(serde_json::json!({})));
    assert_eq!(loop_runs[3].output_port.as_deref(), Some("done"));

    assert_eq!(execution.runs_of(&NodeKey::new("process")).len(), 3);
}

// 5. Iteration cap trips on an unbroken self-loop.
#[tokio::test]
async fn infinite_loop_protection_trips_at_exactly_max_iterations() {
    let engine = base_engine().with_config(GraphExecutorConfig { max_iterations: 5 });

    let mut wf = Workflow::new(WorkflowId::v4(), "self-loop", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(Node::new(NodeKey::new("spin"), "test.pass_through"));
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("spin"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("spin"), "main", NodeKey::new("spin"), "main"));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let err = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, Value::Null)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InfiniteLoopProtection(5)));
    let total_runs: usize = execution.node_executions.values().map(Vec::len).sum();
    assert_eq!(total_runs, 5);
}

// 6. Error continuation: a failed node with on_error = continue routes
// its error data to a fallback.
#[tokio::test]
async fn failed_node_with_continue_policy_routes_error_to_fallback() {
    let engine = base_engine();

    let mut wf = Workflow::new(WorkflowId::v4(), "error-continuation", v1());
    wf.add_node(Node::new(NodeKey::new("trigger"), "trigger.manual"));
    wf.add_node(
        Node::new(NodeKey::new("risky"), "test.always_fail")
            .with_params(params(&[("message", Value::String("boom".into()))]))
            .with_settings(NodeSettings {
                on_error: OnErrorPolicy::Continue,
                ..Default::default()
            }),
    );
    wf.add_node(Node::new(NodeKey::new("fallback"), "test.pass_through"));
    wf.add_connection(Connection::new(NodeKey::new("trigger"), "main", NodeKey::new("risky"), "main"));
    wf.add_connection(Connection::new(NodeKey::new("risky"), "error", NodeKey::new("fallback"), "main"));

    let graph = engine.compile(&wf, None).unwrap();
    let (mut execution, mut runtime) = engine.initialize_execution(&graph, ExecutionId::v4(), Map::new(), Map::new());

    let result = engine
        .execute_workflow(&graph, &mut execution, &mut runtime, Value::Null)
        .await
        .unwrap();

    assert_eq!(result, StepResult::Completed);
    assert_eq!(execution.status, WorkflowStatus::Completed);
    assert_eq!(
        execution.runs_of(&NodeKey::new("risky"))[0].status,
        NodeExecutionStatus::Failed
    );
    let fallback_output = execution.runs_of(&NodeKey::new("fallback"))[0].output_data.clone().unwrap();
    assert_eq!(fallback_output["code"], "always_fails");
}
