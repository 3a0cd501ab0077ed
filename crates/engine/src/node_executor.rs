//! The node executor: resolves an action, renders its parameters,
//! invokes it, and normalizes the result into a [`NodeExecution`].

use indexmap::IndexMap;
use prana_action::{ActionContext, ActionRegistry, ExecutionContext as ActionExecutionContext};
use prana_core::NodeKey;
use prana_execution::{ExecutionRuntime, NodeExecution, WorkflowExecution};
use prana_graph::Node;
use serde_json::{Map, Value};

use crate::template::TemplateRenderer;

/// The outcome of running or resuming one node, already normalized into
/// its [`NodeExecution`] history entry.
#[derive(Debug, Clone)]
pub enum NodeExecutionOutcome {
    /// The action completed; route through the carried port.
    Completed(NodeExecution),
    /// The action completed and additionally patched shared state.
    CompletedWithSharedState(NodeExecution, Map<String, Value>),
    /// The action suspended.
    Suspended(NodeExecution),
    /// The action failed, or the executor synthesized a failure (action
    /// not found, template render error, validation error, invalid
    /// output port).
    Failed(NodeExecution),
}

fn synthetic_error(code: &str, message: impl Into<String>) -> Value {
    serde_json::json!({ "code": code, "message": message.into() })
}

fn assemble_context(
    node_key: &NodeKey,
    execution: &WorkflowExecution,
    runtime: &ExecutionRuntime,
    routed_input: IndexMap<String, Value>,
    execution_index: u64,
    run_index: u64,
    loopback: bool,
) -> ActionContext {
    ActionContext {
        input: routed_input,
        nodes: runtime.nodes.clone(),
        node_contexts: runtime.node_contexts.clone(),
        vars: execution.vars.clone(),
        env: runtime.env.clone(),
        execution: ActionExecutionContext {
            execution_id: execution.id,
            current_node_key: node_key.clone(),
            run_index,
            execution_index,
            loopback,
        },
    }
}

/// Run `node` once: resolve its action, render its params, validate
/// them, invoke the action, and normalize the outcome.
#[allow(clippy::too_many_arguments)]
pub async fn execute_node(
    node: &Node,
    execution: &WorkflowExecution,
    runtime: &ExecutionRuntime,
    registry: &ActionRegistry,
    renderer: &dyn TemplateRenderer,
    routed_input: IndexMap<String, Value>,
    execution_index: u64,
    run_index: u64,
) -> NodeExecutionOutcome {
    let started_at = chrono::Utc::now();
    let input_data: Map<String, Value> = routed_input.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    let mut ne = NodeExecution::start(
        node.key.clone(),
        execution_index,
        run_index,
        Map::new(),
        input_data,
        started_at,
    );

    let action = match registry.get(&node.node_type) {
        Ok(action) => action,
        Err(err) => return fail(ne, synthetic_error(err.code(), err.to_string())),
    };

    let context = assemble_context(
        &node.key,
        execution,
        runtime,
        routed_input,
        execution_index,
        run_index,
        run_index > 0,
    );

    let rendered_params = match renderer.render(&node.params, &context) {
        Ok(params) => params,
        Err(message) => return fail(ne, synthetic_error("template_render_error", message)),
    };
    ne.params_snapshot = rendered_params.clone();

    let validated_params = match action.validate_params(rendered_params) {
        Ok(params) => params,
        Err(err) => return fail(ne, synthetic_error(err.code(), err.to_string())),
    };

    let output_ports = action.specification().output_ports;
    match run_catching_panics(action, validated_params, context).await {
        Ok(outcome) => normalize(&output_ports, ne, outcome),
        Err(message) => fail(ne, synthetic_error("action_exception", message)),
    }
}

/// Invoke `action.execute` on a spawned task so a panic inside the action
/// surfaces as a `JoinError` instead of unwinding through the node
/// executor — any exception from an action is treated as a `Failed`
/// outcome and never allowed to unwind past the node executor.
async fn run_catching_panics(
    action: std::sync::Arc<dyn prana_action::Action>,
    params: Map<String, Value>,
    context: ActionContext,
) -> Result<prana_action::ActionOutcome, String> {
    match tokio::spawn(async move { action.execute(params, context).await }).await {
        Ok(outcome) => Ok(outcome),
        Err(join_err) => Err(panic_message(join_err)),
    }
}

fn panic_message(join_err: tokio::task::JoinError) -> String {
    if let Ok(reason) = join_err.try_into_panic() {
        if let Some(s) = reason.downcast_ref::<&str>() {
            return (*s).to_string();
        }
        if let Some(s) = reason.downcast_ref::<String>() {
            return s.clone();
        }
        "action panicked with a non-string payload".to_string()
    } else {
        "action task was cancelled".to_string()
    }
}

/// Resume a previously suspended `node`. Context assembly is identical
/// except `loopback` is always `false` —
/// resuming is not a loop-back.
pub async fn resume_node(
    node: &Node,
    execution: &WorkflowExecution,
    runtime: &ExecutionRuntime,
    registry: &ActionRegistry,
    renderer: &dyn TemplateRenderer,
    routed_input: IndexMap<String, Value>,
    suspended: &NodeExecution,
    resume_data: Value,
) -> NodeExecutionOutcome {
    let mut ne = suspended.clone();

    let action = match registry.get(&node.node_type) {
        Ok(action) => action,
        Err(err) => return fail(ne, synthetic_error(err.code(), err.to_string())),
    };

    let context = assemble_context(
        &node.key,
        execution,
        runtime,
        routed_input,
        suspended.execution_index,
        suspended.run_index,
        false,
    );

    let rendered_params = match renderer.render(&node.params, &context) {
        Ok(params) => params,
        Err(message) => return fail(ne, synthetic_error("template_render_error", message)),
    };
    ne.params_snapshot = rendered_params.clone();

    let validated_params = match action.validate_params(rendered_params) {
        Ok(params) => params,
        Err(err) => return fail(ne, synthetic_error(err.code(), err.to_string())),
    };

    let output_ports = action.specification().output_ports;
    match run_catching_panics_resume(action, validated_params, context, resume_data).await {
        Ok(outcome) => normalize(&output_ports, ne, outcome),
        Err(message) => fail(ne, synthetic_error("action_exception", message)),
    }
}

/// As [`run_catching_panics`], for the `resume` entry point.
async fn run_catching_panics_resume(
    action: std::sync::Arc<dyn prana_action::Action>,
    params: Map<String, Value>,
    context: ActionContext,
    resume_data: Value,
) -> Result<prana_action::ActionOutcome, String> {
    match tokio::spawn(async move { action.resume(params, context, resume_data).await }).await {
        Ok(outcome) => Ok(outcome),
        Err(join_err) => Err(panic_message(join_err)),
    }
}

fn fail(mut ne: NodeExecution, error: Value) -> NodeExecutionOutcome {
    ne.status = prana_execution::NodeExecutionStatus::Failed;
    ne.error_data = Some(error);
    ne.completed_at = Some(chrono::Utc::now());
    NodeExecutionOutcome::Failed(ne)
}

fn normalize(
    output_ports: &prana_action::OutputPorts,
    mut ne: NodeExecution,
    outcome: prana_action::ActionOutcome,
) -> NodeExecutionOutcome {
    use prana_action::ActionOutcome;

    let now = chrono::Utc::now();
    match outcome {
        ActionOutcome::Completed {
            output_data,
            output_port,
            context_data,
        } => {
            if !output_ports.allows(&output_port) {
                return fail(
                    ne,
                    synthetic_error(
                        "invalid_output_port",
                        format!("action returned undeclared output port {output_port:?}"),
                    ),
                );
            }
            ne.status = prana_execution::NodeExecutionStatus::Completed;
            ne.output_data = Some(output_data);
            ne.output_port = Some(output_port);
            ne.context_data = context_data;
            ne.completed_at = Some(now);
            NodeExecutionOutcome::Completed(ne)
        }
        ActionOutcome::CompletedWithSharedState {
            output_data,
            output_port,
            shared_state_patch,
            context_data,
        } => {
            if !output_ports.allows(&output_port) {
                return fail(
                    ne,
                    synthetic_error(
                        "invalid_output_port",
                        format!("action returned undeclared output port {output_port:?}"),
                    ),
                );
            }
            ne.status = prana_execution::NodeExecutionStatus::Completed;
            ne.output_data = Some(output_data);
            ne.output_port = Some(output_port);
            ne.context_data = context_data;
            ne.completed_at = Some(now);
            NodeExecutionOutcome::CompletedWithSharedState(ne, shared_state_patch)
        }
        ActionOutcome::Suspended { suspension_type, data } => {
            ne.status = prana_execution::NodeExecutionStatus::Suspended;
            ne.suspension_type = Some(suspension_type);
            ne.suspension_data = Some(data);
            ne.completed_at = Some(now);
            NodeExecutionOutcome::Suspended(ne)
        }
        ActionOutcome::Failed { error, output_port } => {
            ne.status = prana_execution::NodeExecutionStatus::Failed;
            ne.error_data = Some(error);
            ne.output_port = output_port.or_else(|| Some(prana_graph::ERROR.to_string()));
            ne.completed_at = Some(now);
            NodeExecutionOutcome::Failed(ne)
        }
    }
}
