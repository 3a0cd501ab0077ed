//! Atomic transitions over a [`WorkflowExecution`] and its
//! [`ExecutionRuntime`].

use prana_core::NodeKey;
use prana_graph::{ExecutionGraph, OnErrorPolicy, ERROR};
use serde_json::{Map, Value};

use crate::error::ExecutionError;
use crate::node_execution::NodeExecution;
use crate::status::{NodeExecutionStatus, WorkflowStatus};
use crate::transition::validate_workflow_transition;
use crate::workflow_execution::{ExecutionRuntime, WorkflowExecution};

/// Route `data` leaving `(from_node_key, from_port)` to every connected
/// successor, bumping `active_nodes` and `node_depth`.
fn route_output(
    runtime: &mut ExecutionRuntime,
    graph: &ExecutionGraph,
    from_node_key: &NodeKey,
    from_port: &str,
    data: &Value,
    execution_index: u64,
) {
    let from_depth = runtime.node_depth.get(from_node_key).copied().unwrap_or(0);
    let connections = graph.connections_from(from_node_key, from_port).to_vec();
    for conn in connections {
        runtime.route_input(
            conn.to_node_key.clone(),
            conn.to_port.clone(),
            data.clone(),
            execution_index,
        );
        runtime.active_nodes.insert(conn.to_node_key.clone());
        let candidate_depth = from_depth + 1;
        let entry = runtime.node_depth.entry(conn.to_node_key.clone()).or_insert(0);
        *entry = (*entry).max(candidate_depth);
    }
}

/// Apply a successful node completion: append to history, update `nodes`
/// / `node_contexts`, drop the node from `active_nodes`, and route its
/// output to successors.
pub fn complete_node(
    exec: &mut WorkflowExecution,
    runtime: &mut ExecutionRuntime,
    graph: &ExecutionGraph,
    node_execution: NodeExecution,
) -> Result<(), ExecutionError> {
    let node_key = node_execution.node_key.clone();
    let execution_index = node_execution.execution_index;
    let output_data = node_execution.output_data.clone().unwrap_or(Value::Null);
    let output_port = node_execution
        .output_port
        .clone()
        .unwrap_or_else(|| prana_graph::MAIN.to_string());

    if let Some(context) = &node_execution.context_data {
        runtime.node_contexts.insert(node_key.clone(), context.clone());
    }
    runtime.nodes.insert(node_key.clone(), output_data.clone());
    runtime.active_nodes.shift_remove(&node_key);
    runtime.executed_nodes.push(node_key.clone());

    exec.node_executions
        .entry(node_key.clone())
        .or_default()
        .push(node_execution);

    route_output(runtime, graph, &node_key, &output_port, &output_data, execution_index);
    Ok(())
}

/// Apply a failed node: append to history, drop from `active_nodes`, and
/// either route through the `error` port (policy `continue`) or fail the
/// whole workflow.
pub fn fail_node(
    exec: &mut WorkflowExecution,
    runtime: &mut ExecutionRuntime,
    graph: &ExecutionGraph,
    node_execution: NodeExecution,
    on_error: OnErrorPolicy,
) -> Result<(), ExecutionError> {
    let node_key = node_execution.node_key.clone();
    let execution_index = node_execution.execution_index;
    let error_data = node_execution.error_data.clone().unwrap_or(Value::Null);

    runtime.active_nodes.shift_remove(&node_key);
    runtime.executed_nodes.push(node_key.clone());

    exec.node_executions
        .entry(node_key.clone())
        .or_default()
        .push(node_execution);

    match on_error {
        OnErrorPolicy::Continue => {
            route_output(runtime, graph, &node_key, ERROR, &error_data, execution_index);
        }
        OnErrorPolicy::FailWorkflow => {
            exec.status = WorkflowStatus::Failed;
        }
    }
    Ok(())
}

/// Mark the workflow suspended on behalf of `node_execution`, which must
/// already have `status == suspended` and have been appended to history
/// by the caller (the executor appends it as part of normalizing the
/// action outcome).
pub fn suspend(
    exec: &mut WorkflowExecution,
    runtime: &mut ExecutionRuntime,
    node_execution: NodeExecution,
    suspended_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), ExecutionError> {
    validate_workflow_transition(exec.status, WorkflowStatus::Suspended)?;

    let node_key = node_execution.node_key.clone();
    let suspension_type = node_execution.suspension_type;
    let suspension_data = node_execution.suspension_data.clone();

    runtime.active_nodes.shift_remove(&node_key);
    exec.node_executions
        .entry(node_key.clone())
        .or_default()
        .push(node_execution);

    exec.status = WorkflowStatus::Suspended;
    exec.suspended_node_key = Some(node_key);
    exec.suspension_type = suspension_type;
    exec.suspension_data = suspension_data;
    exec.suspended_at = Some(suspended_at);
    Ok(())
}

/// Clear workflow-level suspension bookkeeping and return to `running`.
/// The suspended `NodeExecution` stays in history, unchanged, until
/// [`complete_suspended_node`] or [`fail_node`] resolves it.
pub fn resume_suspension(exec: &mut WorkflowExecution) -> Result<(), ExecutionError> {
    validate_workflow_transition(exec.status, WorkflowStatus::Running)?;
    exec.status = WorkflowStatus::Running;
    exec.suspended_node_key = None;
    exec.suspension_type = None;
    exec.suspension_data = None;
    exec.suspended_at = None;
    Ok(())
}

/// Resolve a previously suspended node: mutate its existing history entry
/// in place to `completed` (the one documented exception to the
/// append-only invariant) and route its output as [`complete_node`] would.
pub fn complete_suspended_node(
    exec: &mut WorkflowExecution,
    runtime: &mut ExecutionRuntime,
    graph: &ExecutionGraph,
    node_key: &NodeKey,
    resolved: NodeExecution,
) -> Result<(), ExecutionError> {
    let runs = exec
        .node_executions
        .get_mut(node_key)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    let slot = runs
        .iter_mut()
        .rev()
        .find(|ne| ne.status == NodeExecutionStatus::Suspended)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    *slot = resolved.clone();

    let output_data = resolved.output_data.clone().unwrap_or(Value::Null);
    let output_port = resolved
        .output_port
        .clone()
        .unwrap_or_else(|| prana_graph::MAIN.to_string());

    if let Some(context) = &resolved.context_data {
        runtime.node_contexts.insert(node_key.clone(), context.clone());
    }
    runtime.nodes.insert(node_key.clone(), output_data.clone());
    runtime.executed_nodes.push(node_key.clone());

    route_output(
        runtime,
        graph,
        node_key,
        &output_port,
        &output_data,
        resolved.execution_index,
    );
    Ok(())
}

/// Resolve a previously suspended node that failed on resume: mutate its
/// existing history entry in place to `failed` (mirrors
/// [`complete_suspended_node`]) and apply the node's `on_error` policy —
/// route through `error` on `continue`, or fail the workflow.
pub fn fail_suspended_node(
    exec: &mut WorkflowExecution,
    runtime: &mut ExecutionRuntime,
    graph: &ExecutionGraph,
    node_key: &NodeKey,
    resolved: NodeExecution,
    on_error: OnErrorPolicy,
) -> Result<(), ExecutionError> {
    let runs = exec
        .node_executions
        .get_mut(node_key)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    let slot = runs
        .iter_mut()
        .rev()
        .find(|ne| ne.status == NodeExecutionStatus::Suspended)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    *slot = resolved.clone();

    let execution_index = resolved.execution_index;
    let error_data = resolved.error_data.clone().unwrap_or(Value::Null);

    match on_error {
        OnErrorPolicy::Continue => {
            route_output(runtime, graph, node_key, ERROR, &error_data, execution_index);
        }
        OnErrorPolicy::FailWorkflow => {
            exec.status = WorkflowStatus::Failed;
        }
    }
    Ok(())
}

/// Resolve a previously suspended node that suspended again on resume
/// (a chained/nested suspension): mutate its existing history entry in
/// place with the new suspension fields and put the workflow back into
/// `suspended`, pointed at the same node.
pub fn resuspend_node(
    exec: &mut WorkflowExecution,
    node_key: &NodeKey,
    resolved: NodeExecution,
    suspended_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), ExecutionError> {
    let runs = exec
        .node_executions
        .get_mut(node_key)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    let slot = runs
        .iter_mut()
        .rev()
        .find(|ne| ne.status == NodeExecutionStatus::Suspended)
        .ok_or_else(|| ExecutionError::NoSuspendedExecution(node_key.clone()))?;
    let suspension_type = resolved.suspension_type;
    let suspension_data = resolved.suspension_data.clone();
    *slot = resolved;

    exec.status = WorkflowStatus::Suspended;
    exec.suspended_node_key = Some(node_key.clone());
    exec.suspension_type = suspension_type;
    exec.suspension_data = suspension_data;
    exec.suspended_at = Some(suspended_at);
    Ok(())
}

/// Reconstruct [`ExecutionRuntime`] from `exec`'s persistent history.
/// With no history yet, the trigger node is seeded into `active_nodes` at
/// depth 0 (workflow start); otherwise every completed or failed run is
/// replayed in `execution_index` order to recompute `active_nodes` and
/// `node_depth`.
#[must_use]
pub fn rebuild_runtime(
    exec: &WorkflowExecution,
    graph: &ExecutionGraph,
    env: Map<String, Value>,
) -> ExecutionRuntime {
    let mut runtime = ExecutionRuntime::fresh(env);

    let mut runs: Vec<&NodeExecution> = exec.node_executions.values().flatten().collect();
    runs.sort_by_key(|ne| ne.execution_index);

    if runs.is_empty() {
        runtime.active_nodes.insert(graph.trigger_node_key().clone());
        runtime.node_depth.insert(graph.trigger_node_key().clone(), 0);
        return runtime;
    }

    for ne in runs {
        match ne.status {
            NodeExecutionStatus::Completed => {
                let output_data = ne.output_data.clone().unwrap_or(Value::Null);
                let output_port = ne
                    .output_port
                    .clone()
                    .unwrap_or_else(|| prana_graph::MAIN.to_string());
                if let Some(context) = &ne.context_data {
                    runtime.node_contexts.insert(ne.node_key.clone(), context.clone());
                }
                runtime.nodes.insert(ne.node_key.clone(), output_data.clone());
                runtime.active_nodes.shift_remove(&ne.node_key);
                runtime.executed_nodes.push(ne.node_key.clone());
                route_output(
                    &mut runtime,
                    graph,
                    &ne.node_key,
                    &output_port,
                    &output_data,
                    ne.execution_index,
                );
            }
            NodeExecutionStatus::Failed => {
                runtime.active_nodes.shift_remove(&ne.node_key);
                runtime.executed_nodes.push(ne.node_key.clone());
                if let Some(port) = &ne.output_port {
                    let error_data = ne.error_data.clone().unwrap_or(Value::Null);
                    route_output(&mut runtime, graph, &ne.node_key, port, &error_data, ne.execution_index);
                }
            }
            NodeExecutionStatus::Suspended => {
                runtime.active_nodes.shift_remove(&ne.node_key);
                runtime.executed_nodes.push(ne.node_key.clone());
            }
            NodeExecutionStatus::Running => {}
        }
    }

    runtime
}
