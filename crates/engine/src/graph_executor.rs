//! The graph executor: the single-node-at-a-time main loop that
//! drives a [`WorkflowExecution`] to completion, suspension, or failure.

use prana_action::ActionRegistry;
use prana_core::NodeKey;
use prana_eventbus::{Event, EventBus};
use prana_execution::{
    complete_node, complete_suspended_node, fail_node, fail_suspended_node, resume_suspension, resuspend_node,
    suspend, ExecutionRuntime, NodeExecution, NodeExecutionStatus, RetrySuspension, SuspensionType,
    WorkflowExecution, WorkflowStatus,
};
use prana_graph::{ExecutionGraph, NodeSettings};
use serde_json::Value;

use crate::config::GraphExecutorConfig;
use crate::error::EngineError;
use crate::node_executor::{execute_node, resume_node, NodeExecutionOutcome};
use crate::template::TemplateRenderer;

/// How a call into the executor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Every reachable node finished; the workflow reached `completed`.
    Completed,
    /// A node suspended; the workflow reached `suspended`.
    Suspended,
    /// A node failed with no `continue` route; the workflow reached `failed`.
    Failed,
}

/// Drives one [`WorkflowExecution`]/[`ExecutionRuntime`] pair through the
/// main loop.
pub struct GraphExecutor<'a> {
    pub(crate) config: GraphExecutorConfig,
    pub(crate) registry: &'a ActionRegistry,
    pub(crate) renderer: &'a dyn TemplateRenderer,
    pub(crate) event_bus: &'a EventBus,
}

impl<'a> GraphExecutor<'a> {
    /// Construct an executor bound to a particular action registry,
    /// template renderer, and event bus for the duration of a run.
    #[must_use]
    pub fn new(
        config: GraphExecutorConfig,
        registry: &'a ActionRegistry,
        renderer: &'a dyn TemplateRenderer,
        event_bus: &'a EventBus,
    ) -> Self {
        Self {
            config,
            registry,
            renderer,
            event_bus,
        }
    }

    /// Run the main loop until the workflow completes, suspends, or
    /// fails, or the iteration cap is hit.
    pub async fn run(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
    ) -> Result<StepResult, EngineError> {
        if execution.status == WorkflowStatus::Pending {
            execution.status = WorkflowStatus::Running;
            self.event_bus.emit(&Event::ExecutionStarted {
                execution_id: execution.id,
            });
        }

        self.drive(graph, execution, runtime).await
    }

    /// Resume a suspended execution at its suspended node and drive the
    /// main loop onward from there. `resume_data` is the
    /// host-supplied payload passed to the action's `resume`.
    pub async fn resume(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        resume_data: Value,
    ) -> Result<StepResult, EngineError> {
        if execution.status != WorkflowStatus::Suspended {
            return Err(EngineError::InvalidSuspendedExecution(format!(
                "execution {} is not suspended",
                execution.id
            )));
        }
        let node_key = execution.suspended_node_key.clone().ok_or_else(|| {
            EngineError::InvalidSuspendedExecution("suspended execution has no suspended_node_key".to_string())
        })?;
        let node = graph.node(&node_key).ok_or_else(|| {
            EngineError::InvalidSuspendedExecution(format!("suspended node {node_key:?} missing from compiled graph"))
        })?;
        let suspended = execution
            .runs_of(&node_key)
            .iter()
            .rev()
            .find(|ne| ne.status == NodeExecutionStatus::Suspended)
            .cloned()
            .ok_or_else(|| {
                EngineError::InvalidSuspendedExecution(format!("no suspended run recorded for {node_key:?}"))
            })?;

        resume_suspension(execution)?;
        self.event_bus.emit(&Event::ExecutionResumed {
            execution_id: execution.id,
        });

        let routed_input = runtime.take_routed_input(&node_key);

        if suspended.suspension_type == Some(SuspensionType::Retry) {
            let previous_attempt = suspended
                .suspension_data
                .as_ref()
                .and_then(|d| d.get("attempt"))
                .and_then(Value::as_u64)
                .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX));
            let outcome = execute_node(
                node,
                execution,
                runtime,
                self.registry,
                self.renderer,
                routed_input,
                suspended.execution_index,
                suspended.run_index,
            )
            .await;
            return match self.apply_retry_outcome(graph, execution, runtime, &node_key, previous_attempt, outcome)? {
                Some(result) => Ok(result),
                None => self.drive(graph, execution, runtime).await,
            };
        }

        let outcome = resume_node(
            node,
            execution,
            runtime,
            self.registry,
            self.renderer,
            routed_input,
            &suspended,
            resume_data,
        )
        .await;

        match self.apply_resumed_outcome(graph, execution, runtime, &node_key, outcome)? {
            Some(result) => Ok(result),
            None => self.drive(graph, execution, runtime).await,
        }
    }

    async fn drive(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
    ) -> Result<StepResult, EngineError> {
        loop {
            if runtime.iteration_count >= self.config.max_iterations {
                return Err(EngineError::InfiniteLoopProtection(runtime.iteration_count));
            }
            runtime.iteration_count += 1;

            if runtime.active_nodes.is_empty() {
                execution.status = WorkflowStatus::Completed;
                self.event_bus.emit(&Event::ExecutionCompleted {
                    execution_id: execution.id,
                });
                return Ok(StepResult::Completed);
            }

            let selected = select_by_branch_following(runtime)
                .ok_or_else(|| EngineError::NoReadyNodes(runtime.active_nodes.len()))?;

            let node = graph
                .node(&selected)
                .unwrap_or_else(|| panic!("active node {selected:?} missing from compiled graph"));

            let routed_input = runtime.take_routed_input(&selected);
            let execution_index = execution.next_execution_index();
            let run_index = execution.next_run_index(&selected);

            self.event_bus.emit(&Event::NodeStarting {
                execution_id: execution.id,
                node_key: selected.clone(),
                run_index,
            });

            let outcome = execute_node(
                node,
                execution,
                runtime,
                self.registry,
                self.renderer,
                routed_input,
                execution_index,
                run_index,
            )
            .await;

            match self.apply_outcome(graph, execution, runtime, &selected, outcome)? {
                Some(result) => return Ok(result),
                None => continue,
            }
        }
    }

    pub(crate) fn apply_outcome(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        node_key: &NodeKey,
        outcome: NodeExecutionOutcome,
    ) -> Result<Option<StepResult>, EngineError> {
        match outcome {
            NodeExecutionOutcome::Completed(ne) => {
                let output_port = ne.output_port.clone().unwrap_or_default();
                self.event_bus.emit(&Event::NodeCompleted {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    output_port,
                });
                complete_node(execution, runtime, graph, ne)?;
                Ok(None)
            }
            NodeExecutionOutcome::CompletedWithSharedState(ne, patch) => {
                let output_port = ne.output_port.clone().unwrap_or_default();
                self.event_bus.emit(&Event::NodeCompleted {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    output_port,
                });
                complete_node(execution, runtime, graph, ne)?;
                execution.vars.extend(patch);
                Ok(None)
            }
            NodeExecutionOutcome::Suspended(ne) => {
                self.event_bus.emit(&Event::NodeSuspended {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                });
                suspend(execution, runtime, ne, chrono::Utc::now())?;
                self.event_bus.emit(&Event::ExecutionSuspended {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                });
                Ok(Some(StepResult::Suspended))
            }
            NodeExecutionOutcome::Failed(ne) => {
                if let Some(settings) = graph.node(node_key).and_then(|n| n.settings.as_ref()) {
                    if settings.retry_on_failed && settings.max_retries > 0 {
                        return self.suspend_for_retry(execution, runtime, node_key, ne, settings, 1);
                    }
                }
                let error = ne.error_data.clone().unwrap_or(Value::Null);
                let policy = graph
                    .node(node_key)
                    .map(prana_graph::Node::on_error)
                    .unwrap_or_default();
                self.event_bus.emit(&Event::NodeFailed {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    error: error.clone(),
                });
                fail_node(execution, runtime, graph, ne, policy)?;
                if execution.status == WorkflowStatus::Failed {
                    self.event_bus.emit(&Event::ExecutionFailed {
                        execution_id: execution.id,
                        error,
                    });
                    Ok(Some(StepResult::Failed))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Convert a fresh `Failed` outcome into a `retry` suspension instead
    /// of applying the node's `on_error` policy immediately. The host
    /// schedules resume after `retry_delay_ms`; on resume the engine
    /// re-executes the node from scratch rather than calling its
    /// `resume` (a retry redoes the attempt, it does not continue one).
    fn suspend_for_retry(
        &self,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        node_key: &NodeKey,
        mut ne: NodeExecution,
        settings: &NodeSettings,
        attempt: u32,
    ) -> Result<Option<StepResult>, EngineError> {
        let now = chrono::Utc::now();
        let resume_at = now + chrono::Duration::milliseconds(i64::try_from(settings.retry_delay_ms).unwrap_or(i64::MAX));
        ne.status = NodeExecutionStatus::Suspended;
        ne.suspension_type = Some(SuspensionType::Retry);
        ne.suspension_data = Some(
            serde_json::to_value(RetrySuspension {
                attempt,
                delay_ms: settings.retry_delay_ms,
                resume_at,
            })
            .unwrap_or(Value::Null),
        );
        ne.completed_at = Some(now);

        self.event_bus.emit(&Event::NodeSuspended {
            execution_id: execution.id,
            node_key: node_key.clone(),
        });
        suspend(execution, runtime, ne, now)?;
        self.event_bus.emit(&Event::ExecutionSuspended {
            execution_id: execution.id,
            node_key: node_key.clone(),
        });
        Ok(Some(StepResult::Suspended))
    }

    /// As [`Self::suspend_for_retry`], for a retry attempt made from
    /// within [`Self::resume`] (the chained-suspension case, reusing the
    /// existing suspended history slot instead of appending a new one).
    fn resuspend_for_retry(
        &self,
        execution: &mut WorkflowExecution,
        node_key: &NodeKey,
        mut ne: NodeExecution,
        settings: &NodeSettings,
        attempt: u32,
    ) -> Result<Option<StepResult>, EngineError> {
        let now = chrono::Utc::now();
        let resume_at = now + chrono::Duration::milliseconds(i64::try_from(settings.retry_delay_ms).unwrap_or(i64::MAX));
        ne.status = NodeExecutionStatus::Suspended;
        ne.suspension_type = Some(SuspensionType::Retry);
        ne.suspension_data = Some(
            serde_json::to_value(RetrySuspension {
                attempt,
                delay_ms: settings.retry_delay_ms,
                resume_at,
            })
            .unwrap_or(Value::Null),
        );
        ne.completed_at = Some(now);

        self.event_bus.emit(&Event::NodeSuspended {
            execution_id: execution.id,
            node_key: node_key.clone(),
        });
        resuspend_node(execution, node_key, ne, now)?;
        self.event_bus.emit(&Event::ExecutionSuspended {
            execution_id: execution.id,
            node_key: node_key.clone(),
        });
        Ok(Some(StepResult::Suspended))
    }

    /// Handle the outcome of re-executing a node that was suspended for a
    /// `retry`: success or a non-retry suspension resolve the history
    /// slot as usual; a further failure either chains
    /// into another retry suspension or, once `max_retries` is exhausted,
    /// applies the node's `on_error` policy.
    fn apply_retry_outcome(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        node_key: &NodeKey,
        previous_attempt: u32,
        outcome: NodeExecutionOutcome,
    ) -> Result<Option<StepResult>, EngineError> {
        match outcome {
            NodeExecutionOutcome::Failed(ne) => {
                if let Some(settings) = graph.node(node_key).and_then(|n| n.settings.as_ref()) {
                    if settings.retry_on_failed && previous_attempt < settings.max_retries {
                        return self.resuspend_for_retry(execution, node_key, ne, settings, previous_attempt + 1);
                    }
                }
                let error = ne.error_data.clone().unwrap_or(Value::Null);
                let policy = graph
                    .node(node_key)
                    .map(prana_graph::Node::on_error)
                    .unwrap_or_default();
                self.event_bus.emit(&Event::NodeFailed {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    error: error.clone(),
                });
                fail_suspended_node(execution, runtime, graph, node_key, ne, policy)?;
                if execution.status == WorkflowStatus::Failed {
                    self.event_bus.emit(&Event::ExecutionFailed {
                        execution_id: execution.id,
                        error,
                    });
                    Ok(Some(StepResult::Failed))
                } else {
                    Ok(None)
                }
            }
            other => self.apply_resumed_outcome(graph, execution, runtime, node_key, other),
        }
    }

    fn apply_resumed_outcome(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        node_key: &NodeKey,
        outcome: NodeExecutionOutcome,
    ) -> Result<Option<StepResult>, EngineError> {
        match outcome {
            NodeExecutionOutcome::Completed(ne) => {
                let output_port = ne.output_port.clone().unwrap_or_default();
                self.event_bus.emit(&Event::NodeCompleted {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    output_port,
                });
                complete_suspended_node(execution, runtime, graph, node_key, ne)?;
                Ok(None)
            }
            NodeExecutionOutcome::CompletedWithSharedState(ne, patch) => {
                let output_port = ne.output_port.clone().unwrap_or_default();
                self.event_bus.emit(&Event::NodeCompleted {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    output_port,
                });
                complete_suspended_node(execution, runtime, graph, node_key, ne)?;
                execution.vars.extend(patch);
                Ok(None)
            }
            NodeExecutionOutcome::Suspended(ne) => {
                self.event_bus.emit(&Event::NodeSuspended {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                });
                resuspend_node(execution, node_key, ne, chrono::Utc::now())?;
                self.event_bus.emit(&Event::ExecutionSuspended {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                });
                Ok(Some(StepResult::Suspended))
            }
            NodeExecutionOutcome::Failed(ne) => {
                let error = ne.error_data.clone().unwrap_or(Value::Null);
                let policy = graph
                    .node(node_key)
                    .map(prana_graph::Node::on_error)
                    .unwrap_or_default();
                self.event_bus.emit(&Event::NodeFailed {
                    execution_id: execution.id,
                    node_key: node_key.clone(),
                    error: error.clone(),
                });
                fail_suspended_node(execution, runtime, graph, node_key, ne, policy)?;
                if execution.status == WorkflowStatus::Failed {
                    self.event_bus.emit(&Event::ExecutionFailed {
                        execution_id: execution.id,
                        error,
                    });
                    Ok(Some(StepResult::Failed))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Pick the ready node with the greatest `node_depth`, ties broken by
/// insertion order into `active_nodes`.
fn select_by_branch_following(runtime: &ExecutionRuntime) -> Option<NodeKey> {
    let mut best: Option<(&NodeKey, u64)> = None;
    for key in &runtime.active_nodes {
        let depth = runtime.node_depth.get(key).copied().unwrap_or(0);
        match best {
            Some((_, best_depth)) if depth <= best_depth => {}
            _ => best = Some((key, depth)),
        }
    }
    best.map(|(key, _)| key.clone())
}
