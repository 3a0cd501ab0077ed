//! The Prana workflow graph execution engine.
//!
//! Wires together the compiler (`prana-graph`), execution state
//! (`prana-execution`), the action interface (`prana-action`), and the
//! event bus (`prana-eventbus`) behind a single [`Engine`] facade. Hosts
//! that want to drive the main loop themselves can use [`GraphExecutor`]
//! directly instead.

mod config;
mod error;
mod graph_executor;
mod node_executor;
mod template;

pub use config::GraphExecutorConfig;
pub use error::EngineError;
pub use graph_executor::{GraphExecutor, StepResult};
pub use node_executor::{execute_node, resume_node, NodeExecutionOutcome};
pub use template::{SimpleTemplateRenderer, TemplateRenderer};

use std::sync::Arc;

use prana_action::{Action, ActionRegistry};
use prana_core::{ExecutionId, NodeKey, WorkflowId};
use prana_eventbus::{Event, EventBus, Middleware};
use prana_execution::{rebuild_runtime, ExecutionRuntime, WorkflowExecution};
use prana_graph::{compile, ExecutionGraph, Workflow};
use serde_json::{Map, Value};

/// The engine's public entry point: owns an action registry, a template
/// renderer, an event bus, and the executor configuration, and exposes
/// the lifecycle operations a host needs to run workflows end to end.
pub struct Engine {
    config: GraphExecutorConfig,
    registry: ActionRegistry,
    renderer: Box<dyn TemplateRenderer>,
    event_bus: EventBus,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// A new engine with an empty action registry, no middleware, the
    /// built-in [`SimpleTemplateRenderer`], and default executor
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GraphExecutorConfig::default(),
            registry: ActionRegistry::new(),
            renderer: Box::new(SimpleTemplateRenderer),
            event_bus: EventBus::new(),
        }
    }

    /// Override the default [`GraphExecutorConfig`].
    #[must_use]
    pub fn with_config(mut self, config: GraphExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Plug in a richer template renderer than the built-in one.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Register an action under its own specification's name.
    pub fn register_action(&mut self, action: Arc<dyn Action>) -> &mut Self {
        self.registry.register(action);
        self
    }

    /// Look up a registered action by name.
    pub fn get_action(&self, name: &str) -> Result<Arc<dyn Action>, prana_action::ActionError> {
        self.registry.get(name)
    }

    /// Append a middleware stage to the event pipeline.
    pub fn register_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.event_bus.register(middleware);
        self
    }

    /// Emit an event directly; mostly useful for hosts that want to
    /// surface their own lifecycle events (e.g. "execution scheduled")
    /// through the same pipeline.
    pub fn emit(&self, event: &Event) {
        self.event_bus.emit(event);
    }

    /// Compile a [`Workflow`] into an [`ExecutionGraph`].
    pub fn compile(&self, workflow: &Workflow, explicit_trigger: Option<&NodeKey>) -> Result<ExecutionGraph, EngineError> {
        Ok(compile(workflow, explicit_trigger, &self.registry)?)
    }

    /// Start a brand-new execution record for `graph`, with its runtime
    /// index seeded at the trigger node.
    #[must_use]
    pub fn initialize_execution(
        &self,
        graph: &ExecutionGraph,
        execution_id: ExecutionId,
        vars: Map<String, Value>,
        env: Map<String, Value>,
    ) -> (WorkflowExecution, ExecutionRuntime) {
        let trigger_node_type = graph
            .node(graph.trigger_node_key())
            .map(|n| n.node_type.clone())
            .unwrap_or_default();
        let execution = WorkflowExecution::new(execution_id, graph.workflow_id(), trigger_node_type, vars);
        let runtime = rebuild_runtime(&execution, graph, env);
        (execution, runtime)
    }

    /// Rebuild the ephemeral runtime index for an execution loaded from
    /// storage, so it can be driven onward.
    #[must_use]
    pub fn rebuild_runtime(&self, execution: &WorkflowExecution, graph: &ExecutionGraph, env: Map<String, Value>) -> ExecutionRuntime {
        rebuild_runtime(execution, graph, env)
    }

    /// Drive `execution` to completion, suspension, or failure. On a
    /// fresh (`pending`) execution, `input_data` is routed to the
    /// trigger node's `"main"` port first; it is ignored when
    /// re-entering an already-running execution.
    pub async fn execute_workflow(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        input_data: Value,
    ) -> Result<StepResult, EngineError> {
        if execution.status == prana_execution::WorkflowStatus::Pending {
            runtime.route_input(graph.trigger_node_key().clone(), prana_graph::MAIN, input_data, 0);
        }
        self.executor().run(graph, execution, runtime).await
    }

    /// Resume a suspended `execution` with `resume_data` and drive it
    /// onward.
    pub async fn resume_workflow(
        &self,
        graph: &ExecutionGraph,
        execution: &mut WorkflowExecution,
        runtime: &mut ExecutionRuntime,
        resume_data: Value,
    ) -> Result<StepResult, EngineError> {
        self.executor().resume(graph, execution, runtime, resume_data).await
    }

    /// Also expose the bound [`GraphExecutor`] for hosts that want direct
    /// control of the main loop (e.g. stepping one node at a time).
    #[must_use]
    pub fn executor(&self) -> GraphExecutor<'_> {
        GraphExecutor::new(self.config, &self.registry, self.renderer.as_ref(), &self.event_bus)
    }

    /// Target identifier of the workflow id a compiled graph was produced
    /// from; re-exported for hosts that only have a `WorkflowId` on hand
    /// and need to cross-check it against a cached graph.
    #[must_use]
    pub fn workflow_id_of(graph: &ExecutionGraph) -> WorkflowId {
        graph.workflow_id()
    }
}
