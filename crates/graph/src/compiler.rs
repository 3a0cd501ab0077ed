//! Compiles an author-facing [`crate::Workflow`] into an indexed, pruned
//! [`crate::ExecutionGraph`].

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use prana_core::{ActionKind, NodeKey};

use crate::error::CompileError;
use crate::execution_graph::ExecutionGraph;
use crate::resolver::ActionKindResolver;
use crate::workflow::Workflow;

/// Compile `workflow` into an [`ExecutionGraph`].
///
/// `explicit_trigger`, when given, pins the trigger node instead of
/// requiring the workflow to have exactly one. `resolver` answers whether
/// a node's `node_type` is a trigger action.
///
/// Steps:
/// 1. select the trigger node,
/// 2. BFS the connection graph from the trigger to find reachable nodes,
/// 3. prune nodes and connections down to what's reachable,
/// 4. build the O(1) lookup indexes the executor needs.
pub fn compile(
    workflow: &Workflow,
    explicit_trigger: Option<&NodeKey>,
    resolver: &impl ActionKindResolver,
) -> Result<ExecutionGraph, CompileError> {
    let trigger_node_key = select_trigger(workflow, explicit_trigger, resolver)?;
    let reachable = reachable_from(workflow, &trigger_node_key);

    let mut node_map = HashMap::with_capacity(reachable.len());
    for key in &reachable {
        if let Some(node) = workflow.node(key) {
            node_map.insert(key.clone(), node.clone());
        }
    }

    let mut connection_map = HashMap::new();
    let mut reverse_connection_map: HashMap<NodeKey, Vec<_>> = HashMap::new();
    let mut dependency_graph: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();

    for (from_key, by_port) in &workflow.connections {
        if !reachable.contains(from_key) {
            continue;
        }
        for (port, conns) in by_port {
            let mut kept = Vec::new();
            for conn in conns {
                if !reachable.contains(&conn.to_node_key) {
                    continue;
                }
                reverse_connection_map
                    .entry(conn.to_node_key.clone())
                    .or_default()
                    .push(conn.clone());
                let deps = dependency_graph.entry(conn.to_node_key.clone()).or_default();
                if !deps.contains(&conn.from_node_key) {
                    deps.push(conn.from_node_key.clone());
                }
                kept.push(conn.clone());
            }
            if !kept.is_empty() {
                connection_map.insert((from_key.clone(), port.clone()), kept);
            }
        }
    }

    Ok(ExecutionGraph::new(
        workflow.id,
        trigger_node_key,
        node_map,
        connection_map,
        reverse_connection_map,
        dependency_graph,
        workflow.variables.clone(),
    ))
}

fn select_trigger(
    workflow: &Workflow,
    explicit_trigger: Option<&NodeKey>,
    resolver: &impl ActionKindResolver,
) -> Result<NodeKey, CompileError> {
    if let Some(key) = explicit_trigger {
        let node = workflow
            .node(key)
            .ok_or_else(|| CompileError::TriggerNodeNotFound(key.clone()))?;
        return match resolver.kind_of(&node.node_type) {
            Some(ActionKind::Trigger) => Ok(key.clone()),
            _ => Err(CompileError::NodeNotTrigger {
                key: key.clone(),
                node_type: node.node_type.clone(),
            }),
        };
    }

    let triggers: Vec<NodeKey> = workflow
        .nodes
        .values()
        .filter(|node| resolver.kind_of(&node.node_type) == Some(ActionKind::Trigger))
        .map(|node| node.key.clone())
        .collect();

    match triggers.len() {
        0 => Err(CompileError::NoTriggerNodes),
        1 => Ok(triggers.into_iter().next().expect("len checked above")),
        _ => Err(CompileError::MultipleTriggersFound(triggers)),
    }
}

fn reachable_from(workflow: &Workflow, trigger: &NodeKey) -> IndexSet<NodeKey> {
    let mut visited = IndexSet::new();
    let mut queue = VecDeque::new();
    visited.insert(trigger.clone());
    queue.push_back(trigger.clone());

    while let Some(current) = queue.pop_front() {
        let Some(by_port) = workflow.connections.get(&current) else {
            continue;
        };
        for conns in by_port.values() {
            for conn in conns {
                if visited.insert(conn.to_node_key.clone()) {
                    queue.push_back(conn.to_node_key.clone());
                }
            }
        }
    }

    visited
}
