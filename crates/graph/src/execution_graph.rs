//! The compiled, indexed form of a workflow used at run time.

use std::collections::HashMap;

use prana_core::{NodeKey, WorkflowId};
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::node::Node;
use crate::ports::PortName;

/// The compiled, immutable form of a [`crate::Workflow`] produced by
/// [`crate::compile`]. Safe to cache by `(workflow_id, version)`.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    workflow_id: WorkflowId,
    trigger_node_key: NodeKey,
    node_map: HashMap<NodeKey, Node>,
    connection_map: HashMap<(NodeKey, PortName), Vec<Connection>>,
    reverse_connection_map: HashMap<NodeKey, Vec<Connection>>,
    dependency_graph: HashMap<NodeKey, Vec<NodeKey>>,
    variables: Map<String, Value>,
}

impl ExecutionGraph {
    pub(crate) fn new(
        workflow_id: WorkflowId,
        trigger_node_key: NodeKey,
        node_map: HashMap<NodeKey, Node>,
        connection_map: HashMap<(NodeKey, PortName), Vec<Connection>>,
        reverse_connection_map: HashMap<NodeKey, Vec<Connection>>,
        dependency_graph: HashMap<NodeKey, Vec<NodeKey>>,
        variables: Map<String, Value>,
    ) -> Self {
        Self {
            workflow_id,
            trigger_node_key,
            node_map,
            connection_map,
            reverse_connection_map,
            dependency_graph,
            variables,
        }
    }

    /// The workflow this graph was compiled from.
    #[must_use]
    pub fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    /// The selected trigger node.
    #[must_use]
    pub fn trigger_node_key(&self) -> &NodeKey {
        &self.trigger_node_key
    }

    /// Look up a node by key. `None` means the key does not exist or was
    /// pruned as unreachable.
    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.node_map.get(key)
    }

    /// Every reachable node, in no particular order.
    #[must_use]
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_map.values()
    }

    /// Forward connections leaving `(node_key, from_port)`, O(1).
    #[must_use]
    pub fn connections_from(&self, node_key: &NodeKey, from_port: &str) -> &[Connection] {
        self.connection_map
            .get(&(node_key.clone(), from_port.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Incoming connections to `node_key`, O(1).
    #[must_use]
    pub fn incoming(&self, node_key: &NodeKey) -> &[Connection] {
        self.reverse_connection_map
            .get(node_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unique predecessor node keys of `node_key`.
    #[must_use]
    pub fn dependencies_of(&self, node_key: &NodeKey) -> &[NodeKey] {
        self.dependency_graph
            .get(node_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Workflow-scoped variables, available to every node as `$vars`.
    #[must_use]
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Number of reachable nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_map.len()
    }
}
