//! The static, author-facing workflow definition.

use std::collections::HashMap;

use indexmap::IndexMap;
use prana_core::{NodeKey, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::ports::PortName;

/// `node_key → port_name → ordered list of outgoing connections`.
pub type ConnectionTable = HashMap<NodeKey, HashMap<PortName, Vec<Connection>>>;

/// An immutable, author-facing workflow: nodes, their connections, and
/// workflow-scoped variables. Compiled into an [`crate::ExecutionGraph`] by
/// [`crate::compile`] before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Stable identifier for this workflow definition.
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Semantic version of this workflow definition.
    pub version: semver::Version,
    /// Nodes, in authoring order. Order has no execution meaning beyond
    /// tie-breaking during compilation reachability traversal.
    pub nodes: IndexMap<NodeKey, crate::node::Node>,
    /// Outgoing connections, indexed by source node and port.
    #[serde(default)]
    pub connections: ConnectionTable,
    /// Workflow-scoped variables, available to every node as `$vars`.
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Workflow {
    /// Construct an empty workflow with the given identity.
    #[must_use]
    pub fn new(id: WorkflowId, name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            id,
            name: name.into(),
            version,
            nodes: IndexMap::new(),
            connections: ConnectionTable::new(),
            variables: Map::new(),
        }
    }

    /// Add a node to the workflow.
    pub fn add_node(&mut self, node: crate::node::Node) -> &mut Self {
        self.nodes.insert(node.key.clone(), node);
        self
    }

    /// Add a connection. Preserves insertion order within the destination
    /// port's connection list.
    pub fn add_connection(&mut self, connection: Connection) -> &mut Self {
        self.connections
            .entry(connection.from_node_key.clone())
            .or_default()
            .entry(connection.from_port.clone())
            .or_default()
            .push(connection);
        self
    }

    /// All connections leaving `(node_key, port)`, in insertion order.
    #[must_use]
    pub fn connections_from(&self, node_key: &NodeKey, port: &str) -> &[Connection] {
        self.connections
            .get(node_key)
            .and_then(|by_port| by_port.get(port))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a node by key.
    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&crate::node::Node> {
        self.nodes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn sample() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::v4(), "test", semver::Version::new(1, 0, 0));
        wf.add_node(Node::new(NodeKey::new("a"), "trigger.manual"));
        wf.add_node(Node::new(NodeKey::new("b"), "test.transform"));
        wf.add_connection(Connection::new(
            NodeKey::new("a"),
            "main",
            NodeKey::new("b"),
            "main",
        ));
        wf
    }

    #[test]
    fn connections_from_returns_inserted_edges() {
        let wf = sample();
        let conns = wf.connections_from(&NodeKey::new("a"), "main");
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].to_node_key, NodeKey::new("b"));
    }

    #[test]
    fn connections_from_missing_port_is_empty() {
        let wf = sample();
        assert!(wf.connections_from(&NodeKey::new("a"), "error").is_empty());
    }

    #[test]
    fn node_lookup() {
        let wf = sample();
        assert!(wf.node(&NodeKey::new("a")).is_some());
        assert!(wf.node(&NodeKey::new("missing")).is_none());
    }

    #[test]
    fn nodes_preserve_insertion_order() {
        let wf = sample();
        let keys: Vec<_> = wf.nodes.keys().cloned().collect();
        assert_eq!(keys, vec![NodeKey::new("a"), NodeKey::new("b")]);
    }
}
