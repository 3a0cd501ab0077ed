//! Static connection records.

use prana_core::NodeKey;
use serde::{Deserialize, Serialize};

use crate::ports::PortName;

/// A directed edge from `(from_node_key, from_port)` to `(to_node_key, to_port)`.
///
/// Conditions and data-mapping fields are deliberately absent: conditional
/// routing happens inside action implementations via port selection, and
/// data transformation happens via template parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node.
    pub from_node_key: NodeKey,
    /// Source output port.
    pub from_port: PortName,
    /// Destination node.
    pub to_node_key: NodeKey,
    /// Destination input port.
    pub to_port: PortName,
}

impl Connection {
    /// Construct a connection between two `(node, port)` pairs.
    #[must_use]
    pub fn new(
        from_node_key: impl Into<NodeKey>,
        from_port: impl Into<PortName>,
        to_node_key: impl Into<NodeKey>,
        to_port: impl Into<PortName>,
    ) -> Self {
        Self {
            from_node_key: from_node_key.into(),
            from_port: from_port.into(),
            to_node_key: to_node_key.into(),
            to_port: to_port.into(),
        }
    }
}
