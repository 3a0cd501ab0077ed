//! Action specifications: the static description an action's author
//! attaches to it, used for trigger selection and port validation.

use prana_core::ActionKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PortName;

/// An action's declared output ports.
///
/// `Dynamic` corresponds to the reserved `"*"` port name: the action may
/// emit any port name at run time and the executor does not validate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputPorts {
    /// A closed set of port names the action may route through.
    Fixed(Vec<PortName>),
    /// Any port name is accepted; signalled on the wire as `["*"]`.
    Dynamic,
}

impl OutputPorts {
    /// Returns `true` if `port` is an acceptable output port under this
    /// declaration.
    #[must_use]
    pub fn allows(&self, port: &str) -> bool {
        match self {
            Self::Dynamic => true,
            Self::Fixed(ports) => ports.iter().any(|p| p == port),
        }
    }
}

/// The static description of an action, independent of any particular
/// node instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpecification {
    /// The registry key other nodes reference via `node.node_type`.
    pub name: String,
    /// The broad category used for trigger selection and tooling.
    pub kind: ActionKind,
    /// Expected input port names.
    pub input_ports: Vec<PortName>,
    /// Declared output ports; see [`OutputPorts`].
    pub output_ports: OutputPorts,
    /// Optional JSON Schema describing valid `params`.
    #[serde(default)]
    pub params_schema: Option<Value>,
}

impl ActionSpecification {
    /// Construct a specification with a fixed output port set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ActionKind,
        input_ports: Vec<PortName>,
        output_ports: Vec<PortName>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            input_ports,
            output_ports: OutputPorts::Fixed(output_ports),
            params_schema: None,
        }
    }

    /// Construct a specification whose output ports are dynamic (`"*"`).
    #[must_use]
    pub fn with_dynamic_ports(
        name: impl Into<String>,
        kind: ActionKind,
        input_ports: Vec<PortName>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            input_ports,
            output_ports: OutputPorts::Dynamic,
            params_schema: None,
        }
    }
}
