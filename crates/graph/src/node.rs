//! Static node records.

use prana_core::NodeKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the engine does when a node's action returns `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnErrorPolicy {
    /// Fail the whole workflow immediately. The default.
    FailWorkflow,
    /// Route the failure through the node's `error` output port and keep
    /// going; if no connection exists from that port, the branch ends
    /// without failing the workflow.
    Continue,
}

impl Default for OnErrorPolicy {
    fn default() -> Self {
        Self::FailWorkflow
    }
}

/// Per-node retry and error-handling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Whether a failed execution of this node should be retried.
    #[serde(default)]
    pub retry_on_failed: bool,
    /// Maximum retry attempts when `retry_on_failed` is set.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay between retries, in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// What to do when this node's action fails.
    #[serde(default)]
    pub on_error: OnErrorPolicy,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            retry_on_failed: false,
            max_retries: 0,
            retry_delay_ms: 0,
            on_error: OnErrorPolicy::FailWorkflow,
        }
    }
}

/// A unit of work in a workflow, bound to an action type.
///
/// Nodes do not store port lists — ports are defined by the action
/// specification the node's `node_type` resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique key within the owning workflow; used for all cross-references.
    pub key: NodeKey,
    /// Action identifier string, e.g. `"logic.if_condition"`.
    pub node_type: String,
    /// Parameter templates — values may be template strings
    /// (`"{{ $input.x }}"`) or literal data.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Optional retry/error-handling configuration.
    #[serde(default)]
    pub settings: Option<NodeSettings>,
}

impl Node {
    /// Construct a node with default settings and empty params.
    #[must_use]
    pub fn new(key: impl Into<NodeKey>, node_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            node_type: node_type.into(),
            params: Map::new(),
            settings: None,
        }
    }

    /// Builder-style setter for `params`.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Builder-style setter for `settings`.
    #[must_use]
    pub fn with_settings(mut self, settings: NodeSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// The effective `on_error` policy, defaulting to `FailWorkflow`.
    #[must_use]
    pub fn on_error(&self) -> OnErrorPolicy {
        self.settings
            .as_ref()
            .map(|s| s.on_error)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_on_error_is_fail_workflow() {
        let node = Node::new(NodeKey::new("a"), "logic.if_condition");
        assert_eq!(node.on_error(), OnErrorPolicy::FailWorkflow);
    }

    #[test]
    fn settings_on_error_continue() {
        let node = Node::new(NodeKey::new("risky"), "http.request").with_settings(NodeSettings {
            on_error: OnErrorPolicy::Continue,
            ..Default::default()
        });
        assert_eq!(node.on_error(), OnErrorPolicy::Continue);
    }

    #[test]
    fn serde_roundtrip() {
        let node = Node::new(NodeKey::new("a"), "trigger.manual");
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn settings_default_values() {
        let settings = NodeSettings::default();
        assert!(!settings.retry_on_failed);
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.on_error, OnErrorPolicy::FailWorkflow);
    }
}
