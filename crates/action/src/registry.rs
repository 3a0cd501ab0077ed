//! The process-wide `action_name → action` mapping.

use std::collections::HashMap;
use std::sync::Arc;

use prana_core::ActionKind;
use prana_graph::ActionKindResolver;

use crate::action::Action;
use crate::error::ActionError;

/// A registry of actions, populated once at host startup and treated as
/// immutable during execution.
///
/// Implements [`ActionKindResolver`] so `prana-graph`'s compiler can
/// answer "is this node a trigger?" without depending on this crate.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under its own specification's `name`.
    pub fn register(&mut self, action: Arc<dyn Action>) -> &mut Self {
        let name = action.specification().name.clone();
        self.actions.insert(name, action);
        self
    }

    /// Look up an action by name. O(1); misses map to
    /// `ActionError::ActionNotFound`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Action>, ActionError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| ActionError::ActionNotFound(name.to_string()))
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }
}

impl ActionKindResolver for ActionRegistry {
    fn kind_of(&self, node_type: &str) -> Option<ActionKind> {
        self.actions.get(node_type).map(|a| a.specification().kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActionContext;
    use crate::metadata::ActionSpecification;
    use crate::outcome::ActionOutcome;
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    struct Noop;

    #[async_trait]
    impl Action for Noop {
        fn specification(&self) -> ActionSpecification {
            ActionSpecification::new(
                "trigger.manual",
                ActionKind::Trigger,
                vec![],
                vec!["main".into()],
            )
        }

        async fn execute(&self, _params: Map<String, Value>, _context: ActionContext) -> ActionOutcome {
            ActionOutcome::completed(Value::Null)
        }
    }

    fn registry_with_noop() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Noop));
        registry
    }

    #[test]
    fn get_hits_and_misses() {
        let registry = registry_with_noop();
        assert!(registry.get("trigger.manual").is_ok());
        let err = registry.get("missing").unwrap_err();
        assert_eq!(err.code(), "action_not_found");
    }

    #[test]
    fn implements_action_kind_resolver() {
        let registry = registry_with_noop();
        assert_eq!(registry.kind_of("trigger.manual"), Some(ActionKind::Trigger));
        assert_eq!(registry.kind_of("missing"), None);
    }

    #[test]
    fn contains_reflects_registration() {
        let registry = registry_with_noop();
        assert!(registry.contains("trigger.manual"));
        assert!(!registry.contains("nope"));
    }
}
