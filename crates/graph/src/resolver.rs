//! The port trait through which the compiler learns an action's kind.
//!
//! `prana-graph` deliberately does not depend on `prana-action` — the
//! compiler only needs to know, for trigger selection, whether a node's
//! `node_type` resolves to an action whose specification declares
//! `ActionKind::Trigger`. Callers (typically an `prana_action::ActionRegistry`)
//! implement this trait and pass it in: a narrow trait at the crate
//! boundary instead of a direct dependency on the provider crate.

use prana_core::ActionKind;

/// Resolves a node's `node_type` string to the `ActionKind` its action
/// specification declares, if the type is registered.
pub trait ActionKindResolver {
    /// Look up the action kind for `node_type`, or `None` if unregistered.
    fn kind_of(&self, node_type: &str) -> Option<ActionKind>;
}

impl<F> ActionKindResolver for F
where
    F: Fn(&str) -> Option<ActionKind>,
{
    fn kind_of(&self, node_type: &str) -> Option<ActionKind> {
        self(node_type)
    }
}
