//! # Prana Core
//!
//! Foundational types shared by every other Prana crate: strongly-typed
//! identifiers, the `NodeKey` string key, the `ActionKind` classification
//! used by the graph compiler, and a small shared error type.
//!
//! This crate has no behaviour of its own beyond identifier parsing — it
//! exists so that `prana-graph` and `prana-action` can agree on identifier
//! and classification types without depending on each other.

mod action_kind;
mod error;
mod id;
mod keys;

pub use action_kind::ActionKind;
pub use error::CoreError;
pub use id::{ExecutionId, UuidParseError, WorkflowId};
pub use keys::{KeyParseError, NodeKey};

/// Common prelude for downstream Prana crates.
pub mod prelude {
    pub use crate::{ActionKind, CoreError, ExecutionId, NodeKey, WorkflowId};
}
