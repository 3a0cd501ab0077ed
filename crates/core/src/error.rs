//! Shared error type for foundational concerns (identifier parsing).
//!
//! Crates above `prana-core` define their own error enums (`CompileError`,
//! `ExecutionError`, `ActionError`, `EngineError`) and wrap this one with
//! `#[from]` where identifier parsing can fail at their boundary.

use thiserror::Error;

/// Errors surfaced by `prana-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string failed to parse as a UUID-backed identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::id::UuidParseError),

    /// A string failed to parse as a string-backed key.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] crate::keys::KeyParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::WorkflowId;

    #[test]
    fn invalid_id_wraps_parse_error() {
        let err = WorkflowId::parse("nope").unwrap_err();
        let core_err = CoreError::from(err);
        assert!(core_err.to_string().starts_with("invalid identifier:"));
    }
}
