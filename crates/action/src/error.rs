//! Errors surfaced by action resolution and parameter validation.

use thiserror::Error;

/// Errors that can occur resolving or preparing an action for execution.
/// These map directly onto the `Failed{code: ...}` outcomes the node
/// executor synthesizes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No action is registered under this `node_type`.
    #[error("action not found: {0}")]
    ActionNotFound(String),

    /// `validate_params` rejected the rendered parameters.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The action returned a port not in its declared `output_ports`.
    #[error("invalid output port {port:?} for action {action_name:?}")]
    InvalidOutputPort {
        /// The action that produced the invalid port.
        action_name: String,
        /// The port it tried to route through.
        port: String,
    },
}

impl ActionError {
    /// The stable machine-readable code for this error
    /// (`action_not_found`, `validation_error`, `invalid_output_port`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ActionNotFound(_) => "action_not_found",
            Self::ValidationError(_) => "validation_error",
            Self::InvalidOutputPort { .. } => "invalid_output_port",
        }
    }
}
