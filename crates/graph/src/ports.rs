//! Port name conventions.
//!
//! Ports are opaque strings — the graph model does not validate them
//! beyond the two reserved spellings below. Action-specific
//! port validation (fixed vs. dynamic `output_ports`) happens in
//! `prana-action`/`prana-engine`, not here.

/// A port name on a node — opaque to the graph model.
pub type PortName = String;

/// The default port for simple chaining; used when an action doesn't
/// distinguish multiple outputs.
pub const MAIN: &str = "main";

/// The conventional failure-routing output port.
pub const ERROR: &str = "error";

/// Sentinel used in an action's declared `output_ports` list meaning "this
/// action may emit any port name" — the engine skips port validation for
/// such actions.
pub const DYNAMIC_PORTS: &str = "*";
