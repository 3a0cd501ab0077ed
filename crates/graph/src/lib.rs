//! Workflow definition, compilation, and the indexed execution graph for
//! the Prana workflow engine.
//!
//! Authors build a [`Workflow`]; [`compile`] turns it into an
//! [`ExecutionGraph`] the engine can execute without re-walking
//! connections or re-deriving trigger selection on every run.

mod compiler;
mod connection;
mod error;
mod execution_graph;
mod node;
mod ports;
mod resolver;
mod workflow;

pub use compiler::compile;
pub use connection::Connection;
pub use error::CompileError;
pub use execution_graph::ExecutionGraph;
pub use node::{Node, NodeSettings, OnErrorPolicy};
pub use ports::{PortName, DYNAMIC_PORTS, ERROR, MAIN};
pub use resolver::ActionKindResolver;
pub use workflow::{ConnectionTable, Workflow};

/// Commonly used types, re-exported for glob import.
pub mod prelude {
    pub use crate::{
        compile, ActionKindResolver, CompileError, Connection, ExecutionGraph, Node,
        NodeSettings, OnErrorPolicy, PortName, Workflow, DYNAMIC_PORTS, ERROR, MAIN,
    };
}
