//! A handful of reference action implementations for the Prana workflow
//! engine.
//!
//! None of these are meant for production hosts — they exist to give the
//! engine's own tests (and anyone exploring the API) a working action set
//! without needing a real integration (HTTP, a queue, a database). Each
//! module covers one corner of the action contract: a
//! trigger, a branching action, a plain transform, a loop, a
//! suspend/resume action, and a deliberately-failing one.

mod flaky;
mod logic;
mod loop_batch;
mod sub_workflow;
mod trigger;
mod transform;

pub use flaky::{AlwaysFail, Flaky};
pub use logic::IfCondition;
pub use loop_batch::ForEachBatch;
pub use sub_workflow::CallSubWorkflow;
pub use trigger::ManualTrigger;
pub use transform::Compute;

use std::sync::Arc;

use prana_action::ActionRegistry;

/// Register every action in this crate under its own name.
pub fn register_all(registry: &mut ActionRegistry) {
    registry
        .register(Arc::new(ManualTrigger))
        .register(Arc::new(IfCondition))
        .register(Arc::new(Compute))
        .register(Arc::new(ForEachBatch))
        .register(Arc::new(CallSubWorkflow))
        .register(Arc::new(AlwaysFail));
}
