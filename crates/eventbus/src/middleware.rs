//! The ordered, synchronous middleware pipeline.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::event::Event;

/// A single stage in the event pipeline. Implementations are expected to
/// be fast and non-blocking — persistence, telemetry, and alerting are
/// the intended uses, not heavy synchronous work.
pub trait Middleware: Send + Sync {
    /// Handle one event. Panicking is safe: the bus catches it, logs it,
    /// and keeps going — middlewares never fail a workflow.
    fn on_event(&self, event: &Event);
}

impl<F> Middleware for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// An ordered pipeline of [`Middleware`] stages, run synchronously in
/// registration order on every emitted event.
#[derive(Clone, Default)]
pub struct EventBus {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl EventBus {
    /// An empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to the end of the pipeline.
    pub fn register(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Run `event` through every registered middleware in order. A
    /// middleware that panics is caught and logged; the remaining
    /// middlewares still run.
    pub fn emit(&self, event: &Event) {
        for middleware in &self.middlewares {
            let result = catch_unwind(AssertUnwindSafe(|| middleware.on_event(event)));
            if let Err(panic) = result {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "middleware panicked with a non-string payload".to_string());
                tracing::error!(%message, "event bus middleware panicked; continuing pipeline");
            }
        }
    }
}
