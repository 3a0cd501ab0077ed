//! Engine-wide tunables.

/// Configuration for a [`crate::GraphExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphExecutorConfig {
    /// The sole built-in safeguard against runaway loops: the main loop
    /// fails with `infinite_loop_protection` once `iteration_count`
    /// reaches this value.
    pub max_iterations: u64,
}

impl Default for GraphExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}
