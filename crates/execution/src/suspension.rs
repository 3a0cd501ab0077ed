//! Suspension types and their host-facing data shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The reason a node suspended, determining how the host is expected to
/// eventually trigger resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionType {
    /// Host schedules a wake-up after a fixed delay.
    Interval,
    /// Host schedules a wake-up at a wall-clock time.
    Schedule,
    /// Host maps an opaque token to `(execution_id, node_key)` and resumes
    /// on an inbound HTTP hit.
    Webhook,
    /// Host starts a child workflow and resumes this node once it
    /// completes.
    SubWorkflowSync,
    /// Host starts a child workflow and resumes this node via a later,
    /// independent callback.
    SubWorkflowAsync,
    /// Host starts a child workflow and never resumes this node; the
    /// branch ends at suspension.
    SubWorkflowFireForget,
    /// Host re-schedules the node for a retry attempt.
    Retry,
}

impl std::fmt::Display for SuspensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Interval => "interval",
            Self::Schedule => "schedule",
            Self::Webhook => "webhook",
            Self::SubWorkflowSync => "sub_workflow_sync",
            Self::SubWorkflowAsync => "sub_workflow_async",
            Self::SubWorkflowFireForget => "sub_workflow_fire_forget",
            Self::Retry => "retry",
        };
        write!(f, "{s}")
    }
}

/// `{duration_ms, resume_at}` for [`SuspensionType::Interval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSuspension {
    /// How long to wait before resuming, in milliseconds.
    pub duration_ms: u64,
    /// The wall-clock time the host should resume at.
    pub resume_at: chrono::DateTime<chrono::Utc>,
}

/// `{schedule_at, timezone}` for [`SuspensionType::Schedule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSuspension {
    /// The wall-clock time to resume at.
    pub schedule_at: chrono::DateTime<chrono::Utc>,
    /// IANA timezone name the schedule was expressed in.
    pub timezone: String,
}

/// `{resume_token, expires_at, webhook_url?, config}` for
/// [`SuspensionType::Webhook`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSuspension {
    /// Opaque token the host maps back to this execution and node.
    pub resume_token: String,
    /// When the token stops being valid.
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// Optional URL the host may expose to callers.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Action-specific configuration, opaque to the engine.
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// A strategy for handling child-workflow failure, shared by the
/// `sub_workflow_*` suspension kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Propagate the child's failure as this node's failure.
    Propagate,
    /// Treat child failure as success, routing through `error` only if the
    /// node's own `on_error` policy says to.
    Ignore,
}

/// `{workflow_id, input_data, timeout_ms, failure_strategy}`, shared shape
/// for all three `sub_workflow_*` suspension kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubWorkflowSuspension {
    /// Identifier of the workflow to run as a child.
    pub workflow_id: prana_core::WorkflowId,
    /// Input data handed to the child's trigger.
    pub input_data: Value,
    /// Host-enforced wall-clock budget for the child.
    pub timeout_ms: u64,
    /// What to do if the child fails.
    pub failure_strategy: FailureStrategy,
}

/// `{attempt, delay_ms, resume_at}` for [`SuspensionType::Retry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySuspension {
    /// The attempt number about to be made (1-indexed).
    pub attempt: u32,
    /// Delay before the host re-schedules this node.
    pub delay_ms: u64,
    /// The wall-clock time the host should resume at.
    pub resume_at: chrono::DateTime<chrono::Utc>,
}
