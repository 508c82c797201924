//! Orchestration error kinds

use hosting_engine::{ActivityError, WorkflowError};
use thiserror::Error;

/// Errors surfaced by the orchestration layer
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The tenant (or entity) has no shard assigned; fatal for the invocation
    #[error("tenant {0} has no shard assigned")]
    NoShard(String),

    /// An upstream lookup came back empty
    #[error("not found: {0}")]
    NotFound(String),

    /// An activity failed after the engine exhausted its retries
    #[error(transparent)]
    Activity(#[from] ActivityError),

    /// A child workflow returned non-success
    #[error("child workflow {workflow_id} failed: {message}")]
    ChildFailed { workflow_id: String, message: String },

    /// One or more parallel branches failed; message is the joined error list
    #[error("{0}")]
    PartialFanOut(String),

    /// Rejected by a validation activity
    #[error("validation failed: {0}")]
    Validation(String),
}

impl OrchestrationError {
    /// Stable error code, used as the workflow error code and for
    /// non-retryable classification
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::NoShard(_) => "no_shard",
            OrchestrationError::NotFound(_) => "not_found",
            OrchestrationError::Activity(_) => "upstream_activity_error",
            OrchestrationError::ChildFailed { .. } => "child_failed",
            OrchestrationError::PartialFanOut(_) => "partial_fanout",
            OrchestrationError::Validation(_) => "validation",
        }
    }
}

impl From<OrchestrationError> for WorkflowError {
    fn from(err: OrchestrationError) -> Self {
        let code = err.code();
        WorkflowError::new(err.to_string()).with_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_shard_message() {
        let err = OrchestrationError::NoShard("t1".into());
        assert_eq!(err.to_string(), "tenant t1 has no shard assigned");
        assert_eq!(err.code(), "no_shard");
    }

    #[test]
    fn test_activity_error_passthrough() {
        let err: OrchestrationError = ActivityError::retryable("connection reset").into();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(err.code(), "upstream_activity_error");
    }

    #[test]
    fn test_workflow_error_conversion() {
        let err = OrchestrationError::NoShard("t9".into());
        let wf: WorkflowError = err.into();
        assert_eq!(wf.code.as_deref(), Some("no_shard"));
        assert_eq!(wf.message, "tenant t9 has no shard assigned");
    }
}
