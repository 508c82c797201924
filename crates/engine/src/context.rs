//! Workflow execution context
//!
//! [`WorkflowContext`] is the only surface through which workflow code
//! touches the world. Everything reachable from it is mediated by the
//! engine: activity results come from history on replay, side-effect values
//! are recorded once and replayed verbatim, child workflows are deduplicated
//! on their caller-chosen ids.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{ActivityError, WorkflowError};
use crate::options::ActivityOptions;

/// One-shot producer for a recorded side effect
pub type SideEffectFn = Box<dyn FnOnce() -> Value + Send>;

/// Request to start a child workflow
#[derive(Debug, Clone)]
pub struct ChildWorkflowRequest {
    /// Caller-chosen workflow id; the engine rejects a second concurrent
    /// start with the same id, making this the dedup key
    pub workflow_id: String,

    /// Workflow type name to start
    pub workflow_type: String,

    /// Input for the child workflow (JSON)
    pub input: Value,
}

/// Execution context handed to every workflow invocation
///
/// # Determinism
///
/// Workflow code must be deterministic and replay-safe. Within workflow
/// code, direct I/O, wall-clock reads, raw RNG, and OS-level blocking are
/// all forbidden; the context's methods are the only suspension points.
#[async_trait]
pub trait WorkflowContext: Send + Sync {
    /// Execute an activity by name and await its result
    ///
    /// Returns the activity's JSON result, or the final [`ActivityError`]
    /// after the engine has exhausted the retry policy in `options`.
    async fn execute_activity(
        &self,
        activity_type: &str,
        input: Value,
        options: ActivityOptions,
    ) -> Result<Value, ActivityError>;

    /// Run a one-shot side effect and record its value
    ///
    /// The producer runs exactly once per workflow execution; on replay the
    /// recorded value is returned without invoking it again. This is the
    /// required channel for UUIDs, clock reads, and random choice.
    async fn side_effect(&self, producer: SideEffectFn) -> Value;

    /// Start a child workflow and await its result
    async fn start_child_workflow(
        &self,
        request: ChildWorkflowRequest,
    ) -> Result<Value, WorkflowError>;

    /// Suspend the workflow for the given duration
    async fn sleep(&self, duration: Duration);

    /// The id of the executing workflow
    fn workflow_id(&self) -> &str;
}

/// Typed helpers over the JSON-level [`WorkflowContext`]
#[async_trait]
pub trait WorkflowContextExt: WorkflowContext {
    /// Execute an activity with typed input and output
    async fn activity<I, O>(
        &self,
        activity_type: &str,
        input: &I,
        options: ActivityOptions,
    ) -> Result<O, ActivityError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let input = serde_json::to_value(input).map_err(|e| {
            ActivityError::non_retryable(format!(
                "failed to serialize input for {activity_type}: {e}"
            ))
        })?;

        let result = self.execute_activity(activity_type, input, options).await?;

        serde_json::from_value(result).map_err(|e| {
            ActivityError::non_retryable(format!(
                "failed to deserialize result of {activity_type}: {e}"
            ))
        })
    }

    /// Start a child workflow with typed input, ignoring its result value
    async fn child<I, S, T>(
        &self,
        workflow_id: S,
        workflow_type: T,
        input: &I,
    ) -> Result<(), WorkflowError>
    where
        I: Serialize + Sync,
        S: Into<String> + Send,
        T: Into<String> + Send,
    {
        let workflow_type = workflow_type.into();
        let input = serde_json::to_value(input).map_err(|e| {
            WorkflowError::new(format!(
                "failed to serialize input for child {workflow_type}: {e}"
            ))
        })?;

        self.start_child_workflow(ChildWorkflowRequest {
            workflow_id: workflow_id.into(),
            workflow_type,
            input,
        })
        .await?;

        Ok(())
    }
}

impl<C: WorkflowContext + ?Sized> WorkflowContextExt for C {}
