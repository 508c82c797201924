//! Scripted in-memory context for workflow tests
//!
//! [`ScriptedContext`] implements [`WorkflowContext`] without an engine:
//! activity responses are scripted per activity type as FIFO queues, every
//! invocation is recorded, and side-effect values can be seeded so generated
//! ids are predictable. Tests drive a workflow function directly and then
//! assert on the recorded call sequence.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::{ChildWorkflowRequest, SideEffectFn, WorkflowContext};
use crate::error::{ActivityError, WorkflowError};
use crate::options::ActivityOptions;

/// A recorded activity invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCall {
    /// Activity type name
    pub activity_type: String,

    /// JSON input the workflow passed
    pub input: Value,

    /// Task queue the call was routed to (`None` = default queue)
    pub task_queue: Option<String>,
}

/// A recorded child-workflow invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ChildWorkflowCall {
    /// Workflow id the caller chose
    pub workflow_id: String,

    /// Workflow type name
    pub workflow_type: String,

    /// JSON input
    pub input: Value,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<String, VecDeque<Result<Value, ActivityError>>>,
    child_results: HashMap<String, VecDeque<Result<Value, WorkflowError>>>,
    side_effects: VecDeque<Value>,
    calls: Vec<ActivityCall>,
    child_calls: Vec<ChildWorkflowCall>,
    sleeps: Vec<Duration>,
}

/// Scripted [`WorkflowContext`] implementation
///
/// Unscripted activities succeed with `null` (convenient for the many
/// status-update and node verbs whose results workflows ignore); unscripted
/// child workflows succeed with `null` as well.
pub struct ScriptedContext {
    workflow_id: String,
    inner: Mutex<Inner>,
}

impl Default for ScriptedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedContext {
    /// Create a context with the default workflow id
    pub fn new() -> Self {
        Self::with_workflow_id("test-workflow")
    }

    /// Create a context with an explicit workflow id
    pub fn with_workflow_id(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Script the next response for an activity type
    pub fn respond(&self, activity_type: impl Into<String>, result: Value) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .entry(activity_type.into())
            .or_default()
            .push_back(Ok(result));
        self
    }

    /// Script the next failure for an activity type
    pub fn fail(&self, activity_type: impl Into<String>, error: ActivityError) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .entry(activity_type.into())
            .or_default()
            .push_back(Err(error));
        self
    }

    /// Script the next result for a child workflow type
    pub fn child_result(
        &self,
        workflow_type: impl Into<String>,
        result: Result<Value, WorkflowError>,
    ) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .child_results
            .entry(workflow_type.into())
            .or_default()
            .push_back(result);
        self
    }

    /// Seed the next side-effect value (e.g. a fixed id)
    pub fn seed_side_effect(&self, value: Value) -> &Self {
        self.inner.lock().unwrap().side_effects.push_back(value);
        self
    }

    /// All recorded activity calls, in invocation order
    pub fn calls(&self) -> Vec<ActivityCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Recorded activity type names, in invocation order
    pub fn activity_types(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|c| c.activity_type.clone())
            .collect()
    }

    /// Recorded calls of one activity type
    pub fn calls_of(&self, activity_type: &str) -> Vec<ActivityCall> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.activity_type == activity_type)
            .cloned()
            .collect()
    }

    /// All recorded child-workflow calls, in invocation order
    pub fn child_calls(&self) -> Vec<ChildWorkflowCall> {
        self.inner.lock().unwrap().child_calls.clone()
    }

    /// All recorded sleeps, in invocation order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().sleeps.clone()
    }
}

#[async_trait]
impl WorkflowContext for ScriptedContext {
    async fn execute_activity(
        &self,
        activity_type: &str,
        input: Value,
        options: ActivityOptions,
    ) -> Result<Value, ActivityError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(ActivityCall {
            activity_type: activity_type.to_string(),
            input,
            task_queue: options.task_queue.clone(),
        });

        match inner
            .responses
            .get_mut(activity_type)
            .and_then(|q| q.pop_front())
        {
            Some(result) => result,
            None => Ok(Value::Null),
        }
    }

    async fn side_effect(&self, producer: SideEffectFn) -> Value {
        let seeded = self.inner.lock().unwrap().side_effects.pop_front();
        seeded.unwrap_or_else(producer)
    }

    async fn start_child_workflow(
        &self,
        request: ChildWorkflowRequest,
    ) -> Result<Value, WorkflowError> {
        let mut inner = self.inner.lock().unwrap();
        inner.child_calls.push(ChildWorkflowCall {
            workflow_id: request.workflow_id,
            workflow_type: request.workflow_type.clone(),
            input: request.input,
        });

        match inner
            .child_results
            .get_mut(&request.workflow_type)
            .and_then(|q| q.pop_front())
        {
            Some(result) => result,
            None => Ok(Value::Null),
        }
    }

    async fn sleep(&self, duration: Duration) {
        self.inner.lock().unwrap().sleeps.push(duration);
    }

    fn workflow_id(&self) -> &str {
        &self.workflow_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WorkflowContextExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_response_order() {
        let ctx = ScriptedContext::new();
        ctx.respond("Read", json!(1)).respond("Read", json!(2));

        let first: i32 = ctx
            .activity("Read", &(), ActivityOptions::default())
            .await
            .unwrap();
        let second: i32 = ctx
            .activity("Read", &(), ActivityOptions::default())
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(ctx.activity_types(), vec!["Read", "Read"]);
    }

    #[tokio::test]
    async fn test_unscripted_activity_returns_null() {
        let ctx = ScriptedContext::new();
        let result: () = ctx
            .activity("UpdateSomething", &json!({"x": 1}), ActivityOptions::default())
            .await
            .unwrap();

        assert_eq!(result, ());
        assert_eq!(ctx.calls()[0].input, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let ctx = ScriptedContext::new();
        ctx.fail("Flaky", ActivityError::retryable("boom"));

        let result = ctx
            .execute_activity("Flaky", Value::Null, ActivityOptions::default())
            .await;

        assert_eq!(result.unwrap_err().message, "boom");
    }

    #[tokio::test]
    async fn test_seeded_side_effect() {
        let ctx = ScriptedContext::new();
        ctx.seed_side_effect(json!("fixed-id"));

        let seeded = ctx.side_effect(Box::new(|| json!("generated"))).await;
        let generated = ctx.side_effect(Box::new(|| json!("generated"))).await;

        assert_eq!(seeded, json!("fixed-id"));
        assert_eq!(generated, json!("generated"));
    }

    #[tokio::test]
    async fn test_task_queue_recorded() {
        let ctx = ScriptedContext::new();
        let options = ActivityOptions::default().with_task_queue("node-n1");
        let _ = ctx.execute_activity("NodeVerb", Value::Null, options).await;

        assert_eq!(ctx.calls()[0].task_queue.as_deref(), Some("node-n1"));
    }

    #[tokio::test]
    async fn test_child_workflow_recorded() {
        let ctx = ScriptedContext::new();
        ctx.child_result("Child", Err(WorkflowError::new("child broke")));

        let err = ctx
            .start_child_workflow(ChildWorkflowRequest {
                workflow_id: "create-thing-1".into(),
                workflow_type: "Child".into(),
                input: Value::Null,
            })
            .await
            .unwrap_err();

        assert_eq!(err.message, "child broke");
        assert_eq!(ctx.child_calls()[0].workflow_id, "create-thing-1");
    }
}
