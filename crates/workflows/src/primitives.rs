//! Orchestration primitives
//!
//! Option presets, deterministic id generation, node fan-out, and child
//! workflow fan-out. All iteration follows caller-supplied order so replay
//! sees an identical activity sequence; callers needing a tie-break pre-sort
//! their inputs.

use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use uuid::Uuid;

use hosting_contracts::queues;
use hosting_contracts::Node;
use hosting_engine::{
    ActivityError, ActivityOptions, ChildWorkflowRequest, RetryPolicy, WorkflowContext,
};

/// Longest status message / joined error string, in chars
pub const MAX_ERROR_CHARS: usize = 4000;

/// Default options for orchestration-level activities
///
/// 30s per attempt, 3 attempts, 1s-10s exponential backoff.
pub fn default_activity_options() -> ActivityOptions {
    ActivityOptions::default()
        .with_start_to_close_timeout(Duration::from_secs(30))
        .with_retry(RetryPolicy::exponential())
}

/// Options for long-running data operations (dumps, imports, smoke tests)
///
/// Same 3-attempt policy, but each attempt may run for minutes; the
/// schedule-to-close window covers all attempts plus backoff.
pub fn long_activity_options(start_to_close: Duration) -> ActivityOptions {
    ActivityOptions::default()
        .with_start_to_close_timeout(start_to_close)
        .with_schedule_to_close_timeout(start_to_close * 4)
        .with_retry(RetryPolicy::exponential().with_max_interval(Duration::from_secs(60)))
}

/// Options for activities that must execute on one specific node
///
/// Routed to the node's dedicated queue. Node agents can be briefly offline
/// (reboots, agent upgrades), so retries are more patient: 5 attempts with
/// 5s-30s backoff, bounded by a 10m schedule-to-close window.
pub fn node_activity_options(node_id: &str) -> ActivityOptions {
    ActivityOptions::default()
        .with_task_queue(queues::node_task_queue(node_id))
        .with_start_to_close_timeout(Duration::from_secs(120))
        .with_schedule_to_close_timeout(Duration::from_secs(600))
        .with_retry(
            RetryPolicy::exponential()
                .with_max_attempts(5)
                .with_initial_interval(Duration::from_secs(5))
                .with_max_interval(Duration::from_secs(30)),
        )
}

/// Generate a UUID that is stable across replays
///
/// The value is produced through the engine's side-effect primitive: recorded
/// on first execution, replayed verbatim afterwards.
pub async fn new_deterministic_id(ctx: &dyn WorkflowContext) -> String {
    let value = ctx
        .side_effect(Box::new(|| Value::String(Uuid::new_v4().to_string())))
        .await;

    match value {
        Value::String(id) => id,
        other => other.to_string(),
    }
}

/// Run a per-node operation across a shard, collecting failures
///
/// For a single node the call runs inline; for two or more, one cooperative
/// task per node issues its activity concurrently. The returned slice holds
/// one entry per failing node, in input order; empty means success.
pub async fn fan_out_nodes<F, Fut>(nodes: &[Node], f: F) -> Vec<String>
where
    F: Fn(Node) -> Fut,
    Fut: std::future::Future<Output = Result<(), ActivityError>>,
{
    if nodes.len() <= 1 {
        let mut errors = Vec::new();
        if let Some(node) = nodes.first() {
            if let Err(e) = f(node.clone()).await {
                errors.push(format!("node {}: {}", node.id, e));
            }
        }
        return errors;
    }

    let tasks = nodes.iter().map(|node| {
        let fut = f(node.clone());
        let node_id = node.id.clone();
        async move { (node_id, fut.await) }
    });

    join_all(tasks)
        .await
        .into_iter()
        .filter_map(|(node_id, result)| result.err().map(|e| format!("node {node_id}: {e}")))
        .collect()
}

/// A child workflow to launch during fan-out
#[derive(Debug, Clone)]
pub struct ChildSpec {
    /// Workflow type name
    pub workflow_type: String,

    /// Deterministic workflow id (see [`child_workflow_id`])
    pub workflow_id: String,

    /// JSON input for the child
    pub input: Value,
}

/// Launch child workflows in parallel, collecting failures
///
/// Same structure as [`fan_out_nodes`]: single child runs inline, multiple
/// children run concurrently. Whether a failure aborts the parent is the
/// caller's policy.
pub async fn fan_out_child_workflows(
    ctx: &dyn WorkflowContext,
    specs: Vec<ChildSpec>,
) -> Vec<String> {
    async fn launch(ctx: &dyn WorkflowContext, spec: ChildSpec) -> Option<String> {
        let workflow_id = spec.workflow_id.clone();
        let result = ctx
            .start_child_workflow(ChildWorkflowRequest {
                workflow_id: spec.workflow_id,
                workflow_type: spec.workflow_type,
                input: spec.input,
            })
            .await;

        result
            .err()
            .map(|e| format!("child {workflow_id}: {}", e.message))
    }

    if specs.len() <= 1 {
        let mut errors = Vec::new();
        if let Some(spec) = specs.into_iter().next() {
            if let Some(err) = launch(ctx, spec).await {
                errors.push(err);
            }
        }
        return errors;
    }

    let tasks = specs.into_iter().map(|spec| launch(ctx, spec));

    join_all(tasks).await.into_iter().flatten().collect()
}

/// Join fan-out errors into one status message
///
/// `"; "`-separated, truncated to [`MAX_ERROR_CHARS`].
pub fn join_errors(errors: &[String]) -> String {
    let joined = errors.join("; ");
    truncate_chars(&joined, MAX_ERROR_CHARS)
}

/// Truncate a string to at most `max` chars, respecting char boundaries
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Deterministic child workflow id: `<verb>-<entity>-<id>`
///
/// Doubles as the engine-level dedup key, so it must never be randomized.
pub fn child_workflow_id(verb: &str, entity: &str, id: &str) -> String {
    format!("{verb}-{entity}-{id}")
}
