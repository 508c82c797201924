//! Cron job workflows and single-execution placement
//!
//! Units are installed on every node in the tenant's shard so a job survives
//! node loss, but the systemd timer is enabled on exactly one node per job.
//! The runner is picked by a pure hash over the job id and the id-sorted
//! node list, so placement is stable across reconciliations and derivable
//! without coordination.

use tracing::info;

use hosting_contracts::{tables, CronJobContext, Node, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};

/// 32-bit FNV-1a
fn fnv32a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in s.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Pick the single node allowed to run a cron job
///
/// Nodes are sorted by id before hashing so the choice does not depend on
/// listing order.
pub fn designated_node<'a>(cron_job_id: &str, nodes: &'a [Node]) -> Option<&'a Node> {
    if nodes.is_empty() {
        return None;
    }

    let mut sorted: Vec<&Node> = nodes.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let index = fnv32a(cron_job_id) as usize % sorted.len();
    Some(sorted[index])
}

fn require_shard(context: &CronJobContext) -> Result<(), OrchestrationError> {
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }
    Ok(())
}

/// `CreateCronJob`: install the unit everywhere, enable the timer on the
/// designated node only
pub async fn create_cron_job(
    ctx: &dyn WorkflowContext,
    cron_job_id: String,
) -> Result<(), OrchestrationError> {
    info!(cron_job_id, "creating cron job");
    update_status(ctx, tables::CRON_JOBS, &cron_job_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = converge(ctx, &cron_job_id, None).await {
        set_resource_failed(ctx, tables::CRON_JOBS, &cron_job_id, &err).await;
        return Err(err);
    }

    Ok(())
}

/// `UpdateCronJob`: re-install units and re-run timer placement
pub async fn update_cron_job(
    ctx: &dyn WorkflowContext,
    cron_job_id: String,
) -> Result<(), OrchestrationError> {
    info!(cron_job_id, "updating cron job");
    update_status(ctx, tables::CRON_JOBS, &cron_job_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = converge(ctx, &cron_job_id, None).await {
        set_resource_failed(ctx, tables::CRON_JOBS, &cron_job_id, &err).await;
        return Err(err);
    }

    Ok(())
}

/// `EnableCronJob` / `DisableCronJob`: flip timer state without reinstalling
pub async fn set_cron_job_enabled(
    ctx: &dyn WorkflowContext,
    cron_job_id: String,
    enabled: bool,
) -> Result<(), OrchestrationError> {
    info!(cron_job_id, enabled, "setting cron job enabled state");
    update_status(ctx, tables::CRON_JOBS, &cron_job_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = place_timers(ctx, &cron_job_id, Some(enabled)).await {
        set_resource_failed(ctx, tables::CRON_JOBS, &cron_job_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn converge(
    ctx: &dyn WorkflowContext,
    cron_job_id: &str,
    enabled_override: Option<bool>,
) -> Result<(), OrchestrationError> {
    let context = activities::get_cron_job_context(ctx, cron_job_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let cron_job = &context.cron_job;
        let tenant_id = context.tenant.id.as_str();
        async move { activities::install_cron_unit(ctx, &node.id, tenant_id, cron_job).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    apply_timer_placement(ctx, &context, enabled_override).await?;

    update_status(ctx, tables::CRON_JOBS, cron_job_id, ResourceStatus::Active).await?;
    Ok(())
}

async fn place_timers(
    ctx: &dyn WorkflowContext,
    cron_job_id: &str,
    enabled_override: Option<bool>,
) -> Result<(), OrchestrationError> {
    let context = activities::get_cron_job_context(ctx, cron_job_id).await?;
    require_shard(&context)?;

    apply_timer_placement(ctx, &context, enabled_override).await?;

    update_status(ctx, tables::CRON_JOBS, cron_job_id, ResourceStatus::Active).await?;
    Ok(())
}

/// Enable the timer on the designated node, disable it everywhere else
///
/// With `enabled = false` every node gets disabled, designated included.
async fn apply_timer_placement(
    ctx: &dyn WorkflowContext,
    context: &CronJobContext,
    enabled_override: Option<bool>,
) -> Result<(), OrchestrationError> {
    let enabled = enabled_override.unwrap_or(context.cron_job.enabled);
    let designated = designated_node(&context.cron_job.id, &context.nodes).map(|n| n.id.clone());

    let errors = fan_out_nodes(&context.nodes, |node| {
        let cron_job_id = context.cron_job.id.as_str();
        let run_here = enabled && Some(&node.id) == designated.as_ref();
        async move {
            activities::set_cron_timer_enabled(ctx, &node.id, cron_job_id, run_here).await
        }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    Ok(())
}

/// `DeleteCronJob`: remove units and timers from every node
pub async fn delete_cron_job(
    ctx: &dyn WorkflowContext,
    cron_job_id: String,
) -> Result<(), OrchestrationError> {
    info!(cron_job_id, "deleting cron job");
    update_status(ctx, tables::CRON_JOBS, &cron_job_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &cron_job_id).await {
        set_resource_failed(ctx, tables::CRON_JOBS, &cron_job_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, cron_job_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_cron_job_context(ctx, cron_job_id).await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant_id = context.tenant.id.as_str();
        async move { activities::remove_cron_unit(ctx, &node.id, tenant_id, cron_job_id).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::CRON_JOBS, cron_job_id, ResourceStatus::Deleted).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cron_job, cron_job_context, shard, tenant, test_node, webroot};
    use hosting_contracts::activities::names;
    use hosting_engine::testing::ScriptedContext;
    use serde_json::json;

    fn nodes3() -> Vec<Node> {
        vec![test_node("n1"), test_node("n2"), test_node("n3")]
    }

    #[test]
    fn test_fnv32a_known_values() {
        // FNV-1a test vectors
        assert_eq!(fnv32a(""), 0x811c_9dc5);
        assert_eq!(fnv32a("a"), 0xe40c_292c);
    }

    #[test]
    fn test_designated_node_is_stable_and_order_independent() {
        let nodes = nodes3();
        let picked = designated_node("job-1", &nodes).unwrap().id.clone();

        let mut reversed = nodes.clone();
        reversed.reverse();
        let picked_again = designated_node("job-1", &reversed).unwrap().id.clone();

        assert_eq!(picked, picked_again);
    }

    #[test]
    fn test_designated_node_empty() {
        assert!(designated_node("job-1", &[]).is_none());
    }

    #[test]
    fn test_designated_node_spreads_jobs() {
        let nodes = nodes3();
        let picks: std::collections::HashSet<String> = (0..64)
            .map(|i| designated_node(&format!("job-{i}"), &nodes).unwrap().id.clone())
            .collect();

        // with 64 jobs over 3 nodes every node should be picked at least once
        assert_eq!(picks.len(), 3);
    }

    #[tokio::test]
    async fn test_create_cron_job_single_timer_enabled() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::GET_CRON_JOB_CONTEXT,
            json!(cron_job_context(
                cron_job("j1", "t1", "w1"),
                webroot("w1", "t1"),
                tenant("t1", Some("s1")),
                Some(shard("s1")),
                nodes3(),
            )),
        );

        create_cron_job(&ctx, "j1".into()).await.unwrap();

        // unit installed everywhere
        assert_eq!(ctx.calls_of(names::INSTALL_CRON_UNIT).len(), 3);

        // timer enabled on exactly one node
        let timer_calls = ctx.calls_of(names::SET_CRON_TIMER_ENABLED);
        assert_eq!(timer_calls.len(), 3);
        let enabled: Vec<_> = timer_calls
            .iter()
            .filter(|c| c.input["enabled"] == json!(true))
            .collect();
        assert_eq!(enabled.len(), 1);

        let expected = designated_node("j1", &nodes3()).unwrap().id.clone();
        assert_eq!(
            enabled[0].task_queue.as_deref(),
            Some(format!("node-{expected}").as_str())
        );
    }

    #[tokio::test]
    async fn test_disable_cron_job_disables_everywhere() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::GET_CRON_JOB_CONTEXT,
            json!(cron_job_context(
                cron_job("j1", "t1", "w1"),
                webroot("w1", "t1"),
                tenant("t1", Some("s1")),
                Some(shard("s1")),
                nodes3(),
            )),
        );

        set_cron_job_enabled(&ctx, "j1".into(), false).await.unwrap();

        let timer_calls = ctx.calls_of(names::SET_CRON_TIMER_ENABLED);
        assert_eq!(timer_calls.len(), 3);
        assert!(timer_calls.iter().all(|c| c.input["enabled"] == json!(false)));

        // no reinstall on enable/disable
        assert!(ctx.calls_of(names::INSTALL_CRON_UNIT).is_empty());
    }

    #[tokio::test]
    async fn test_delete_cron_job() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::GET_CRON_JOB_CONTEXT,
            json!(cron_job_context(
                cron_job("j1", "t1", "w1"),
                webroot("w1", "t1"),
                tenant("t1", Some("s1")),
                Some(shard("s1")),
                nodes3(),
            )),
        );

        delete_cron_job(&ctx, "j1".into()).await.unwrap();

        assert_eq!(ctx.calls_of(names::REMOVE_CRON_UNIT).len(), 3);
        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "deleted");
    }
}
