//! Webroot lifecycle workflows

use tracing::info;

use hosting_contracts::{tables, ResourceStatus, WebrootContext};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};

fn require_shard(context: &WebrootContext) -> Result<(), OrchestrationError> {
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }
    Ok(())
}

/// `CreateWebroot`: lay down directories, runtime pool, and server config on
/// every shard node
pub async fn create_webroot(
    ctx: &dyn WorkflowContext,
    webroot_id: String,
) -> Result<(), OrchestrationError> {
    info!(webroot_id, "creating webroot");
    update_status(ctx, tables::WEBROOTS, &webroot_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = converge(ctx, &webroot_id).await {
        set_resource_failed(ctx, tables::WEBROOTS, &webroot_id, &err).await;
        return Err(err);
    }

    Ok(())
}

/// `UpdateWebroot`: re-converge runtime config; same node verb as create,
/// the node agent applies it idempotently
pub async fn update_webroot(
    ctx: &dyn WorkflowContext,
    webroot_id: String,
) -> Result<(), OrchestrationError> {
    info!(webroot_id, "updating webroot");
    update_status(ctx, tables::WEBROOTS, &webroot_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = converge(ctx, &webroot_id).await {
        set_resource_failed(ctx, tables::WEBROOTS, &webroot_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn converge(ctx: &dyn WorkflowContext, webroot_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_webroot_context(ctx, webroot_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let webroot = &context.webroot;
        let tenant_id = context.tenant.id.as_str();
        async move { activities::configure_webroot(ctx, &node.id, tenant_id, webroot).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::WEBROOTS, webroot_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteWebroot`: drop server config and runtime pools from the shard
pub async fn delete_webroot(
    ctx: &dyn WorkflowContext,
    webroot_id: String,
) -> Result<(), OrchestrationError> {
    info!(webroot_id, "deleting webroot");
    update_status(ctx, tables::WEBROOTS, &webroot_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &webroot_id).await {
        set_resource_failed(ctx, tables::WEBROOTS, &webroot_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, webroot_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_webroot_context(ctx, webroot_id).await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant_id = context.tenant.id.as_str();
        async move { activities::remove_webroot(ctx, &node.id, tenant_id, webroot_id).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::WEBROOTS, webroot_id, ResourceStatus::Deleted).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{shard, tenant, test_node, webroot};
    use hosting_contracts::activities::names;
    use hosting_engine::testing::ScriptedContext;
    use serde_json::json;

    fn context_json(shard_id: Option<&str>, nodes: usize) -> serde_json::Value {
        let nodes: Vec<_> = (1..=nodes).map(|i| test_node(&format!("n{i}"))).collect();
        json!(WebrootContext {
            webroot: webroot("w1", "t1"),
            tenant: tenant("t1", shard_id),
            shard: shard_id.map(shard),
            nodes,
        })
    }

    #[tokio::test]
    async fn test_create_webroot_dispatches_every_node() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WEBROOT_CONTEXT, context_json(Some("s1"), 3));

        create_webroot(&ctx, "w1".into()).await.unwrap();

        let calls = ctx.calls_of(names::CONFIGURE_WEBROOT);
        assert_eq!(calls.len(), 3);
        let queues: Vec<_> = calls.iter().map(|c| c.task_queue.clone().unwrap()).collect();
        assert_eq!(queues, vec!["node-n1", "node-n2", "node-n3"]);

        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "active");
        assert_eq!(statuses.last().unwrap().input["table"], "webroots");
    }

    #[tokio::test]
    async fn test_create_webroot_no_shard() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WEBROOT_CONTEXT, context_json(None, 0));

        let err = create_webroot(&ctx, "w1".into()).await.unwrap_err();
        assert_eq!(err.code(), "no_shard");
    }

    #[tokio::test]
    async fn test_delete_webroot() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WEBROOT_CONTEXT, context_json(Some("s1"), 1));

        delete_webroot(&ctx, "w1".into()).await.unwrap();

        assert_eq!(ctx.calls_of(names::REMOVE_WEBROOT).len(), 1);
        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.first().unwrap().input["status"], "deleting");
        assert_eq!(statuses.last().unwrap().input["status"], "deleted");
    }
}
