//! WireGuard peer workflows
//!
//! Peers are configured on the cluster's gateway shard, not the tenant's web
//! shard.

use tracing::info;

use hosting_contracts::{tables, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};

/// `CreateWireGuardPeer`
pub async fn create_wireguard_peer(
    ctx: &dyn WorkflowContext,
    peer_id: String,
) -> Result<(), OrchestrationError> {
    info!(peer_id, "creating wireguard peer");
    update_status(ctx, tables::WIREGUARD_PEERS, &peer_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_create(ctx, &peer_id).await {
        set_resource_failed(ctx, tables::WIREGUARD_PEERS, &peer_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create(ctx: &dyn WorkflowContext, peer_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_wireguard_peer_context(ctx, peer_id).await?;

    if context.gateway_nodes.is_empty() {
        return Err(OrchestrationError::Validation(format!(
            "cluster of tenant {} has no gateway nodes",
            context.tenant.id
        )));
    }

    let errors = fan_out_nodes(&context.gateway_nodes, |node| {
        let peer = &context.peer;
        async move { activities::add_wireguard_peer(ctx, &node.id, peer).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::WIREGUARD_PEERS, peer_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteWireGuardPeer`
pub async fn delete_wireguard_peer(
    ctx: &dyn WorkflowContext,
    peer_id: String,
) -> Result<(), OrchestrationError> {
    info!(peer_id, "deleting wireguard peer");
    update_status(ctx, tables::WIREGUARD_PEERS, &peer_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &peer_id).await {
        set_resource_failed(ctx, tables::WIREGUARD_PEERS, &peer_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, peer_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_wireguard_peer_context(ctx, peer_id).await?;

    let errors = fan_out_nodes(&context.gateway_nodes, |node| {
        let peer = &context.peer;
        async move {
            activities::remove_wireguard_peer(ctx, &node.id, &peer.id, &peer.public_key).await
        }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::WIREGUARD_PEERS, peer_id, ResourceStatus::Deleted).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{tenant, test_node};
    use hosting_contracts::activities::names;
    use hosting_contracts::{WireGuardPeer, WireGuardPeerContext};
    use hosting_engine::testing::ScriptedContext;
    use serde_json::json;

    fn peer_context(gateways: usize) -> WireGuardPeerContext {
        WireGuardPeerContext {
            peer: WireGuardPeer {
                id: "p1".into(),
                tenant_id: "t1".into(),
                name: "laptop".into(),
                public_key: "wg-pub-key".into(),
                allowed_ips: vec!["10.8.0.2/32".into()],
                status: ResourceStatus::Pending,
            },
            tenant: tenant("t1", Some("s1")),
            gateway_nodes: (1..=gateways).map(|i| test_node(&format!("gw{i}"))).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_peer_on_gateways() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WIREGUARD_PEER_CONTEXT, json!(peer_context(2)));

        create_wireguard_peer(&ctx, "p1".into()).await.unwrap();

        let adds = ctx.calls_of(names::ADD_WIREGUARD_PEER);
        assert_eq!(adds.len(), 2);
        assert_eq!(adds[0].task_queue.as_deref(), Some("node-gw1"));
    }

    #[tokio::test]
    async fn test_create_peer_without_gateways_fails() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WIREGUARD_PEER_CONTEXT, json!(peer_context(0)));

        let err = create_wireguard_peer(&ctx, "p1".into()).await.unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[tokio::test]
    async fn test_delete_peer() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::GET_WIREGUARD_PEER_CONTEXT, json!(peer_context(1)));

        delete_wireguard_peer(&ctx, "p1".into()).await.unwrap();

        let removes = ctx.calls_of(names::REMOVE_WIREGUARD_PEER);
        assert_eq!(removes[0].input["public_key"], "wg-pub-key");
        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "deleted");
    }
}
