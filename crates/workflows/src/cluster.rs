//! Cluster provisioning and decommissioning
//!
//! Provisioning validates host reachability, brings up the enabled
//! infrastructure services as containers, creates the shards and nodes of
//! the spec, and hands each node to its own `ProvisionNode` child. Node
//! children are the one place child failures propagate: a cluster with
//! half-provisioned nodes must not report `active`.

use serde_json::json;
use tracing::{info, warn};

use hosting_contracts::activities::{
    CreateContainerInput, CreateInfrastructureServiceInput, CreateNodeInput, CreateShardInput,
};
use hosting_contracts::{tables, ClusterContext, InfraServiceType, ResourceStatus, ShardSpec};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{
    child_workflow_id, fan_out_child_workflows, join_errors, new_deterministic_id, ChildSpec,
};
use crate::status::{set_resource_failed, update_status};
use crate::workflow_names;

fn infra_image(service_type: InfraServiceType) -> &'static str {
    match service_type {
        InfraServiceType::Haproxy => "haproxy:2.9",
        InfraServiceType::ServiceDb => "mariadb:11",
        InfraServiceType::Valkey => "valkey/valkey:8",
    }
}

fn docker_network(context: &ClusterContext) -> String {
    context
        .cluster
        .config
        .get("docker_network")
        .and_then(|v| v.as_str())
        .unwrap_or("hosting")
        .to_string()
}

/// `ProvisionCluster`
pub async fn provision_cluster(
    ctx: &dyn WorkflowContext,
    cluster_id: String,
) -> Result<(), OrchestrationError> {
    info!(cluster_id, "provisioning cluster");
    update_status(ctx, tables::CLUSTERS, &cluster_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_provision(ctx, &cluster_id).await {
        set_resource_failed(ctx, tables::CLUSTERS, &cluster_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_provision(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
) -> Result<(), OrchestrationError> {
    let context = activities::get_cluster_context(ctx, cluster_id).await?;

    if context.hosts.is_empty() {
        return Err(OrchestrationError::Validation(format!(
            "cluster {cluster_id} has no host machines"
        )));
    }

    for host in &context.hosts {
        activities::validate_host_reachable(ctx, &host.id)
            .await
            .map_err(|e| OrchestrationError::Validation(e.message))?;
    }

    for service_type in context.cluster.spec.services.enabled() {
        start_infra_service(ctx, &context, service_type).await?;
    }

    for shard_spec in &context.cluster.spec.shards {
        provision_shard(ctx, &context, shard_spec).await?;
    }

    activities::configure_haproxy_backends(ctx, cluster_id).await?;
    activities::run_cluster_smoke_test(ctx, cluster_id).await?;

    update_status(ctx, tables::CLUSTERS, cluster_id, ResourceStatus::Active).await?;
    Ok(())
}

async fn start_infra_service(
    ctx: &dyn WorkflowContext,
    context: &ClusterContext,
    service_type: InfraServiceType,
) -> Result<(), OrchestrationError> {
    let cluster_id = &context.cluster.id;
    info!(cluster_id, %service_type, "starting infrastructure service");

    let selected = activities::select_host_for_infra(ctx, cluster_id, service_type).await?;
    let image = infra_image(service_type);

    activities::pull_image(ctx, &selected.host_id, image).await?;

    let container = activities::create_container(
        ctx,
        &CreateContainerInput {
            host_id: selected.host_id.clone(),
            service_type,
            image: image.to_string(),
            network: docker_network(context),
        },
    )
    .await?;

    activities::wait_for_healthy(ctx, &selected.host_id, &container.container_id).await?;

    let service_id = new_deterministic_id(ctx).await;
    activities::create_infrastructure_service(
        ctx,
        &CreateInfrastructureServiceInput {
            id: service_id,
            cluster_id: cluster_id.clone(),
            host_id: selected.host_id,
            service_type,
            container_id: container.container_id,
        },
    )
    .await?;

    Ok(())
}

async fn provision_shard(
    ctx: &dyn WorkflowContext,
    context: &ClusterContext,
    spec: &ShardSpec,
) -> Result<(), OrchestrationError> {
    let cluster = &context.cluster;
    info!(cluster_id = %cluster.id, shard = %spec.name, "creating shard");

    let shard = activities::create_shard(
        ctx,
        &CreateShardInput {
            cluster_id: cluster.id.clone(),
            spec: spec.clone(),
        },
    )
    .await?;

    let mut children = Vec::new();
    for index in 0..spec.node_count {
        let node_id = new_deterministic_id(ctx).await;
        let hostname = format!("{}-{}-{index}", cluster.name, spec.name);

        let node = activities::create_node(
            ctx,
            &CreateNodeInput {
                id: node_id,
                cluster_id: cluster.id.clone(),
                shard_id: shard.id.clone(),
                shard_index: index,
                hostname,
                roles: vec![spec.role.to_string()],
            },
        )
        .await?;

        children.push(ChildSpec {
            workflow_type: workflow_names::PROVISION_NODE.to_string(),
            workflow_id: child_workflow_id("provision", "node", &node.id),
            input: json!(node.id),
        });
    }

    let errors = fan_out_child_workflows(ctx, children).await;
    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    Ok(())
}

/// `DecommissionCluster`: best-effort container teardown, then node release
pub async fn decommission_cluster(
    ctx: &dyn WorkflowContext,
    cluster_id: String,
) -> Result<(), OrchestrationError> {
    info!(cluster_id, "decommissioning cluster");
    update_status(ctx, tables::CLUSTERS, &cluster_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_decommission(ctx, &cluster_id).await {
        set_resource_failed(ctx, tables::CLUSTERS, &cluster_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_decommission(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
) -> Result<(), OrchestrationError> {
    let services = activities::list_infrastructure_services(ctx, cluster_id).await?;
    for service in &services {
        if let Err(e) =
            activities::remove_container(ctx, &service.host_id, &service.container_id).await
        {
            warn!(
                host_id = %service.host_id,
                container_id = %service.container_id,
                error = %e,
                "failed to remove infrastructure container"
            );
        }
    }

    let nodes = activities::list_nodes_by_cluster(ctx, cluster_id).await?;
    let mut errors = Vec::new();
    for node in &nodes {
        if let Err(e) = activities::release_node(ctx, &node.id).await {
            errors.push(format!("node {}: {}", node.id, e));
        }
    }

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::CLUSTERS, cluster_id, ResourceStatus::Deleted).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cluster, cluster_spec, host, test_node};
    use hosting_contracts::activities::names;
    use hosting_contracts::{InfraServices, ShardRole};
    use hosting_engine::testing::ScriptedContext;

    fn two_host_context(spec: hosting_contracts::ClusterSpec) -> serde_json::Value {
        json!(ClusterContext {
            cluster: cluster("c1", spec),
            hosts: vec![host("h1"), host("h2")],
        })
    }

    #[tokio::test]
    async fn test_provision_cluster_with_infra_and_shard() {
        let ctx = ScriptedContext::new();
        let spec = cluster_spec(
            vec![ShardSpec {
                name: "web-1".into(),
                role: ShardRole::Web,
                node_count: 2,
            }],
            InfraServices {
                haproxy: true,
                service_db: false,
                valkey: false,
            },
        );
        ctx.respond(names::GET_CLUSTER_CONTEXT, two_host_context(spec));
        ctx.respond(names::SELECT_HOST_FOR_INFRA, json!({ "host_id": "h1" }));
        ctx.respond(names::CREATE_CONTAINER, json!({ "container_id": "ct-lb" }));
        ctx.seed_side_effect(json!("svc-1"));
        ctx.respond(
            names::CREATE_SHARD,
            json!({
                "id": "s-web-1",
                "cluster_id": "c1",
                "name": "web-1",
                "role": "web",
                "lb_backend": "web-1",
                "config": {},
                "status": "provisioning",
            }),
        );
        ctx.seed_side_effect(json!("node-a"));
        ctx.seed_side_effect(json!("node-b"));
        ctx.respond(names::CREATE_NODE, json!(test_node("node-a")));
        ctx.respond(names::CREATE_NODE, json!(test_node("node-b")));

        provision_cluster(&ctx, "c1".into()).await.unwrap();

        // both hosts validated
        assert_eq!(ctx.calls_of(names::VALIDATE_HOST_REACHABLE).len(), 2);

        // haproxy brought up end to end
        assert_eq!(ctx.calls_of(names::PULL_IMAGE)[0].input["image"], "haproxy:2.9");
        assert_eq!(
            ctx.calls_of(names::CREATE_CONTAINER)[0].input["network"],
            "hosting"
        );
        assert_eq!(ctx.calls_of(names::WAIT_FOR_HEALTHY).len(), 1);
        assert_eq!(
            ctx.calls_of(names::CREATE_INFRASTRUCTURE_SERVICE)[0].input["container_id"],
            "ct-lb"
        );

        // shard with two nodes, each handed to a provision child
        assert_eq!(ctx.calls_of(names::CREATE_NODE).len(), 2);
        let children = ctx.child_calls();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].workflow_id, "provision-node-node-a");
        assert_eq!(children[0].workflow_type, "ProvisionNode");

        // finishing touches in order
        let types = ctx.activity_types();
        let backends = types
            .iter()
            .position(|t| t == names::CONFIGURE_HAPROXY_BACKENDS)
            .unwrap();
        let smoke = types
            .iter()
            .position(|t| t == names::RUN_CLUSTER_SMOKE_TEST)
            .unwrap();
        assert!(backends < smoke);

        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "active");
    }

    #[tokio::test]
    async fn test_provision_cluster_node_child_failure_propagates() {
        let ctx = ScriptedContext::new();
        let spec = cluster_spec(
            vec![ShardSpec {
                name: "web-1".into(),
                role: ShardRole::Web,
                node_count: 1,
            }],
            InfraServices::default(),
        );
        ctx.respond(names::GET_CLUSTER_CONTEXT, two_host_context(spec));
        ctx.respond(
            names::CREATE_SHARD,
            json!({
                "id": "s-web-1",
                "cluster_id": "c1",
                "name": "web-1",
                "role": "web",
                "lb_backend": "web-1",
                "config": {},
                "status": "provisioning",
            }),
        );
        ctx.seed_side_effect(json!("node-a"));
        ctx.respond(names::CREATE_NODE, json!(test_node("node-a")));
        ctx.child_result(
            "ProvisionNode",
            Err(hosting_engine::WorkflowError::new("bootstrap failed")),
        );

        let err = provision_cluster(&ctx, "c1".into()).await.unwrap_err();
        assert_eq!(err.code(), "partial_fanout");
        assert!(err.to_string().contains("provision-node-node-a"));

        // never reached the smoke test
        assert!(ctx.calls_of(names::RUN_CLUSTER_SMOKE_TEST).is_empty());
        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "failed");
    }

    #[tokio::test]
    async fn test_provision_cluster_unreachable_host() {
        let ctx = ScriptedContext::new();
        let spec = cluster_spec(vec![], InfraServices::default());
        ctx.respond(names::GET_CLUSTER_CONTEXT, two_host_context(spec));
        ctx.fail(
            names::VALIDATE_HOST_REACHABLE,
            hosting_engine::ActivityError::non_retryable("ssh timeout"),
        );

        let err = provision_cluster(&ctx, "c1".into()).await.unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[tokio::test]
    async fn test_decommission_cluster_container_failures_tolerated() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::LIST_INFRASTRUCTURE_SERVICES,
            json!([{
                "id": "svc-1",
                "cluster_id": "c1",
                "host_id": "h1",
                "service_type": "haproxy",
                "container_id": "ct-lb",
            }]),
        );
        ctx.fail(
            names::REMOVE_CONTAINER,
            hosting_engine::ActivityError::retryable("docker daemon unreachable"),
        );
        ctx.respond(names::LIST_NODES_BY_CLUSTER, json!([test_node("node-a")]));

        decommission_cluster(&ctx, "c1".into()).await.unwrap();

        assert_eq!(ctx.calls_of(names::RELEASE_NODE).len(), 1);
        let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
        assert_eq!(statuses.last().unwrap().input["status"], "deleted");
    }
}
