//! Valkey instance and user workflows, including shard migration

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hosting_contracts::activities::ValkeyDumpInput;
use hosting_contracts::{tables, Node, ResourceStatus, ValkeyInstance};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::config::WorkflowConfig;
use crate::error::OrchestrationError;
use crate::primitives::{fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};

/// Parameters for `MigrateValkeyInstance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateValkeyInstanceParams {
    pub instance_id: String,
    pub target_shard_id: String,
}

async fn instance_nodes(
    ctx: &dyn WorkflowContext,
    instance: &ValkeyInstance,
) -> Result<Vec<Node>, OrchestrationError> {
    let shard_id = instance
        .shard_id
        .as_deref()
        .ok_or_else(|| OrchestrationError::NoShard(instance.tenant_id.clone()))?;
    Ok(activities::list_nodes_by_shard(ctx, shard_id).await?)
}

/// `CreateValkeyInstance`: start the instance on every node of its shard
pub async fn create_valkey_instance(
    ctx: &dyn WorkflowContext,
    instance_id: String,
) -> Result<(), OrchestrationError> {
    info!(instance_id, "creating valkey instance");
    update_status(ctx, tables::VALKEY_INSTANCES, &instance_id, ResourceStatus::Provisioning)
        .await?;

    if let Err(err) = run_create_instance(ctx, &instance_id).await {
        set_resource_failed(ctx, tables::VALKEY_INSTANCES, &instance_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create_instance(
    ctx: &dyn WorkflowContext,
    instance_id: &str,
) -> Result<(), OrchestrationError> {
    let instance = activities::get_valkey_instance_by_id(ctx, instance_id).await?;
    let nodes = instance_nodes(ctx, &instance).await?;

    let errors = fan_out_nodes(&nodes, |node| {
        let instance = &instance;
        async move { activities::create_valkey_instance_on(ctx, &node.id, instance).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::VALKEY_INSTANCES, instance_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteValkeyInstance`
pub async fn delete_valkey_instance(
    ctx: &dyn WorkflowContext,
    instance_id: String,
) -> Result<(), OrchestrationError> {
    info!(instance_id, "deleting valkey instance");
    update_status(ctx, tables::VALKEY_INSTANCES, &instance_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete_instance(ctx, &instance_id).await {
        set_resource_failed(ctx, tables::VALKEY_INSTANCES, &instance_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete_instance(
    ctx: &dyn WorkflowContext,
    instance_id: &str,
) -> Result<(), OrchestrationError> {
    let instance = activities::get_valkey_instance_by_id(ctx, instance_id).await?;

    // An instance that never reached a shard has nothing on any node.
    if let Some(shard_id) = instance.shard_id.as_deref() {
        let nodes = activities::list_nodes_by_shard(ctx, shard_id).await?;

        let errors = fan_out_nodes(&nodes, |node| {
            let instance = &instance;
            async move {
                activities::delete_valkey_instance_on(ctx, &node.id, &instance.id, instance.port)
                    .await
            }
        })
        .await;

        if !errors.is_empty() {
            return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
        }
    }

    update_status(ctx, tables::VALKEY_INSTANCES, instance_id, ResourceStatus::Deleted).await?;
    Ok(())
}

/// `CreateValkeyUser` / `UpdateValkeyUser`: apply the ACL on every shard node
pub async fn apply_valkey_user(
    ctx: &dyn WorkflowContext,
    user_id: String,
) -> Result<(), OrchestrationError> {
    info!(user_id, "applying valkey user");
    update_status(ctx, tables::VALKEY_USERS, &user_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_apply_user(ctx, &user_id).await {
        set_resource_failed(ctx, tables::VALKEY_USERS, &user_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_apply_user(ctx: &dyn WorkflowContext, user_id: &str) -> Result<(), OrchestrationError> {
    let user = activities::get_valkey_user_by_id(ctx, user_id).await?;
    let instance = activities::get_valkey_instance_by_id(ctx, &user.instance_id).await?;
    let nodes = instance_nodes(ctx, &instance).await?;

    let errors = fan_out_nodes(&nodes, |node| {
        let user = &user;
        let port = instance.port;
        async move { activities::apply_valkey_user(ctx, &node.id, port, user).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::VALKEY_USERS, user_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteValkeyUser`
pub async fn delete_valkey_user(
    ctx: &dyn WorkflowContext,
    user_id: String,
) -> Result<(), OrchestrationError> {
    info!(user_id, "deleting valkey user");
    update_status(ctx, tables::VALKEY_USERS, &user_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete_user(ctx, &user_id).await {
        set_resource_failed(ctx, tables::VALKEY_USERS, &user_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete_user(ctx: &dyn WorkflowContext, user_id: &str) -> Result<(), OrchestrationError> {
    let user = activities::get_valkey_user_by_id(ctx, user_id).await?;
    let instance = activities::get_valkey_instance_by_id(ctx, &user.instance_id).await?;

    if let Some(shard_id) = instance.shard_id.as_deref() {
        let nodes = activities::list_nodes_by_shard(ctx, shard_id).await?;

        let errors = fan_out_nodes(&nodes, |node| {
            let username = user.username.as_str();
            let port = instance.port;
            async move { activities::remove_valkey_user(ctx, &node.id, port, username).await }
        })
        .await;

        if !errors.is_empty() {
            return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
        }
    }

    update_status(ctx, tables::VALKEY_USERS, user_id, ResourceStatus::Deleted).await?;
    Ok(())
}

/// `MigrateValkeyInstance`: dump on the source shard, import on the target,
/// recreate users, then cut over
pub async fn migrate_valkey_instance(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    params: MigrateValkeyInstanceParams,
) -> Result<(), OrchestrationError> {
    info!(
        instance_id = %params.instance_id,
        target_shard_id = %params.target_shard_id,
        "migrating valkey instance"
    );
    update_status(
        ctx,
        tables::VALKEY_INSTANCES,
        &params.instance_id,
        ResourceStatus::Provisioning,
    )
    .await?;

    if let Err(err) = run_migrate(ctx, config, &params).await {
        set_resource_failed(ctx, tables::VALKEY_INSTANCES, &params.instance_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_migrate(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    params: &MigrateValkeyInstanceParams,
) -> Result<(), OrchestrationError> {
    let instance = activities::get_valkey_instance_by_id(ctx, &params.instance_id).await?;

    let source_shard_id = instance
        .shard_id
        .as_deref()
        .ok_or_else(|| OrchestrationError::NoShard(instance.tenant_id.clone()))?;

    let source_nodes = activities::list_nodes_by_shard(ctx, source_shard_id).await?;
    let target_nodes = activities::list_nodes_by_shard(ctx, &params.target_shard_id).await?;

    let source = source_nodes.first().ok_or_else(|| {
        OrchestrationError::Validation(format!("source shard {source_shard_id} has no nodes"))
    })?;
    let target = target_nodes.first().ok_or_else(|| {
        OrchestrationError::Validation(format!(
            "target shard {} has no nodes",
            params.target_shard_id
        ))
    })?;

    let dump = ValkeyDumpInput {
        instance_id: instance.id.clone(),
        port: instance.port,
        dump_path: config.migrate_dump_path(&format!("{}.rdb", instance.id)),
    };

    activities::create_valkey_instance_on(ctx, &target.id, &instance).await?;
    activities::dump_valkey_data(ctx, &source.id, &dump).await?;
    activities::import_valkey_data(ctx, &target.id, &dump).await?;

    let users = activities::list_valkey_users_by_instance_id(ctx, &instance.id).await?;
    for user in &users {
        activities::apply_valkey_user(ctx, &target.id, instance.port, user).await?;
    }

    // Authoritative cut-over: from here, reads resolve to the target shard.
    activities::update_valkey_instance_shard_id(ctx, &instance.id, &params.target_shard_id).await?;

    best_effort_cleanup(ctx, &instance, source, target, &dump.dump_path).await;

    update_status(ctx, tables::VALKEY_INSTANCES, &params.instance_id, ResourceStatus::Active)
        .await?;
    Ok(())
}

async fn best_effort_cleanup(
    ctx: &dyn WorkflowContext,
    instance: &ValkeyInstance,
    source: &Node,
    target: &Node,
    dump_path: &str,
) {
    if let Err(e) =
        activities::delete_valkey_instance_on(ctx, &source.id, &instance.id, instance.port).await
    {
        warn!(node_id = %source.id, error = %e, "failed to remove source valkey instance");
    }
    for node in [source, target] {
        if let Err(e) = activities::cleanup_migrate_file(ctx, &node.id, dump_path).await {
            warn!(node_id = %node.id, error = %e, "failed to remove migration dump");
        }
    }
}
