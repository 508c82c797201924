//! SFTP key workflows

use tracing::info;

use hosting_contracts::{tables, ResourceStatus, SftpKeyContext};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};

fn require_shard(context: &SftpKeyContext) -> Result<(), OrchestrationError> {
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }
    Ok(())
}

/// `AddSFTPKey`: write the key into the tenant account on every shard node
pub async fn add_sftp_key(
    ctx: &dyn WorkflowContext,
    key_id: String,
) -> Result<(), OrchestrationError> {
    info!(key_id, "adding sftp key");
    update_status(ctx, tables::SFTP_KEYS, &key_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_add(ctx, &key_id).await {
        set_resource_failed(ctx, tables::SFTP_KEYS, &key_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_add(ctx: &dyn WorkflowContext, key_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_sftp_key_context(ctx, key_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant = &context.tenant;
        let public_key = context.key.public_key.as_str();
        async move {
            activities::write_authorized_key(ctx, &node.id, &tenant.id, tenant.uid, public_key)
                .await
        }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::SFTP_KEYS, key_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `RemoveSFTPKey`
pub async fn remove_sftp_key(
    ctx: &dyn WorkflowContext,
    key_id: String,
) -> Result<(), OrchestrationError> {
    info!(key_id, "removing sftp key");
    update_status(ctx, tables::SFTP_KEYS, &key_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_remove(ctx, &key_id).await {
        set_resource_failed(ctx, tables::SFTP_KEYS, &key_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_remove(ctx: &dyn WorkflowContext, key_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_sftp_key_context(ctx, key_id).await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant = &context.tenant;
        let public_key = context.key.public_key.as_str();
        async move {
            activities::remove_authorized_key(ctx, &node.id, &tenant.id, tenant.uid, public_key)
                .await
        }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::SFTP_KEYS, key_id, ResourceStatus::Deleted).await?;
    Ok(())
}
