//! Tenant lifecycle workflows
//!
//! Create fans the tenant unit out to every shard node, then launches child
//! workflows for dependent entities the API left in `pending`. Suspend and
//! unsuspend are the only workflows that touch the `suspended` state.

use serde_json::json;
use tracing::{info, warn};

use hosting_contracts::{tables, ResourceStatus, TenantContext};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{
    child_workflow_id, fan_out_child_workflows, fan_out_nodes, join_errors, ChildSpec,
};
use crate::status::{set_resource_failed, update_status};
use crate::workflow_names;

/// Guard: a tenant context without a shard cannot be provisioned
fn require_shard(context: &TenantContext) -> Result<(), OrchestrationError> {
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }
    Ok(())
}

/// `CreateTenant`: provision the tenant on its shard and start children for
/// pending dependents
pub async fn create_tenant(
    ctx: &dyn WorkflowContext,
    tenant_id: String,
) -> Result<(), OrchestrationError> {
    info!(tenant_id, "creating tenant");
    update_status(ctx, tables::TENANTS, &tenant_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_create(ctx, &tenant_id).await {
        set_resource_failed(ctx, tables::TENANTS, &tenant_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create(ctx: &dyn WorkflowContext, tenant_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_tenant_context(ctx, tenant_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant = &context.tenant;
        async move { activities::provision_tenant_unit(ctx, &node.id, tenant).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    spawn_pending_children(ctx, tenant_id).await?;

    update_status(ctx, tables::TENANTS, tenant_id, ResourceStatus::Active).await?;
    Ok(())
}

/// Start children for webroots and email accounts created alongside the
/// tenant. A child failure is recorded on the child's own entity and does
/// not fail the tenant.
async fn spawn_pending_children(
    ctx: &dyn WorkflowContext,
    tenant_id: &str,
) -> Result<(), OrchestrationError> {
    let webroots = activities::list_pending_webroots(ctx, tenant_id).await?;
    let accounts = activities::list_pending_email_accounts(ctx, tenant_id).await?;

    let mut children = Vec::new();
    for webroot in &webroots {
        children.push(ChildSpec {
            workflow_type: workflow_names::CREATE_WEBROOT.to_string(),
            workflow_id: child_workflow_id("create", "webroot", &webroot.id),
            input: json!(webroot.id),
        });
    }
    for account in &accounts {
        children.push(ChildSpec {
            workflow_type: workflow_names::CREATE_EMAIL_ACCOUNT.to_string(),
            workflow_id: child_workflow_id("create", "email-account", &account.id),
            input: json!(account.id),
        });
    }

    if children.is_empty() {
        return Ok(());
    }

    let errors = fan_out_child_workflows(ctx, children).await;
    for error in errors {
        warn!(tenant_id, error, "dependent child workflow failed");
    }

    Ok(())
}

/// `UpdateTenant`: re-converge node units (quota, ssh/sftp flags)
pub async fn update_tenant(
    ctx: &dyn WorkflowContext,
    tenant_id: String,
) -> Result<(), OrchestrationError> {
    info!(tenant_id, "updating tenant");
    update_status(ctx, tables::TENANTS, &tenant_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_update(ctx, &tenant_id).await {
        set_resource_failed(ctx, tables::TENANTS, &tenant_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_update(ctx: &dyn WorkflowContext, tenant_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_tenant_context(ctx, tenant_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant = &context.tenant;
        async move { activities::converge_tenant_unit(ctx, &node.id, tenant).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::TENANTS, tenant_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteTenant`: remove node units where a shard exists; the record is
/// marked deleted either way
pub async fn delete_tenant(
    ctx: &dyn WorkflowContext,
    tenant_id: String,
) -> Result<(), OrchestrationError> {
    info!(tenant_id, "deleting tenant");
    update_status(ctx, tables::TENANTS, &tenant_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &tenant_id).await {
        set_resource_failed(ctx, tables::TENANTS, &tenant_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, tenant_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_tenant_context(ctx, tenant_id).await?;

    // No shard guard here: a never-provisioned tenant still gets its record
    // reclaimed, and node cleanup simply has nothing to do.
    let errors = fan_out_nodes(&context.nodes, |node| {
        let tenant = &context.tenant;
        async move {
            activities::remove_tenant_unit(ctx, &node.id, &tenant.id, tenant.uid).await
        }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::TENANTS, tenant_id, ResourceStatus::Deleted).await?;
    Ok(())
}

/// `SuspendTenant`: disable login and serving on every shard node
pub async fn suspend_tenant(
    ctx: &dyn WorkflowContext,
    tenant_id: String,
) -> Result<(), OrchestrationError> {
    info!(tenant_id, "suspending tenant");
    update_status(ctx, tables::TENANTS, &tenant_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_suspend(ctx, &tenant_id).await {
        set_resource_failed(ctx, tables::TENANTS, &tenant_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_suspend(ctx: &dyn WorkflowContext, tenant_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_tenant_context(ctx, tenant_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| async move {
        activities::suspend_tenant_unit(ctx, &node.id, tenant_id).await
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::TENANTS, tenant_id, ResourceStatus::Suspended).await?;
    Ok(())
}

/// `UnsuspendTenant`: restore login and serving, back to `active`
pub async fn unsuspend_tenant(
    ctx: &dyn WorkflowContext,
    tenant_id: String,
) -> Result<(), OrchestrationError> {
    info!(tenant_id, "unsuspending tenant");
    update_status(ctx, tables::TENANTS, &tenant_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_unsuspend(ctx, &tenant_id).await {
        set_resource_failed(ctx, tables::TENANTS, &tenant_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_unsuspend(
    ctx: &dyn WorkflowContext,
    tenant_id: &str,
) -> Result<(), OrchestrationError> {
    let context = activities::get_tenant_context(ctx, tenant_id).await?;
    require_shard(&context)?;

    let errors = fan_out_nodes(&context.nodes, |node| async move {
        activities::unsuspend_tenant_unit(ctx, &node.id, tenant_id).await
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    update_status(ctx, tables::TENANTS, tenant_id, ResourceStatus::Active).await?;
    Ok(())
}
