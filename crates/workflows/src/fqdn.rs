//! FQDN bind/unbind workflows
//!
//! Binding puts DNS records, vhost config, and the LB map entry in place,
//! then (for SSL-enabled names) starts certificate issuance as a child.
//! The child's failure never fails the binding: the name serves over HTTP
//! and issuance can be retried out of band.

use serde_json::json;
use tracing::{info, warn};

use hosting_contracts::activities::SetLbMapEntryInput;
use hosting_contracts::{tables, FqdnContext, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::primitives::{child_workflow_id, fan_out_nodes, join_errors};
use crate::status::{set_resource_failed, update_status};
use crate::workflow_names;

fn require_shard(context: &FqdnContext) -> Result<(), OrchestrationError> {
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }
    Ok(())
}

/// `BindFQDN`: DNS, vhost fan-out, LB routing, optional LE child
pub async fn bind_fqdn(
    ctx: &dyn WorkflowContext,
    fqdn_id: String,
) -> Result<(), OrchestrationError> {
    info!(fqdn_id, "binding fqdn");
    update_status(ctx, tables::FQDNS, &fqdn_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_bind(ctx, &fqdn_id).await {
        set_resource_failed(ctx, tables::FQDNS, &fqdn_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_bind(ctx: &dyn WorkflowContext, fqdn_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_fqdn_context(ctx, fqdn_id).await?;
    require_shard(&context)?;

    let webroot = context.webroot.as_ref().ok_or_else(|| {
        OrchestrationError::Validation(format!("fqdn {fqdn_id} is not bound to a webroot"))
    })?;

    activities::ensure_fqdn_dns_records(ctx, &context.fqdn.fqdn).await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let fqdn = &context.fqdn;
        let tenant_id = context.tenant.id.as_str();
        async move { activities::configure_vhost(ctx, &node.id, fqdn, tenant_id, webroot).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    if let Some(backend) = &context.lb_backend {
        activities::set_lb_map_entry(
            ctx,
            &SetLbMapEntryInput {
                fqdn: context.fqdn.fqdn.clone(),
                backend: backend.clone(),
            },
        )
        .await?;
    }

    if context.fqdn.ssl_enabled {
        let child_id = child_workflow_id("provision", "le-cert", fqdn_id);
        let result = ctx
            .start_child_workflow(hosting_engine::ChildWorkflowRequest {
                workflow_id: child_id.clone(),
                workflow_type: workflow_names::PROVISION_LE_CERT.to_string(),
                input: json!(fqdn_id),
            })
            .await;

        // The FQDN is reachable over HTTP either way; issuance retries are
        // cheap and triggered out of band.
        if let Err(e) = result {
            warn!(fqdn_id, child_id, error = %e, "certificate child workflow failed");
        }
    }

    update_status(ctx, tables::FQDNS, fqdn_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `UnbindFQDN`: remove LB routing, vhost config, and DNS records
pub async fn unbind_fqdn(
    ctx: &dyn WorkflowContext,
    fqdn_id: String,
) -> Result<(), OrchestrationError> {
    info!(fqdn_id, "unbinding fqdn");
    update_status(ctx, tables::FQDNS, &fqdn_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_unbind(ctx, &fqdn_id).await {
        set_resource_failed(ctx, tables::FQDNS, &fqdn_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_unbind(ctx: &dyn WorkflowContext, fqdn_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_fqdn_context(ctx, fqdn_id).await?;

    // External-side cleanup runs even for a tenant that lost its shard.
    activities::remove_lb_map_entry(ctx, &context.fqdn.fqdn).await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let name = context.fqdn.fqdn.as_str();
        async move { activities::remove_vhost(ctx, &node.id, name).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    activities::remove_fqdn_dns_records(ctx, &context.fqdn.fqdn).await?;

    update_status(ctx, tables::FQDNS, fqdn_id, ResourceStatus::Deleted).await?;
    Ok(())
}
