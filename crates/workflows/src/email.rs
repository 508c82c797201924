//! Email account workflows
//!
//! Mailboxes live on the external mail backend; no shard or node dispatch is
//! involved, so deletion runs its external cleanup even for tenants that
//! never got a shard.

use tracing::info;

use hosting_contracts::{tables, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::status::{set_resource_failed, update_status};

/// `CreateEmailAccount`: ensure the domain exists on the backend, then the
/// mailbox
pub async fn create_email_account(
    ctx: &dyn WorkflowContext,
    account_id: String,
) -> Result<(), OrchestrationError> {
    info!(account_id, "creating email account");
    update_status(ctx, tables::EMAIL_ACCOUNTS, &account_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_create(ctx, &account_id).await {
        set_resource_failed(ctx, tables::EMAIL_ACCOUNTS, &account_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create(ctx: &dyn WorkflowContext, account_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_email_account_context(ctx, account_id).await?;

    let domain = context.account.domain().ok_or_else(|| {
        OrchestrationError::Validation(format!(
            "email address {} has no domain part",
            context.account.address
        ))
    })?;

    activities::ensure_mail_domain(ctx, domain).await?;
    activities::create_mail_account(ctx, &context.account).await?;

    update_status(ctx, tables::EMAIL_ACCOUNTS, account_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteEmailAccount`
pub async fn delete_email_account(
    ctx: &dyn WorkflowContext,
    account_id: String,
) -> Result<(), OrchestrationError> {
    info!(account_id, "deleting email account");
    update_status(ctx, tables::EMAIL_ACCOUNTS, &account_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &account_id).await {
        set_resource_failed(ctx, tables::EMAIL_ACCOUNTS, &account_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, account_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_email_account_context(ctx, account_id).await?;

    activities::delete_mail_account(ctx, &context.account.address).await?;

    update_status(ctx, tables::EMAIL_ACCOUNTS, account_id, ResourceStatus::Deleted).await?;
    Ok(())
}
