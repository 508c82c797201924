//! Certificate workflows
//!
//! `ProvisionLECert` drives ACME HTTP-01 issuance end to end: order,
//! challenges placed under each node's webroot, acceptance, finalization,
//! install, activation. Challenge files are written from the workflow via
//! activities rather than cached in workflow state, keeping PEM material out
//! of workflow history. Cleanup is best-effort: once the order is finalized,
//! stale challenge files are harmless and get overwritten on the next
//! attempt.

use serde_json::json;
use tracing::{info, warn};

use hosting_contracts::activities::{
    CleanupHttp01ChallengeInput, Http01Challenge, InstallCertificateInput,
    PlaceHttp01ChallengeInput, StoreCertificateInput,
};
use hosting_contracts::{tables, CertificateType, FqdnContext, Node, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::config::WorkflowConfig;
use crate::error::OrchestrationError;
use crate::primitives::{
    child_workflow_id, fan_out_child_workflows, fan_out_nodes, join_errors, new_deterministic_id,
    ChildSpec,
};
use crate::status::{set_resource_failed, update_status};
use crate::workflow_names;

/// `ProvisionLECert`: issue and activate a Let's Encrypt certificate for an
/// FQDN
pub async fn provision_le_cert(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    fqdn_id: String,
) -> Result<(), OrchestrationError> {
    info!(fqdn_id, "provisioning lets encrypt certificate");

    let context = activities::get_fqdn_context(ctx, &fqdn_id).await?;
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }

    let cert_id = new_deterministic_id(ctx).await;
    activities::create_certificate(ctx, &cert_id, &fqdn_id, CertificateType::LetsEncrypt).await?;
    update_status(ctx, tables::CERTIFICATES, &cert_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_issuance(ctx, config, &context, &cert_id).await {
        set_resource_failed(ctx, tables::CERTIFICATES, &cert_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_issuance(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    context: &FqdnContext,
    cert_id: &str,
) -> Result<(), OrchestrationError> {
    let fqdn = &context.fqdn;
    let webroot = context.webroot.as_ref().ok_or_else(|| {
        OrchestrationError::Validation(format!("fqdn {} is not bound to a webroot", fqdn.id))
    })?;

    let webroot_path =
        config.webroot_public_path(&context.tenant.id, &webroot.name, &webroot.public_folder);

    let order = activities::create_order(ctx, &fqdn.fqdn).await?;

    // Tokens are cached here so cleanup never has to re-fetch an
    // authorization that may already be gone.
    let mut challenges: Vec<Http01Challenge> = Vec::new();

    for authz_url in &order.authz_urls {
        let challenge =
            activities::get_http01_challenge(ctx, authz_url, &order.account_key).await?;
        challenges.push(challenge.clone());

        let errors = fan_out_nodes(&context.nodes, |node| {
            let input = PlaceHttp01ChallengeInput {
                webroot_path: webroot_path.clone(),
                token: challenge.token.clone(),
                key_auth: challenge.key_auth.clone(),
            };
            async move { activities::place_http01_challenge(ctx, &node.id, &input).await }
        })
        .await;

        if !errors.is_empty() {
            cleanup_challenges(ctx, &context.nodes, &webroot_path, &challenges).await;
            return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
        }

        if let Err(e) =
            activities::accept_challenge(ctx, &challenge.challenge_url, &order.account_key).await
        {
            cleanup_challenges(ctx, &context.nodes, &webroot_path, &challenges).await;
            return Err(e.into());
        }
    }

    let issued =
        activities::finalize_order(ctx, &order.order_url, &fqdn.fqdn, &order.account_key).await?;

    cleanup_challenges(ctx, &context.nodes, &webroot_path, &challenges).await;

    activities::store_certificate(
        ctx,
        &StoreCertificateInput {
            id: cert_id.to_string(),
            cert_pem: issued.cert_pem.clone(),
            key_pem: issued.key_pem.clone(),
            chain_pem: issued.chain_pem.clone(),
            issued_at: issued.issued_at,
            expires_at: issued.expires_at,
        },
    )
    .await?;

    let errors = fan_out_nodes(&context.nodes, |node| {
        let input = InstallCertificateInput {
            fqdn: fqdn.fqdn.clone(),
            cert_pem: issued.cert_pem.clone(),
            key_pem: issued.key_pem.clone(),
            chain_pem: issued.chain_pem.clone(),
        };
        async move { activities::install_certificate(ctx, &node.id, &input).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    activate(ctx, &fqdn.id, cert_id).await
}

/// Deactivate-then-activate keeps "at most one active per FQDN" across
/// concurrent provisions; the deactivation is an atomic DB operation.
async fn activate(
    ctx: &dyn WorkflowContext,
    fqdn_id: &str,
    cert_id: &str,
) -> Result<(), OrchestrationError> {
    activities::deactivate_other_certs(ctx, fqdn_id, cert_id).await?;
    activities::activate_certificate(ctx, cert_id).await?;
    update_status(ctx, tables::CERTIFICATES, cert_id, ResourceStatus::Active).await?;
    Ok(())
}

/// Best-effort challenge file removal; failures are logged and ignored
async fn cleanup_challenges(
    ctx: &dyn WorkflowContext,
    nodes: &[Node],
    webroot_path: &str,
    challenges: &[Http01Challenge],
) {
    for challenge in challenges {
        for node in nodes {
            let input = CleanupHttp01ChallengeInput {
                webroot_path: webroot_path.to_string(),
                token: challenge.token.clone(),
            };
            if let Err(e) = activities::cleanup_http01_challenge(ctx, &node.id, &input).await {
                warn!(node_id = %node.id, token = %challenge.token, error = %e,
                    "failed to clean up http-01 challenge file");
            }
        }
    }
}

/// `UploadCustomCert`: validate uploaded material, install, and activate
pub async fn upload_custom_cert(
    ctx: &dyn WorkflowContext,
    cert_id: String,
) -> Result<(), OrchestrationError> {
    info!(cert_id, "uploading custom certificate");
    update_status(ctx, tables::CERTIFICATES, &cert_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_upload(ctx, &cert_id).await {
        set_resource_failed(ctx, tables::CERTIFICATES, &cert_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_upload(ctx: &dyn WorkflowContext, cert_id: &str) -> Result<(), OrchestrationError> {
    let cert = activities::get_certificate_by_id(ctx, cert_id).await?;

    let (cert_pem, key_pem) = match (&cert.cert_pem, &cert.key_pem) {
        (Some(cert_pem), Some(key_pem)) => (cert_pem.clone(), key_pem.clone()),
        _ => {
            return Err(OrchestrationError::Validation(format!(
                "certificate {cert_id} has no PEM material"
            )))
        }
    };

    activities::validate_custom_cert(ctx, &cert_pem, &key_pem)
        .await
        .map_err(|e| OrchestrationError::Validation(e.message))?;

    let context = activities::get_fqdn_context(ctx, &cert.fqdn_id).await?;
    if context.tenant.shard_id.is_none() {
        return Err(OrchestrationError::NoShard(context.tenant.id.clone()));
    }

    let chain_pem = cert.chain_pem.clone().unwrap_or_default();
    let errors = fan_out_nodes(&context.nodes, |node| {
        let input = InstallCertificateInput {
            fqdn: context.fqdn.fqdn.clone(),
            cert_pem: cert_pem.clone(),
            key_pem: key_pem.clone(),
            chain_pem: chain_pem.clone(),
        };
        async move { activities::install_certificate(ctx, &node.id, &input).await }
    })
    .await;

    if !errors.is_empty() {
        return Err(OrchestrationError::PartialFanOut(join_errors(&errors)));
    }

    activate(ctx, &cert.fqdn_id, cert_id).await
}

/// `RenewLECert` (cron): start a renewal child for every certificate close
/// to expiry
///
/// Per-certificate failures are logged; the sweep itself succeeds as long as
/// enumeration worked.
pub async fn renew_le_certs(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
) -> Result<(), OrchestrationError> {
    let expiring = activities::get_expiring_le_certs(ctx, config.renewal_window_days).await?;
    info!(count = expiring.len(), "renewing expiring certificates");

    if expiring.is_empty() {
        return Ok(());
    }

    let children = expiring
        .iter()
        .map(|cert| ChildSpec {
            workflow_type: workflow_names::PROVISION_LE_CERT.to_string(),
            workflow_id: child_workflow_id("renew", "le-cert", &cert.id),
            input: json!(cert.fqdn_id),
        })
        .collect();

    let errors = fan_out_child_workflows(ctx, children).await;
    for error in errors {
        warn!(error, "certificate renewal failed");
    }

    Ok(())
}

/// `CleanupExpiredCerts` (cron): delete certificate records long past expiry
pub async fn cleanup_expired_certs(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
) -> Result<(), OrchestrationError> {
    let expired = activities::get_expired_certs(ctx, config.expired_cert_retention_days).await?;
    info!(count = expired.len(), "cleaning up expired certificates");

    for cert in &expired {
        if let Err(e) = activities::delete_certificate(ctx, &cert.id).await {
            warn!(certificate_id = %cert.id, error = %e, "failed to delete expired certificate");
        }
    }

    Ok(())
}
