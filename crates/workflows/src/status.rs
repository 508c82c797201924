//! Status transitions and incident helpers
//!
//! Every resource workflow funnels its terminal outcomes through here:
//! status is the last field written on both success and failure paths, and
//! failures additionally raise a deduplicated incident. Incident-side
//! failures are logged and swallowed so they can never mask the original
//! workflow error.

use serde_json::json;
use tracing::warn;

use hosting_contracts::activities::{names, UpdateResourceStatusInput};
use hosting_contracts::{
    AutoResolveIncidentsInput, CreateIncidentParams, CreateIncidentResult, IncidentSeverity,
    ResourceStatus,
};
use hosting_engine::{ActivityError, WorkflowContext, WorkflowContextExt};

use crate::error::OrchestrationError;
use crate::primitives::{default_activity_options, truncate_chars, MAX_ERROR_CHARS};

/// Update an entity's status
pub async fn update_status(
    ctx: &dyn WorkflowContext,
    table: &str,
    id: &str,
    status: ResourceStatus,
) -> Result<(), ActivityError> {
    update_status_message(ctx, table, id, status, None).await
}

/// Update an entity's status with a status message
pub async fn update_status_message(
    ctx: &dyn WorkflowContext,
    table: &str,
    id: &str,
    status: ResourceStatus,
    status_message: Option<String>,
) -> Result<(), ActivityError> {
    ctx.activity(
        names::UPDATE_RESOURCE_STATUS,
        &UpdateResourceStatusInput {
            table: table.to_string(),
            id: id.to_string(),
            status,
            status_message,
        },
        default_activity_options(),
    )
    .await
}

/// Mark an entity failed and raise the provisioning-failed incident
///
/// The caller returns the original error afterwards; nothing raised here may
/// replace it, so both the status write and the incident are best-effort.
pub async fn set_resource_failed(
    ctx: &dyn WorkflowContext,
    table: &str,
    id: &str,
    err: &OrchestrationError,
) {
    let message = truncate_chars(&err.to_string(), MAX_ERROR_CHARS);

    if let Err(e) = update_status_message(
        ctx,
        table,
        id,
        ResourceStatus::Failed,
        Some(message.clone()),
    )
    .await
    {
        warn!(table, id, error = %e, "failed to mark resource as failed");
    }

    create_incident(
        ctx,
        CreateIncidentParams {
            dedupe_key: format!("provisioning_failed:{table}:{id}"),
            incident_type: "provisioning_failed".to_string(),
            severity: IncidentSeverity::Warning,
            title: format!("{table} provisioning failed"),
            detail: message,
            resource_type: Some(table.to_string()),
            resource_id: Some(id.to_string()),
            source: ctx.workflow_id().to_string(),
        },
    )
    .await;
}

/// Create a deduplicated incident, firing the webhook for new ones
///
/// `CreateIncident` is idempotent on the dedupe key; the webhook fires only
/// for the call that actually inserted the incident, and only at warning
/// severity or above. All failures are logged and swallowed.
pub async fn create_incident(ctx: &dyn WorkflowContext, params: CreateIncidentParams) {
    let severity = params.severity;
    let dedupe_key = params.dedupe_key.clone();

    let result: Result<CreateIncidentResult, ActivityError> = ctx
        .activity(names::CREATE_INCIDENT, &params, default_activity_options())
        .await;

    let incident = match result {
        Ok(incident) => incident,
        Err(e) => {
            warn!(dedupe_key, error = %e, "failed to create incident");
            return;
        }
    };

    if incident.created && severity >= IncidentSeverity::Warning {
        let webhook: Result<(), ActivityError> = ctx
            .activity(
                names::SEND_INCIDENT_WEBHOOK,
                &json!({ "incident_id": incident.id }),
                default_activity_options(),
            )
            .await;

        if let Err(e) = webhook {
            warn!(incident_id = %incident.id, error = %e, "failed to send incident webhook");
        }
    }
}

/// Resolve open incidents for a resource whose condition has cleared
///
/// Best-effort: called from health crons after recovery, never fails the
/// sweep.
pub async fn auto_resolve_incidents(
    ctx: &dyn WorkflowContext,
    resource_type: &str,
    resource_id: &str,
    type_prefix: &str,
    resolution: &str,
) {
    let result: Result<Option<u64>, ActivityError> = ctx
        .activity(
            names::AUTO_RESOLVE_INCIDENTS,
            &AutoResolveIncidentsInput {
                resource_type: resource_type.to_string(),
                resource_id: resource_id.to_string(),
                type_prefix: type_prefix.to_string(),
                resolution: resolution.to_string(),
            },
            default_activity_options(),
        )
        .await;

    match result {
        Ok(Some(resolved)) if resolved > 0 => {
            tracing::info!(resource_type, resource_id, resolved, "auto-resolved incidents");
        }
        Ok(_) => {}
        Err(e) => {
            warn!(resource_type, resource_id, error = %e, "failed to auto-resolve incidents");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hosting_contracts::tables;
    use hosting_engine::testing::ScriptedContext;

    #[tokio::test]
    async fn test_set_resource_failed_updates_status_and_raises_incident() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::CREATE_INCIDENT,
            json!({ "id": "i1", "created": true }),
        );

        let err = OrchestrationError::Validation("key does not match certificate".into());
        set_resource_failed(&ctx, tables::CERTIFICATES, "c9", &err).await;

        let types = ctx.activity_types();
        assert_eq!(
            types,
            vec![
                names::UPDATE_RESOURCE_STATUS,
                names::CREATE_INCIDENT,
                names::SEND_INCIDENT_WEBHOOK
            ]
        );

        let status = &ctx.calls_of(names::UPDATE_RESOURCE_STATUS)[0].input;
        assert_eq!(status["status"], "failed");
        assert!(status["status_message"].as_str().unwrap().contains("key does not match"));

        let incident = &ctx.calls_of(names::CREATE_INCIDENT)[0].input;
        assert_eq!(incident["dedupe_key"], "provisioning_failed:certificates:c9");
        assert_eq!(incident["severity"], "warning");
    }

    #[tokio::test]
    async fn test_set_resource_failed_swallows_incident_errors() {
        let ctx = ScriptedContext::new();
        ctx.fail(
            names::CREATE_INCIDENT,
            ActivityError::retryable("incident sink down"),
        );

        let err = OrchestrationError::NoShard("t1".into());
        // must not panic or surface the incident failure
        set_resource_failed(&ctx, tables::TENANTS, "t1", &err).await;

        assert_eq!(ctx.calls_of(names::SEND_INCIDENT_WEBHOOK).len(), 0);
    }

    #[tokio::test]
    async fn test_no_webhook_for_duplicate_incident() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::CREATE_INCIDENT,
            json!({ "id": "i1", "created": false }),
        );

        create_incident(
            &ctx,
            CreateIncidentParams {
                dedupe_key: "replication_broken:s1".into(),
                incident_type: "replication_broken".into(),
                severity: IncidentSeverity::Critical,
                title: "replication broken".into(),
                detail: "io thread stopped".into(),
                resource_type: Some(tables::SHARDS.into()),
                resource_id: Some("s1".into()),
                source: "CheckReplicationHealth".into(),
            },
        )
        .await;

        assert_eq!(ctx.calls_of(names::SEND_INCIDENT_WEBHOOK).len(), 0);
    }

    #[tokio::test]
    async fn test_no_webhook_for_info_severity() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::CREATE_INCIDENT,
            json!({ "id": "i2", "created": true }),
        );

        create_incident(
            &ctx,
            CreateIncidentParams {
                dedupe_key: "note:x".into(),
                incident_type: "note".into(),
                severity: IncidentSeverity::Info,
                title: "note".into(),
                detail: "".into(),
                resource_type: None,
                resource_id: None,
                source: "test".into(),
            },
        )
        .await;

        assert_eq!(ctx.calls_of(names::SEND_INCIDENT_WEBHOOK).len(), 0);
    }

    #[tokio::test]
    async fn test_auto_resolve_swallows_errors() {
        let ctx = ScriptedContext::new();
        ctx.fail(
            names::AUTO_RESOLVE_INCIDENTS,
            ActivityError::retryable("db down"),
        );

        auto_resolve_incidents(&ctx, tables::SHARDS, "s1", "replication_", "replica healthy").await;

        assert_eq!(ctx.calls_of(names::AUTO_RESOLVE_INCIDENTS).len(), 1);
    }
}
