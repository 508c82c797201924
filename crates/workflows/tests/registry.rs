//! Registry wiring tests: every public workflow name resolves to a handler
//! and workflows run end to end through the registry the way the engine
//! invokes them.

use std::sync::Arc;

use serde_json::json;

use hosting_contracts::activities::names;
use hosting_engine::testing::ScriptedContext;
use hosting_engine::WorkflowRegistry;
use hosting_workflows::{register_all, workflow_names, WorkflowConfig};

fn registry() -> WorkflowRegistry {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();

    let mut registry = WorkflowRegistry::new();
    register_all(&mut registry, Arc::new(WorkflowConfig::default()));
    registry
}

#[test]
fn every_public_workflow_is_registered() {
    let registry = registry();

    let expected = [
        workflow_names::CREATE_TENANT,
        workflow_names::UPDATE_TENANT,
        workflow_names::DELETE_TENANT,
        workflow_names::SUSPEND_TENANT,
        workflow_names::UNSUSPEND_TENANT,
        workflow_names::CREATE_WEBROOT,
        workflow_names::UPDATE_WEBROOT,
        workflow_names::DELETE_WEBROOT,
        workflow_names::BIND_FQDN,
        workflow_names::UNBIND_FQDN,
        workflow_names::PROVISION_LE_CERT,
        workflow_names::UPLOAD_CUSTOM_CERT,
        workflow_names::RENEW_LE_CERT,
        workflow_names::CLEANUP_EXPIRED_CERTS,
        workflow_names::CREATE_CRON_JOB,
        workflow_names::UPDATE_CRON_JOB,
        workflow_names::DELETE_CRON_JOB,
        workflow_names::ENABLE_CRON_JOB,
        workflow_names::DISABLE_CRON_JOB,
        workflow_names::CREATE_S3_BUCKET,
        workflow_names::UPDATE_S3_BUCKET,
        workflow_names::DELETE_S3_BUCKET,
        workflow_names::CREATE_VALKEY_INSTANCE,
        workflow_names::DELETE_VALKEY_INSTANCE,
        workflow_names::CREATE_VALKEY_USER,
        workflow_names::UPDATE_VALKEY_USER,
        workflow_names::DELETE_VALKEY_USER,
        workflow_names::MIGRATE_DATABASE,
        workflow_names::MIGRATE_VALKEY_INSTANCE,
        workflow_names::ADD_SFTP_KEY,
        workflow_names::REMOVE_SFTP_KEY,
        workflow_names::CREATE_WIREGUARD_PEER,
        workflow_names::DELETE_WIREGUARD_PEER,
        workflow_names::CREATE_ZONE,
        workflow_names::DELETE_ZONE,
        workflow_names::CREATE_ZONE_RECORD,
        workflow_names::UPDATE_ZONE_RECORD,
        workflow_names::DELETE_ZONE_RECORD,
        workflow_names::CREATE_EMAIL_ACCOUNT,
        workflow_names::DELETE_EMAIL_ACCOUNT,
        workflow_names::PROVISION_CLUSTER,
        workflow_names::DECOMMISSION_CLUSTER,
        workflow_names::CHECK_REPLICATION_HEALTH,
        workflow_names::CHECK_CEPHFS_HEALTH,
        workflow_names::COLLECT_RESOURCE_USAGE,
    ];

    for name in expected {
        assert!(registry.contains(name), "missing workflow: {name}");
    }
    assert_eq!(registry.len(), expected.len());
}

#[tokio::test]
async fn workflow_runs_through_registry() {
    let registry = registry();

    let ctx = Arc::new(ScriptedContext::new());
    ctx.respond(
        names::GET_ZONE_BY_ID,
        json!({
            "id": "z1",
            "tenant_id": "t1",
            "name": "example.com",
            "status": "pending",
        }),
    );

    registry
        .run(workflow_names::CREATE_ZONE, ctx.clone(), json!("z1"))
        .await
        .expect("CreateZone should succeed");

    assert_eq!(ctx.calls_of(names::CREATE_ZONE).len(), 1);
    let statuses = ctx.calls_of(names::UPDATE_RESOURCE_STATUS);
    assert_eq!(statuses.last().unwrap().input["status"], "active");
}

#[tokio::test]
async fn workflow_error_surfaces_code() {
    let registry = registry();

    let ctx = Arc::new(ScriptedContext::new());
    ctx.respond(
        names::GET_TENANT_CONTEXT,
        json!({
            "tenant": {
                "id": "t1",
                "cluster_id": "c1",
                "shard_id": null,
                "name": "acme",
                "uid": 10001,
                "sftp_enabled": false,
                "ssh_enabled": false,
                "quota_bytes": 0,
                "brand_id": null,
                "status": "pending",
            },
            "shard": null,
            "nodes": [],
        }),
    );

    let err = registry
        .run(workflow_names::CREATE_TENANT, ctx, json!("t1"))
        .await
        .unwrap_err();

    match err {
        hosting_engine::RegistryError::Workflow(wf) => {
            assert_eq!(wf.code.as_deref(), Some("no_shard"));
            assert_eq!(wf.message, "tenant t1 has no shard assigned");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn cron_workflow_accepts_null_input() {
    let registry = registry();

    let ctx = Arc::new(ScriptedContext::new());
    ctx.respond(names::GET_EXPIRING_LE_CERTS, json!([]));

    registry
        .run(workflow_names::RENEW_LE_CERT, ctx.clone(), json!(null))
        .await
        .expect("cron tick with null input should succeed");

    assert_eq!(
        ctx.calls_of(names::GET_EXPIRING_LE_CERTS)[0].input["within_days"],
        30
    );
}
