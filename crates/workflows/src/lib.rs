//! # Hosting Control-Plane Workflows
//!
//! Durable orchestration procedures for the hosting platform, written
//! against the [`hosting_engine`] interface. Three families:
//!
//! - **Resource workflows** — per-entity provisioning/deletion following the
//!   shared shapes: flip status, read a composite context, guard the shard,
//!   fan activities out to the shard's nodes, settle status last.
//! - **Multi-step flows** — ACME HTTP-01 issuance, database/Valkey shard
//!   migration, cluster provisioning, FQDN binding with child issuance.
//! - **Health crons** — replication, CephFS, and usage sweeps that degrade,
//!   alert, and auto-recover resources.
//!
//! Everything here is replay-safe: ids come from the engine's side-effect
//! primitive, iteration follows input order, and all I/O goes through named
//! activities.

pub mod activities;
pub mod certificate;
pub mod cluster;
pub mod config;
pub mod cron_job;
pub mod database;
pub mod dns;
pub mod email;
pub mod error;
pub mod fqdn;
pub mod health;
pub mod primitives;
pub mod s3;
pub mod sftp;
pub mod status;
pub mod tenant;
#[cfg(test)]
pub(crate) mod testutil;
pub mod valkey;
pub mod webroot;
pub mod wireguard;

use std::sync::Arc;

use hosting_engine::{WorkflowError, WorkflowRegistry};

pub use config::WorkflowConfig;
pub use database::MigrateDatabaseParams;
pub use error::OrchestrationError;
pub use valkey::MigrateValkeyInstanceParams;

/// Workflow entry-point names
pub mod workflow_names {
    pub const CREATE_TENANT: &str = "CreateTenant";
    pub const UPDATE_TENANT: &str = "UpdateTenant";
    pub const DELETE_TENANT: &str = "DeleteTenant";
    pub const SUSPEND_TENANT: &str = "SuspendTenant";
    pub const UNSUSPEND_TENANT: &str = "UnsuspendTenant";

    pub const CREATE_WEBROOT: &str = "CreateWebroot";
    pub const UPDATE_WEBROOT: &str = "UpdateWebroot";
    pub const DELETE_WEBROOT: &str = "DeleteWebroot";

    pub const BIND_FQDN: &str = "BindFQDN";
    pub const UNBIND_FQDN: &str = "UnbindFQDN";

    pub const PROVISION_LE_CERT: &str = "ProvisionLECert";
    pub const UPLOAD_CUSTOM_CERT: &str = "UploadCustomCert";
    pub const RENEW_LE_CERT: &str = "RenewLECert";
    pub const CLEANUP_EXPIRED_CERTS: &str = "CleanupExpiredCerts";

    pub const CREATE_CRON_JOB: &str = "CreateCronJob";
    pub const UPDATE_CRON_JOB: &str = "UpdateCronJob";
    pub const DELETE_CRON_JOB: &str = "DeleteCronJob";
    pub const ENABLE_CRON_JOB: &str = "EnableCronJob";
    pub const DISABLE_CRON_JOB: &str = "DisableCronJob";

    pub const CREATE_S3_BUCKET: &str = "CreateS3Bucket";
    pub const UPDATE_S3_BUCKET: &str = "UpdateS3Bucket";
    pub const DELETE_S3_BUCKET: &str = "DeleteS3Bucket";

    pub const CREATE_VALKEY_INSTANCE: &str = "CreateValkeyInstance";
    pub const DELETE_VALKEY_INSTANCE: &str = "DeleteValkeyInstance";
    pub const CREATE_VALKEY_USER: &str = "CreateValkeyUser";
    pub const UPDATE_VALKEY_USER: &str = "UpdateValkeyUser";
    pub const DELETE_VALKEY_USER: &str = "DeleteValkeyUser";

    pub const MIGRATE_DATABASE: &str = "MigrateDatabase";
    pub const MIGRATE_VALKEY_INSTANCE: &str = "MigrateValkeyInstance";

    pub const ADD_SFTP_KEY: &str = "AddSFTPKey";
    pub const REMOVE_SFTP_KEY: &str = "RemoveSFTPKey";

    pub const CREATE_WIREGUARD_PEER: &str = "CreateWireGuardPeer";
    pub const DELETE_WIREGUARD_PEER: &str = "DeleteWireGuardPeer";

    pub const CREATE_ZONE: &str = "CreateZone";
    pub const DELETE_ZONE: &str = "DeleteZone";
    pub const CREATE_ZONE_RECORD: &str = "CreateZoneRecord";
    pub const UPDATE_ZONE_RECORD: &str = "UpdateZoneRecord";
    pub const DELETE_ZONE_RECORD: &str = "DeleteZoneRecord";

    pub const CREATE_EMAIL_ACCOUNT: &str = "CreateEmailAccount";
    pub const DELETE_EMAIL_ACCOUNT: &str = "DeleteEmailAccount";

    pub const PROVISION_CLUSTER: &str = "ProvisionCluster";
    pub const DECOMMISSION_CLUSTER: &str = "DecommissionCluster";

    /// Per-node bootstrap; implemented by the node-provisioning service and
    /// started here only as a child
    pub const PROVISION_NODE: &str = "ProvisionNode";

    pub const CHECK_REPLICATION_HEALTH: &str = "CheckReplicationHealth";
    pub const CHECK_CEPHFS_HEALTH: &str = "CheckCephFSHealth";
    pub const COLLECT_RESOURCE_USAGE: &str = "CollectResourceUsage";
}

/// Register every workflow entry point on a registry
///
/// The worker binary calls this once at startup and serves the registry on
/// the `hosting-tasks` queue.
pub fn register_all(registry: &mut WorkflowRegistry, config: Arc<WorkflowConfig>) {
    use workflow_names as names;

    registry.register_fn(names::CREATE_TENANT, |ctx, id: String| async move {
        tenant::create_tenant(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_TENANT, |ctx, id: String| async move {
        tenant::update_tenant(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_TENANT, |ctx, id: String| async move {
        tenant::delete_tenant(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::SUSPEND_TENANT, |ctx, id: String| async move {
        tenant::suspend_tenant(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UNSUSPEND_TENANT, |ctx, id: String| async move {
        tenant::unsuspend_tenant(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_WEBROOT, |ctx, id: String| async move {
        webroot::create_webroot(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_WEBROOT, |ctx, id: String| async move {
        webroot::update_webroot(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_WEBROOT, |ctx, id: String| async move {
        webroot::delete_webroot(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::BIND_FQDN, |ctx, id: String| async move {
        fqdn::bind_fqdn(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UNBIND_FQDN, |ctx, id: String| async move {
        fqdn::unbind_fqdn(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    let cfg = config.clone();
    registry.register_fn(names::PROVISION_LE_CERT, move |ctx, id: String| {
        let cfg = cfg.clone();
        async move {
            certificate::provision_le_cert(ctx.as_ref(), &cfg, id)
                .await
                .map_err(WorkflowError::from)
        }
    });
    registry.register_fn(names::UPLOAD_CUSTOM_CERT, |ctx, id: String| async move {
        certificate::upload_custom_cert(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    let cfg = config.clone();
    registry.register_fn(names::RENEW_LE_CERT, move |ctx, _: Option<()>| {
        let cfg = cfg.clone();
        async move {
            certificate::renew_le_certs(ctx.as_ref(), &cfg)
                .await
                .map_err(WorkflowError::from)
        }
    });
    let cfg = config.clone();
    registry.register_fn(names::CLEANUP_EXPIRED_CERTS, move |ctx, _: Option<()>| {
        let cfg = cfg.clone();
        async move {
            certificate::cleanup_expired_certs(ctx.as_ref(), &cfg)
                .await
                .map_err(WorkflowError::from)
        }
    });

    registry.register_fn(names::CREATE_CRON_JOB, |ctx, id: String| async move {
        cron_job::create_cron_job(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_CRON_JOB, |ctx, id: String| async move {
        cron_job::update_cron_job(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_CRON_JOB, |ctx, id: String| async move {
        cron_job::delete_cron_job(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::ENABLE_CRON_JOB, |ctx, id: String| async move {
        cron_job::set_cron_job_enabled(ctx.as_ref(), id, true)
            .await
            .map_err(WorkflowError::from)
    });
    registry.register_fn(names::DISABLE_CRON_JOB, |ctx, id: String| async move {
        cron_job::set_cron_job_enabled(ctx.as_ref(), id, false)
            .await
            .map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_S3_BUCKET, |ctx, id: String| async move {
        s3::create_s3_bucket(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_S3_BUCKET, |ctx, id: String| async move {
        s3::update_s3_bucket(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_S3_BUCKET, |ctx, id: String| async move {
        s3::delete_s3_bucket(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_VALKEY_INSTANCE, |ctx, id: String| async move {
        valkey::create_valkey_instance(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_VALKEY_INSTANCE, |ctx, id: String| async move {
        valkey::delete_valkey_instance(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::CREATE_VALKEY_USER, |ctx, id: String| async move {
        valkey::apply_valkey_user(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_VALKEY_USER, |ctx, id: String| async move {
        valkey::apply_valkey_user(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_VALKEY_USER, |ctx, id: String| async move {
        valkey::delete_valkey_user(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    let cfg = config.clone();
    registry.register_fn(
        names::MIGRATE_DATABASE,
        move |ctx, params: MigrateDatabaseParams| {
            let cfg = cfg.clone();
            async move {
                database::migrate_database(ctx.as_ref(), &cfg, params)
                    .await
                    .map_err(WorkflowError::from)
            }
        },
    );
    let cfg = config.clone();
    registry.register_fn(
        names::MIGRATE_VALKEY_INSTANCE,
        move |ctx, params: MigrateValkeyInstanceParams| {
            let cfg = cfg.clone();
            async move {
                valkey::migrate_valkey_instance(ctx.as_ref(), &cfg, params)
                    .await
                    .map_err(WorkflowError::from)
            }
        },
    );

    registry.register_fn(names::ADD_SFTP_KEY, |ctx, id: String| async move {
        sftp::add_sftp_key(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::REMOVE_SFTP_KEY, |ctx, id: String| async move {
        sftp::remove_sftp_key(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_WIREGUARD_PEER, |ctx, id: String| async move {
        wireguard::create_wireguard_peer(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_WIREGUARD_PEER, |ctx, id: String| async move {
        wireguard::delete_wireguard_peer(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_ZONE, |ctx, id: String| async move {
        dns::create_zone(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_ZONE, |ctx, id: String| async move {
        dns::delete_zone(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::CREATE_ZONE_RECORD, |ctx, id: String| async move {
        dns::create_zone_record(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::UPDATE_ZONE_RECORD, |ctx, id: String| async move {
        dns::update_zone_record(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_ZONE_RECORD, |ctx, id: String| async move {
        dns::delete_zone_record(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::CREATE_EMAIL_ACCOUNT, |ctx, id: String| async move {
        email::create_email_account(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DELETE_EMAIL_ACCOUNT, |ctx, id: String| async move {
        email::delete_email_account(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    registry.register_fn(names::PROVISION_CLUSTER, |ctx, id: String| async move {
        cluster::provision_cluster(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::DECOMMISSION_CLUSTER, |ctx, id: String| async move {
        cluster::decommission_cluster(ctx.as_ref(), id).await.map_err(WorkflowError::from)
    });

    let cfg = config.clone();
    registry.register_fn(names::CHECK_REPLICATION_HEALTH, move |ctx, _: Option<()>| {
        let cfg = cfg.clone();
        async move {
            health::check_replication_health(ctx.as_ref(), &cfg)
                .await
                .map_err(WorkflowError::from)
        }
    });
    registry.register_fn(names::CHECK_CEPHFS_HEALTH, |ctx, _: Option<()>| async move {
        health::check_cephfs_health(ctx.as_ref()).await.map_err(WorkflowError::from)
    });
    registry.register_fn(names::COLLECT_RESOURCE_USAGE, |ctx, _: Option<()>| async move {
        health::collect_resource_usage(ctx.as_ref()).await.map_err(WorkflowError::from)
    });
}
