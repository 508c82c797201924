//! Typed activity calls
//!
//! Thin wrappers pairing each activity name with its payload shape and
//! execution options. Orchestration-level calls run on the default queue
//! with the 30s preset; node verbs are routed to `node-<id>` queues; data
//! movement uses the long preset.

use std::time::Duration;

use serde_json::json;

use hosting_contracts::activities::{
    names, AcmeOrder, CephFsMountStatus, CleanupHttp01ChallengeInput, ContainerInfo,
    CreateContainerInput, CreateInfrastructureServiceInput, CreateNodeInput, CreateShardInput,
    ExpiringCert, Http01Challenge, InstallCertificateInput, IssuedCertificate, MySqlDumpInput,
    PlaceHttp01ChallengeInput, ResourceUsageEntry, ReplicationStatus, SelectedHost,
    SetLbMapEntryInput, StoreCertificateInput, ValkeyDumpInput,
};
use hosting_contracts::{
    Certificate, CertificateType, CronJob, ClusterContext, CronJobContext, Database, DatabaseUser,
    EmailAccount, EmailAccountContext, Fqdn, FqdnContext, InfraServiceType, InfrastructureService,
    Node, S3BucketContext, SftpKeyContext, Shard, ShardRole, Tenant, TenantContext, ValkeyInstance,
    ValkeyUser, Webroot, WebrootContext, WireGuardPeer, WireGuardPeerContext, Zone, ZoneRecord,
};
use hosting_engine::{ActivityError, WorkflowContext, WorkflowContextExt};

use crate::primitives::{default_activity_options, long_activity_options, node_activity_options};

type Result<T> = std::result::Result<T, ActivityError>;

// ============================================================================
// Core-DB reads
// ============================================================================

pub async fn get_tenant_context(ctx: &dyn WorkflowContext, tenant_id: &str) -> Result<TenantContext> {
    ctx.activity(
        names::GET_TENANT_CONTEXT,
        &json!({ "tenant_id": tenant_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_webroot_context(
    ctx: &dyn WorkflowContext,
    webroot_id: &str,
) -> Result<WebrootContext> {
    ctx.activity(
        names::GET_WEBROOT_CONTEXT,
        &json!({ "webroot_id": webroot_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_fqdn_context(ctx: &dyn WorkflowContext, fqdn_id: &str) -> Result<FqdnContext> {
    ctx.activity(
        names::GET_FQDN_CONTEXT,
        &json!({ "fqdn_id": fqdn_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_cron_job_context(
    ctx: &dyn WorkflowContext,
    cron_job_id: &str,
) -> Result<CronJobContext> {
    ctx.activity(
        names::GET_CRON_JOB_CONTEXT,
        &json!({ "cron_job_id": cron_job_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_sftp_key_context(ctx: &dyn WorkflowContext, key_id: &str) -> Result<SftpKeyContext> {
    ctx.activity(
        names::GET_SFTP_KEY_CONTEXT,
        &json!({ "key_id": key_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_wireguard_peer_context(
    ctx: &dyn WorkflowContext,
    peer_id: &str,
) -> Result<WireGuardPeerContext> {
    ctx.activity(
        names::GET_WIREGUARD_PEER_CONTEXT,
        &json!({ "peer_id": peer_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_s3_bucket_context(
    ctx: &dyn WorkflowContext,
    bucket_id: &str,
) -> Result<S3BucketContext> {
    ctx.activity(
        names::GET_S3_BUCKET_CONTEXT,
        &json!({ "bucket_id": bucket_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_email_account_context(
    ctx: &dyn WorkflowContext,
    account_id: &str,
) -> Result<EmailAccountContext> {
    ctx.activity(
        names::GET_EMAIL_ACCOUNT_CONTEXT,
        &json!({ "account_id": account_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_cluster_context(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
) -> Result<ClusterContext> {
    ctx.activity(
        names::GET_CLUSTER_CONTEXT,
        &json!({ "cluster_id": cluster_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_certificate_by_id(
    ctx: &dyn WorkflowContext,
    certificate_id: &str,
) -> Result<Certificate> {
    ctx.activity(
        names::GET_CERTIFICATE_BY_ID,
        &json!({ "certificate_id": certificate_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_database_by_id(ctx: &dyn WorkflowContext, database_id: &str) -> Result<Database> {
    ctx.activity(
        names::GET_DATABASE_BY_ID,
        &json!({ "database_id": database_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_valkey_instance_by_id(
    ctx: &dyn WorkflowContext,
    instance_id: &str,
) -> Result<ValkeyInstance> {
    ctx.activity(
        names::GET_VALKEY_INSTANCE_BY_ID,
        &json!({ "instance_id": instance_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_valkey_user_by_id(ctx: &dyn WorkflowContext, user_id: &str) -> Result<ValkeyUser> {
    ctx.activity(
        names::GET_VALKEY_USER_BY_ID,
        &json!({ "user_id": user_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_zone_by_id(ctx: &dyn WorkflowContext, zone_id: &str) -> Result<Zone> {
    ctx.activity(
        names::GET_ZONE_BY_ID,
        &json!({ "zone_id": zone_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_zone_record_by_id(
    ctx: &dyn WorkflowContext,
    record_id: &str,
) -> Result<ZoneRecord> {
    ctx.activity(
        names::GET_ZONE_RECORD_BY_ID,
        &json!({ "record_id": record_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_nodes_by_shard(ctx: &dyn WorkflowContext, shard_id: &str) -> Result<Vec<Node>> {
    ctx.activity(
        names::LIST_NODES_BY_SHARD,
        &json!({ "shard_id": shard_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_nodes_by_cluster(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
) -> Result<Vec<Node>> {
    ctx.activity(
        names::LIST_NODES_BY_CLUSTER,
        &json!({ "cluster_id": cluster_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_shards_by_role(ctx: &dyn WorkflowContext, role: ShardRole) -> Result<Vec<Shard>> {
    ctx.activity(
        names::LIST_SHARDS_BY_ROLE,
        &json!({ "role": role }),
        default_activity_options(),
    )
    .await
}

pub async fn list_database_users_by_database_id(
    ctx: &dyn WorkflowContext,
    database_id: &str,
) -> Result<Vec<DatabaseUser>> {
    ctx.activity(
        names::LIST_DATABASE_USERS_BY_DATABASE_ID,
        &json!({ "database_id": database_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_valkey_users_by_instance_id(
    ctx: &dyn WorkflowContext,
    instance_id: &str,
) -> Result<Vec<ValkeyUser>> {
    ctx.activity(
        names::LIST_VALKEY_USERS_BY_INSTANCE_ID,
        &json!({ "instance_id": instance_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_pending_webroots(
    ctx: &dyn WorkflowContext,
    tenant_id: &str,
) -> Result<Vec<Webroot>> {
    ctx.activity(
        names::LIST_PENDING_WEBROOTS,
        &json!({ "tenant_id": tenant_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_pending_email_accounts(
    ctx: &dyn WorkflowContext,
    tenant_id: &str,
) -> Result<Vec<EmailAccount>> {
    ctx.activity(
        names::LIST_PENDING_EMAIL_ACCOUNTS,
        &json!({ "tenant_id": tenant_id }),
        default_activity_options(),
    )
    .await
}

pub async fn list_infrastructure_services(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
) -> Result<Vec<InfrastructureService>> {
    ctx.activity(
        names::LIST_INFRASTRUCTURE_SERVICES,
        &json!({ "cluster_id": cluster_id }),
        default_activity_options(),
    )
    .await
}

pub async fn get_expiring_le_certs(
    ctx: &dyn WorkflowContext,
    within_days: u32,
) -> Result<Vec<ExpiringCert>> {
    ctx.activity(
        names::GET_EXPIRING_LE_CERTS,
        &json!({ "within_days": within_days }),
        default_activity_options(),
    )
    .await
}

pub async fn get_expired_certs(
    ctx: &dyn WorkflowContext,
    expired_for_days: u32,
) -> Result<Vec<ExpiringCert>> {
    ctx.activity(
        names::GET_EXPIRED_CERTS,
        &json!({ "expired_for_days": expired_for_days }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// Core-DB writes
// ============================================================================

pub async fn create_certificate(
    ctx: &dyn WorkflowContext,
    id: &str,
    fqdn_id: &str,
    cert_type: CertificateType,
) -> Result<()> {
    ctx.activity(
        names::CREATE_CERTIFICATE,
        &json!({ "id": id, "fqdn_id": fqdn_id, "type": cert_type }),
        default_activity_options(),
    )
    .await
}

pub async fn store_certificate(
    ctx: &dyn WorkflowContext,
    input: &StoreCertificateInput,
) -> Result<()> {
    ctx.activity(names::STORE_CERTIFICATE, input, default_activity_options())
        .await
}

pub async fn deactivate_other_certs(
    ctx: &dyn WorkflowContext,
    fqdn_id: &str,
    keep_certificate_id: &str,
) -> Result<()> {
    ctx.activity(
        names::DEACTIVATE_OTHER_CERTS,
        &json!({ "fqdn_id": fqdn_id, "keep_certificate_id": keep_certificate_id }),
        default_activity_options(),
    )
    .await
}

pub async fn activate_certificate(ctx: &dyn WorkflowContext, certificate_id: &str) -> Result<()> {
    ctx.activity(
        names::ACTIVATE_CERTIFICATE,
        &json!({ "certificate_id": certificate_id }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_certificate(ctx: &dyn WorkflowContext, certificate_id: &str) -> Result<()> {
    ctx.activity(
        names::DELETE_CERTIFICATE,
        &json!({ "certificate_id": certificate_id }),
        default_activity_options(),
    )
    .await
}

pub async fn update_database_shard_id(
    ctx: &dyn WorkflowContext,
    database_id: &str,
    shard_id: &str,
) -> Result<()> {
    ctx.activity(
        names::UPDATE_DATABASE_SHARD_ID,
        &json!({ "database_id": database_id, "shard_id": shard_id }),
        default_activity_options(),
    )
    .await
}

pub async fn update_valkey_instance_shard_id(
    ctx: &dyn WorkflowContext,
    instance_id: &str,
    shard_id: &str,
) -> Result<()> {
    ctx.activity(
        names::UPDATE_VALKEY_INSTANCE_SHARD_ID,
        &json!({ "instance_id": instance_id, "shard_id": shard_id }),
        default_activity_options(),
    )
    .await
}

pub async fn upsert_resource_usage(
    ctx: &dyn WorkflowContext,
    entry: &ResourceUsageEntry,
) -> Result<()> {
    ctx.activity(
        names::UPSERT_RESOURCE_USAGE,
        entry,
        default_activity_options(),
    )
    .await
}

pub async fn create_shard(ctx: &dyn WorkflowContext, input: &CreateShardInput) -> Result<Shard> {
    ctx.activity(names::CREATE_SHARD, input, default_activity_options())
        .await
}

pub async fn create_node(ctx: &dyn WorkflowContext, input: &CreateNodeInput) -> Result<Node> {
    ctx.activity(names::CREATE_NODE, input, default_activity_options())
        .await
}

pub async fn create_infrastructure_service(
    ctx: &dyn WorkflowContext,
    input: &CreateInfrastructureServiceInput,
) -> Result<()> {
    ctx.activity(
        names::CREATE_INFRASTRUCTURE_SERVICE,
        input,
        default_activity_options(),
    )
    .await
}

pub async fn release_node(ctx: &dyn WorkflowContext, node_id: &str) -> Result<()> {
    ctx.activity(
        names::RELEASE_NODE,
        &json!({ "node_id": node_id }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// ACME client
// ============================================================================

pub async fn create_order(ctx: &dyn WorkflowContext, fqdn: &str) -> Result<AcmeOrder> {
    ctx.activity(
        names::CREATE_ORDER,
        &json!({ "fqdn": fqdn }),
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

pub async fn get_http01_challenge(
    ctx: &dyn WorkflowContext,
    authz_url: &str,
    account_key: &str,
) -> Result<Http01Challenge> {
    ctx.activity(
        names::GET_HTTP01_CHALLENGE,
        &json!({ "authz_url": authz_url, "account_key": account_key }),
        default_activity_options(),
    )
    .await
}

pub async fn accept_challenge(
    ctx: &dyn WorkflowContext,
    challenge_url: &str,
    account_key: &str,
) -> Result<()> {
    ctx.activity(
        names::ACCEPT_CHALLENGE,
        &json!({ "challenge_url": challenge_url, "account_key": account_key }),
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

pub async fn finalize_order(
    ctx: &dyn WorkflowContext,
    order_url: &str,
    fqdn: &str,
    account_key: &str,
) -> Result<IssuedCertificate> {
    ctx.activity(
        names::FINALIZE_ORDER,
        &json!({ "order_url": order_url, "fqdn": fqdn, "account_key": account_key }),
        long_activity_options(Duration::from_secs(300)),
    )
    .await
}

pub async fn validate_custom_cert(
    ctx: &dyn WorkflowContext,
    cert_pem: &str,
    key_pem: &str,
) -> Result<()> {
    ctx.activity(
        names::VALIDATE_CUSTOM_CERT,
        &json!({ "cert_pem": cert_pem, "key_pem": key_pem }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// Node verbs: tenant and web serving
// ============================================================================

pub async fn provision_tenant_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant: &Tenant,
) -> Result<()> {
    ctx.activity(
        names::PROVISION_TENANT_UNIT,
        &json!({ "tenant": tenant }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn converge_tenant_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant: &Tenant,
) -> Result<()> {
    ctx.activity(
        names::CONVERGE_TENANT_UNIT,
        &json!({ "tenant": tenant }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_tenant_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    uid: u32,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_TENANT_UNIT,
        &json!({ "tenant_id": tenant_id, "uid": uid }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn suspend_tenant_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
) -> Result<()> {
    ctx.activity(
        names::SUSPEND_TENANT_UNIT,
        &json!({ "tenant_id": tenant_id }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn unsuspend_tenant_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
) -> Result<()> {
    ctx.activity(
        names::UNSUSPEND_TENANT_UNIT,
        &json!({ "tenant_id": tenant_id }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn configure_webroot(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    webroot: &Webroot,
) -> Result<()> {
    ctx.activity(
        names::CONFIGURE_WEBROOT,
        &json!({ "tenant_id": tenant_id, "webroot": webroot }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_webroot(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    webroot_id: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_WEBROOT,
        &json!({ "tenant_id": tenant_id, "webroot_id": webroot_id }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn configure_vhost(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    fqdn: &Fqdn,
    tenant_id: &str,
    webroot: &Webroot,
) -> Result<()> {
    ctx.activity(
        names::CONFIGURE_VHOST,
        &json!({ "fqdn": fqdn, "tenant_id": tenant_id, "webroot": webroot }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_vhost(ctx: &dyn WorkflowContext, node_id: &str, fqdn: &str) -> Result<()> {
    ctx.activity(
        names::REMOVE_VHOST,
        &json!({ "fqdn": fqdn }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn place_http01_challenge(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &PlaceHttp01ChallengeInput,
) -> Result<()> {
    ctx.activity(
        names::PLACE_HTTP01_CHALLENGE,
        input,
        node_activity_options(node_id),
    )
    .await
}

pub async fn cleanup_http01_challenge(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &CleanupHttp01ChallengeInput,
) -> Result<()> {
    ctx.activity(
        names::CLEANUP_HTTP01_CHALLENGE,
        input,
        node_activity_options(node_id),
    )
    .await
}

pub async fn install_certificate(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &InstallCertificateInput,
) -> Result<()> {
    ctx.activity(
        names::INSTALL_CERTIFICATE,
        input,
        node_activity_options(node_id),
    )
    .await
}

pub async fn install_cron_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    cron_job: &CronJob,
) -> Result<()> {
    ctx.activity(
        names::INSTALL_CRON_UNIT,
        &json!({ "tenant_id": tenant_id, "cron_job": cron_job }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_cron_unit(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    cron_job_id: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_CRON_UNIT,
        &json!({ "tenant_id": tenant_id, "cron_job_id": cron_job_id }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn set_cron_timer_enabled(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    cron_job_id: &str,
    enabled: bool,
) -> Result<()> {
    ctx.activity(
        names::SET_CRON_TIMER_ENABLED,
        &json!({ "cron_job_id": cron_job_id, "enabled": enabled }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn write_authorized_key(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    uid: u32,
    public_key: &str,
) -> Result<()> {
    ctx.activity(
        names::WRITE_AUTHORIZED_KEY,
        &json!({ "tenant_id": tenant_id, "uid": uid, "public_key": public_key }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_authorized_key(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    tenant_id: &str,
    uid: u32,
    public_key: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_AUTHORIZED_KEY,
        &json!({ "tenant_id": tenant_id, "uid": uid, "public_key": public_key }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn add_wireguard_peer(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    peer: &WireGuardPeer,
) -> Result<()> {
    ctx.activity(
        names::ADD_WIREGUARD_PEER,
        &json!({ "peer": peer }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_wireguard_peer(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    peer_id: &str,
    public_key: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_WIREGUARD_PEER,
        &json!({ "peer_id": peer_id, "public_key": public_key }),
        node_activity_options(node_id),
    )
    .await
}

// ============================================================================
// Node verbs: databases and Valkey
// ============================================================================

pub async fn create_database_on(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    database: &str,
) -> Result<()> {
    ctx.activity(
        names::CREATE_DATABASE,
        &json!({ "database": database }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn delete_database_on(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    database: &str,
) -> Result<()> {
    ctx.activity(
        names::DELETE_DATABASE,
        &json!({ "database": database }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn create_database_user_on(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    database: &str,
    user: &DatabaseUser,
) -> Result<()> {
    ctx.activity(
        names::CREATE_DATABASE_USER,
        &json!({ "database": database, "user": user }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn dump_mysql_database(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &MySqlDumpInput,
) -> Result<()> {
    ctx.activity(
        names::DUMP_MYSQL_DATABASE,
        input,
        long_activity_options(Duration::from_secs(600)).with_task_queue(
            hosting_contracts::queues::node_task_queue(node_id),
        ),
    )
    .await
}

pub async fn import_mysql_database(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &MySqlDumpInput,
) -> Result<()> {
    ctx.activity(
        names::IMPORT_MYSQL_DATABASE,
        input,
        long_activity_options(Duration::from_secs(600)).with_task_queue(
            hosting_contracts::queues::node_task_queue(node_id),
        ),
    )
    .await
}

pub async fn cleanup_migrate_file(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    dump_path: &str,
) -> Result<()> {
    ctx.activity(
        names::CLEANUP_MIGRATE_FILE,
        &json!({ "dump_path": dump_path }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn create_valkey_instance_on(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    instance: &ValkeyInstance,
) -> Result<()> {
    ctx.activity(
        names::CREATE_VALKEY_INSTANCE,
        &json!({ "instance": instance }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn delete_valkey_instance_on(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    instance_id: &str,
    port: u16,
) -> Result<()> {
    ctx.activity(
        names::DELETE_VALKEY_INSTANCE,
        &json!({ "instance_id": instance_id, "port": port }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn apply_valkey_user(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    port: u16,
    user: &ValkeyUser,
) -> Result<()> {
    ctx.activity(
        names::APPLY_VALKEY_USER,
        &json!({ "port": port, "user": user }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn remove_valkey_user(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    port: u16,
    username: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_VALKEY_USER,
        &json!({ "port": port, "username": username }),
        node_activity_options(node_id),
    )
    .await
}

pub async fn dump_valkey_data(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &ValkeyDumpInput,
) -> Result<()> {
    ctx.activity(
        names::DUMP_VALKEY_DATA,
        input,
        long_activity_options(Duration::from_secs(600)).with_task_queue(
            hosting_contracts::queues::node_task_queue(node_id),
        ),
    )
    .await
}

pub async fn import_valkey_data(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    input: &ValkeyDumpInput,
) -> Result<()> {
    ctx.activity(
        names::IMPORT_VALKEY_DATA,
        input,
        long_activity_options(Duration::from_secs(600)).with_task_queue(
            hosting_contracts::queues::node_task_queue(node_id),
        ),
    )
    .await
}

// ============================================================================
// Node verbs: health probes
// ============================================================================

pub async fn check_cephfs_mount(
    ctx: &dyn WorkflowContext,
    node_id: &str,
) -> Result<CephFsMountStatus> {
    ctx.activity(
        names::CHECK_CEPHFS_MOUNT,
        &json!({}),
        node_activity_options(node_id),
    )
    .await
}

pub async fn get_replication_status(
    ctx: &dyn WorkflowContext,
    node_id: &str,
) -> Result<ReplicationStatus> {
    ctx.activity(
        names::GET_REPLICATION_STATUS,
        &json!({}),
        node_activity_options(node_id),
    )
    .await
}

pub async fn get_resource_usage(
    ctx: &dyn WorkflowContext,
    node_id: &str,
    role: ShardRole,
) -> Result<Vec<ResourceUsageEntry>> {
    ctx.activity(
        names::GET_RESOURCE_USAGE,
        &json!({ "role": role }),
        node_activity_options(node_id),
    )
    .await
}

// ============================================================================
// PowerDNS writes
// ============================================================================

pub async fn create_zone_backend(ctx: &dyn WorkflowContext, zone: &Zone) -> Result<()> {
    ctx.activity(
        names::CREATE_ZONE,
        &json!({ "zone": zone }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_zone_backend(
    ctx: &dyn WorkflowContext,
    zone_id: &str,
    name: &str,
) -> Result<()> {
    ctx.activity(
        names::DELETE_ZONE,
        &json!({ "zone_id": zone_id, "name": name }),
        default_activity_options(),
    )
    .await
}

pub async fn create_zone_record_backend(
    ctx: &dyn WorkflowContext,
    record: &ZoneRecord,
) -> Result<()> {
    ctx.activity(
        names::CREATE_ZONE_RECORD,
        &json!({ "record": record }),
        default_activity_options(),
    )
    .await
}

pub async fn update_zone_record_backend(
    ctx: &dyn WorkflowContext,
    record: &ZoneRecord,
) -> Result<()> {
    ctx.activity(
        names::UPDATE_ZONE_RECORD,
        &json!({ "record": record }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_zone_record_backend(
    ctx: &dyn WorkflowContext,
    record: &ZoneRecord,
) -> Result<()> {
    ctx.activity(
        names::DELETE_ZONE_RECORD,
        &json!({ "record": record }),
        default_activity_options(),
    )
    .await
}

pub async fn ensure_fqdn_dns_records(ctx: &dyn WorkflowContext, fqdn: &str) -> Result<()> {
    ctx.activity(
        names::ENSURE_FQDN_DNS_RECORDS,
        &json!({ "fqdn": fqdn }),
        default_activity_options(),
    )
    .await
}

pub async fn remove_fqdn_dns_records(ctx: &dyn WorkflowContext, fqdn: &str) -> Result<()> {
    ctx.activity(
        names::REMOVE_FQDN_DNS_RECORDS,
        &json!({ "fqdn": fqdn }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// Mail backend
// ============================================================================

pub async fn ensure_mail_domain(ctx: &dyn WorkflowContext, domain: &str) -> Result<()> {
    ctx.activity(
        names::ENSURE_MAIL_DOMAIN,
        &json!({ "domain": domain }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_mail_domain(ctx: &dyn WorkflowContext, domain: &str) -> Result<()> {
    ctx.activity(
        names::DELETE_MAIL_DOMAIN,
        &json!({ "domain": domain }),
        default_activity_options(),
    )
    .await
}

pub async fn create_mail_account(ctx: &dyn WorkflowContext, account: &EmailAccount) -> Result<()> {
    ctx.activity(
        names::CREATE_MAIL_ACCOUNT,
        &json!({ "account": account }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_mail_account(ctx: &dyn WorkflowContext, address: &str) -> Result<()> {
    ctx.activity(
        names::DELETE_MAIL_ACCOUNT,
        &json!({ "address": address }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// Load balancer API
// ============================================================================

pub async fn set_lb_map_entry(ctx: &dyn WorkflowContext, input: &SetLbMapEntryInput) -> Result<()> {
    ctx.activity(names::SET_LB_MAP_ENTRY, input, default_activity_options())
        .await
}

pub async fn remove_lb_map_entry(ctx: &dyn WorkflowContext, fqdn: &str) -> Result<()> {
    ctx.activity(
        names::REMOVE_LB_MAP_ENTRY,
        &json!({ "fqdn": fqdn }),
        default_activity_options(),
    )
    .await
}

pub async fn configure_haproxy_backends(ctx: &dyn WorkflowContext, cluster_id: &str) -> Result<()> {
    ctx.activity(
        names::CONFIGURE_HAPROXY_BACKENDS,
        &json!({ "cluster_id": cluster_id }),
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

// ============================================================================
// Object storage admin API
// ============================================================================

pub async fn create_bucket(ctx: &dyn WorkflowContext, tenant_id: &str, name: &str) -> Result<()> {
    ctx.activity(
        names::CREATE_BUCKET,
        &json!({ "tenant_id": tenant_id, "name": name }),
        default_activity_options(),
    )
    .await
}

pub async fn set_bucket_quota(
    ctx: &dyn WorkflowContext,
    name: &str,
    quota_bytes: u64,
) -> Result<()> {
    ctx.activity(
        names::SET_BUCKET_QUOTA,
        &json!({ "name": name, "quota_bytes": quota_bytes }),
        default_activity_options(),
    )
    .await
}

pub async fn delete_bucket(ctx: &dyn WorkflowContext, name: &str) -> Result<()> {
    ctx.activity(
        names::DELETE_BUCKET,
        &json!({ "name": name }),
        default_activity_options(),
    )
    .await
}

// ============================================================================
// Cluster provisioning
// ============================================================================

pub async fn validate_host_reachable(ctx: &dyn WorkflowContext, host_id: &str) -> Result<()> {
    ctx.activity(
        names::VALIDATE_HOST_REACHABLE,
        &json!({ "host_id": host_id }),
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

pub async fn select_host_for_infra(
    ctx: &dyn WorkflowContext,
    cluster_id: &str,
    service_type: InfraServiceType,
) -> Result<SelectedHost> {
    ctx.activity(
        names::SELECT_HOST_FOR_INFRA,
        &json!({ "cluster_id": cluster_id, "service_type": service_type }),
        default_activity_options(),
    )
    .await
}

pub async fn pull_image(ctx: &dyn WorkflowContext, host_id: &str, image: &str) -> Result<()> {
    ctx.activity(
        names::PULL_IMAGE,
        &json!({ "host_id": host_id, "image": image }),
        long_activity_options(Duration::from_secs(600)),
    )
    .await
}

pub async fn create_container(
    ctx: &dyn WorkflowContext,
    input: &CreateContainerInput,
) -> Result<ContainerInfo> {
    ctx.activity(
        names::CREATE_CONTAINER,
        input,
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

pub async fn wait_for_healthy(
    ctx: &dyn WorkflowContext,
    host_id: &str,
    container_id: &str,
) -> Result<()> {
    ctx.activity(
        names::WAIT_FOR_HEALTHY,
        &json!({ "host_id": host_id, "container_id": container_id }),
        long_activity_options(Duration::from_secs(300)),
    )
    .await
}

pub async fn remove_container(
    ctx: &dyn WorkflowContext,
    host_id: &str,
    container_id: &str,
) -> Result<()> {
    ctx.activity(
        names::REMOVE_CONTAINER,
        &json!({ "host_id": host_id, "container_id": container_id }),
        long_activity_options(Duration::from_secs(120)),
    )
    .await
}

pub async fn run_cluster_smoke_test(ctx: &dyn WorkflowContext, cluster_id: &str) -> Result<()> {
    ctx.activity(
        names::RUN_CLUSTER_SMOKE_TEST,
        &json!({ "cluster_id": cluster_id }),
        long_activity_options(Duration::from_secs(600)),
    )
    .await
}
