//! Activity names and wire records
//!
//! Activities are addressed by string name. Orchestration-level activities
//! run on the default queue; node-local verbs are routed to `node-<id>`
//! queues. Every resource-mutating activity is idempotent on its logical
//! inputs: id-bearing creates deduplicate on id, upserts on primary key, and
//! external-API wrappers treat "already exists" as success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::{InfraServiceType, ShardSpec};
use crate::resource::ResourceStatus;

/// Activity type names
pub mod names {
    // Core-DB composite reads
    pub const GET_TENANT_CONTEXT: &str = "GetTenantContext";
    pub const GET_WEBROOT_CONTEXT: &str = "GetWebrootContext";
    pub const GET_FQDN_CONTEXT: &str = "GetFQDNContext";
    pub const GET_CRON_JOB_CONTEXT: &str = "GetCronJobContext";
    pub const GET_SFTP_KEY_CONTEXT: &str = "GetSFTPKeyContext";
    pub const GET_WIREGUARD_PEER_CONTEXT: &str = "GetWireGuardPeerContext";
    pub const GET_S3_BUCKET_CONTEXT: &str = "GetS3BucketContext";
    pub const GET_EMAIL_ACCOUNT_CONTEXT: &str = "GetEmailAccountContext";
    pub const GET_CLUSTER_CONTEXT: &str = "GetClusterContext";

    // Core-DB single reads
    pub const GET_CERTIFICATE_BY_ID: &str = "GetCertificateByID";
    pub const GET_DATABASE_BY_ID: &str = "GetDatabaseByID";
    pub const GET_VALKEY_INSTANCE_BY_ID: &str = "GetValkeyInstanceByID";
    pub const GET_VALKEY_USER_BY_ID: &str = "GetValkeyUserByID";
    pub const GET_ZONE_BY_ID: &str = "GetZoneByID";
    pub const GET_ZONE_RECORD_BY_ID: &str = "GetZoneRecordByID";
    pub const LIST_NODES_BY_SHARD: &str = "ListNodesByShard";
    pub const LIST_SHARDS_BY_ROLE: &str = "ListShardsByRole";
    pub const LIST_DATABASE_USERS_BY_DATABASE_ID: &str = "ListDatabaseUsersByDatabaseID";
    pub const LIST_VALKEY_USERS_BY_INSTANCE_ID: &str = "ListValkeyUsersByInstanceID";
    pub const LIST_PENDING_WEBROOTS: &str = "ListPendingWebroots";
    pub const LIST_NODES_BY_CLUSTER: &str = "ListNodesByCluster";
    pub const LIST_INFRASTRUCTURE_SERVICES: &str = "ListInfrastructureServices";
    pub const LIST_PENDING_EMAIL_ACCOUNTS: &str = "ListPendingEmailAccounts";
    pub const GET_EXPIRING_LE_CERTS: &str = "GetExpiringLECerts";
    pub const GET_EXPIRED_CERTS: &str = "GetExpiredCerts";

    // Core-DB writes
    pub const UPDATE_RESOURCE_STATUS: &str = "UpdateResourceStatus";
    pub const CREATE_CERTIFICATE: &str = "CreateCertificate";
    pub const STORE_CERTIFICATE: &str = "StoreCertificate";
    pub const DEACTIVATE_OTHER_CERTS: &str = "DeactivateOtherCerts";
    pub const ACTIVATE_CERTIFICATE: &str = "ActivateCertificate";
    pub const DELETE_CERTIFICATE: &str = "DeleteCertificate";
    pub const UPDATE_DATABASE_SHARD_ID: &str = "UpdateDatabaseShardID";
    pub const UPDATE_VALKEY_INSTANCE_SHARD_ID: &str = "UpdateValkeyInstanceShardID";
    pub const UPSERT_RESOURCE_USAGE: &str = "UpsertResourceUsage";
    pub const CREATE_SHARD: &str = "CreateShard";
    pub const CREATE_NODE: &str = "CreateNode";
    pub const CREATE_INFRASTRUCTURE_SERVICE: &str = "CreateInfrastructureService";
    pub const RELEASE_NODE: &str = "ReleaseNode";

    // Incident sink
    pub const CREATE_INCIDENT: &str = "CreateIncident";
    pub const AUTO_RESOLVE_INCIDENTS: &str = "AutoResolveIncidents";
    pub const SEND_INCIDENT_WEBHOOK: &str = "SendIncidentWebhook";

    // ACME client
    pub const CREATE_ORDER: &str = "CreateOrder";
    pub const GET_HTTP01_CHALLENGE: &str = "GetHTTP01Challenge";
    pub const ACCEPT_CHALLENGE: &str = "AcceptChallenge";
    pub const FINALIZE_ORDER: &str = "FinalizeOrder";
    pub const VALIDATE_CUSTOM_CERT: &str = "ValidateCustomCert";

    // Node-local verbs (dispatched on node-<id> queues)
    pub const PROVISION_TENANT_UNIT: &str = "ProvisionTenantUnit";
    pub const CONVERGE_TENANT_UNIT: &str = "ConvergeTenantUnit";
    pub const REMOVE_TENANT_UNIT: &str = "RemoveTenantUnit";
    pub const SUSPEND_TENANT_UNIT: &str = "SuspendTenantUnit";
    pub const UNSUSPEND_TENANT_UNIT: &str = "UnsuspendTenantUnit";
    pub const CONFIGURE_WEBROOT: &str = "ConfigureWebroot";
    pub const REMOVE_WEBROOT: &str = "RemoveWebroot";
    pub const CONFIGURE_VHOST: &str = "ConfigureVhost";
    pub const REMOVE_VHOST: &str = "RemoveVhost";
    pub const PLACE_HTTP01_CHALLENGE: &str = "PlaceHTTP01Challenge";
    pub const CLEANUP_HTTP01_CHALLENGE: &str = "CleanupHTTP01Challenge";
    pub const INSTALL_CERTIFICATE: &str = "InstallCertificate";
    pub const INSTALL_CRON_UNIT: &str = "InstallCronUnit";
    pub const REMOVE_CRON_UNIT: &str = "RemoveCronUnit";
    pub const SET_CRON_TIMER_ENABLED: &str = "SetCronTimerEnabled";
    pub const CREATE_DATABASE: &str = "CreateDatabase";
    pub const DELETE_DATABASE: &str = "DeleteDatabase";
    pub const CREATE_DATABASE_USER: &str = "CreateDatabaseUser";
    pub const DUMP_MYSQL_DATABASE: &str = "DumpMySQLDatabase";
    pub const IMPORT_MYSQL_DATABASE: &str = "ImportMySQLDatabase";
    pub const CLEANUP_MIGRATE_FILE: &str = "CleanupMigrateFile";
    pub const CREATE_VALKEY_INSTANCE: &str = "CreateValkeyInstance";
    pub const DELETE_VALKEY_INSTANCE: &str = "DeleteValkeyInstance";
    pub const APPLY_VALKEY_USER: &str = "ApplyValkeyUser";
    pub const REMOVE_VALKEY_USER: &str = "RemoveValkeyUser";
    pub const DUMP_VALKEY_DATA: &str = "DumpValkeyData";
    pub const IMPORT_VALKEY_DATA: &str = "ImportValkeyData";
    pub const WRITE_AUTHORIZED_KEY: &str = "WriteAuthorizedKey";
    pub const REMOVE_AUTHORIZED_KEY: &str = "RemoveAuthorizedKey";
    pub const ADD_WIREGUARD_PEER: &str = "AddWireGuardPeer";
    pub const REMOVE_WIREGUARD_PEER: &str = "RemoveWireGuardPeer";
    pub const CHECK_CEPHFS_MOUNT: &str = "CheckCephFSMount";
    pub const GET_REPLICATION_STATUS: &str = "GetReplicationStatus";
    pub const GET_RESOURCE_USAGE: &str = "GetResourceUsage";

    // PowerDNS writes
    pub const CREATE_ZONE: &str = "CreateZone";
    pub const DELETE_ZONE: &str = "DeleteZone";
    pub const CREATE_ZONE_RECORD: &str = "CreateZoneRecord";
    pub const UPDATE_ZONE_RECORD: &str = "UpdateZoneRecord";
    pub const DELETE_ZONE_RECORD: &str = "DeleteZoneRecord";
    pub const ENSURE_FQDN_DNS_RECORDS: &str = "EnsureFQDNDNSRecords";
    pub const REMOVE_FQDN_DNS_RECORDS: &str = "RemoveFQDNDNSRecords";

    // Mail backend
    pub const ENSURE_MAIL_DOMAIN: &str = "EnsureMailDomain";
    pub const DELETE_MAIL_DOMAIN: &str = "DeleteMailDomain";
    pub const CREATE_MAIL_ACCOUNT: &str = "CreateMailAccount";
    pub const DELETE_MAIL_ACCOUNT: &str = "DeleteMailAccount";

    // Load balancer API
    pub const SET_LB_MAP_ENTRY: &str = "SetLBMapEntry";
    pub const REMOVE_LB_MAP_ENTRY: &str = "RemoveLBMapEntry";
    pub const CONFIGURE_HAPROXY_BACKENDS: &str = "ConfigureHAProxyBackends";

    // Object storage admin API
    pub const CREATE_BUCKET: &str = "CreateBucket";
    pub const SET_BUCKET_QUOTA: &str = "SetBucketQuota";
    pub const DELETE_BUCKET: &str = "DeleteBucket";

    // Cluster provisioning
    pub const VALIDATE_HOST_REACHABLE: &str = "ValidateHostReachable";
    pub const SELECT_HOST_FOR_INFRA: &str = "SelectHostForInfra";
    pub const PULL_IMAGE: &str = "PullImage";
    pub const CREATE_CONTAINER: &str = "CreateContainer";
    pub const WAIT_FOR_HEALTHY: &str = "WaitForHealthy";
    pub const REMOVE_CONTAINER: &str = "RemoveContainer";
    pub const RUN_CLUSTER_SMOKE_TEST: &str = "RunClusterSmokeTest";
}

/// Input for `UpdateResourceStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResourceStatusInput {
    pub table: String,
    pub id: String,
    pub status: ResourceStatus,
    pub status_message: Option<String>,
}

/// Result of `CreateOrder`: a pending ACME order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcmeOrder {
    pub order_url: String,
    pub authz_urls: Vec<String>,

    /// Serialized ACME account key; opaque, threaded through the flow
    pub account_key: String,
}

/// Result of `GetHTTP01Challenge`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Http01Challenge {
    pub challenge_url: String,
    pub token: String,
    pub key_auth: String,
}

/// Input for `PlaceHTTP01Challenge` (node-local)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceHttp01ChallengeInput {
    pub webroot_path: String,
    pub token: String,
    pub key_auth: String,
}

/// Input for `CleanupHTTP01Challenge` (node-local)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupHttp01ChallengeInput {
    pub webroot_path: String,
    pub token: String,
}

/// Result of `FinalizeOrder`: the issued certificate material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
    pub chain_pem: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Input for `StoreCertificate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCertificateInput {
    pub id: String,
    pub cert_pem: String,
    pub key_pem: String,
    pub chain_pem: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Input for `InstallCertificate` (node-local)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallCertificateInput {
    pub fqdn: String,
    pub cert_pem: String,
    pub key_pem: String,
    pub chain_pem: String,
}

/// Entry returned by `GetExpiringLECerts` / `GetExpiredCerts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiringCert {
    pub id: String,
    pub fqdn_id: String,
}

/// Result of `GetReplicationStatus` (node-local, database shards)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationStatus {
    pub io_running: bool,
    pub sql_running: bool,
    pub seconds_behind: Option<u64>,
}

impl ReplicationStatus {
    /// Replication threads stopped entirely
    pub fn is_broken(&self) -> bool {
        !self.io_running || !self.sql_running
    }
}

/// Result of `CheckCephFSMount` (node-local, web shards)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CephFsMountStatus {
    pub mounted: bool,
    pub detail: Option<String>,
}

/// One usage sample returned by `GetResourceUsage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsageEntry {
    pub resource_type: String,
    pub resource_id: String,
    pub metric: String,
    pub value: u64,
}

/// Input for `DumpMySQLDatabase` / `ImportMySQLDatabase` (node-local)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySqlDumpInput {
    pub database: String,
    pub dump_path: String,
}

/// Input for `DumpValkeyData` / `ImportValkeyData` (node-local)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValkeyDumpInput {
    pub instance_id: String,
    pub port: u16,
    pub dump_path: String,
}

/// Input for `CreateShard`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShardInput {
    pub cluster_id: String,
    pub spec: ShardSpec,
}

/// Input for `CreateNode`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeInput {
    pub id: String,
    pub cluster_id: String,
    pub shard_id: String,
    pub shard_index: u32,
    pub hostname: String,
    pub roles: Vec<String>,
}

/// Result of `SelectHostForInfra`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedHost {
    pub host_id: String,
}

/// Input for `CreateContainer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContainerInput {
    pub host_id: String,
    pub service_type: InfraServiceType,
    pub image: String,
    pub network: String,
}

/// Result of `CreateContainer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub container_id: String,
}

/// Input for `CreateInfrastructureService`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInfrastructureServiceInput {
    pub id: String,
    pub cluster_id: String,
    pub host_id: String,
    pub service_type: InfraServiceType,
    pub container_id: String,
}

/// Input for `SetLBMapEntry`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLbMapEntryInput {
    pub fqdn: String,
    pub backend: String,
}
