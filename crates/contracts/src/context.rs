//! Composite read-context records
//!
//! One context activity returns an entity together with everything a
//! provisioning workflow needs about it. Preferred over chained single-row
//! reads: half the replay history, and no partial-read races between the
//! entity and its relations.

use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, HostMachine, Node, Shard};
use crate::data::S3Bucket;
use crate::tenant::{EmailAccount, SftpKey, Tenant, WireGuardPeer};
use crate::web::{CronJob, Fqdn, Webroot};

/// Context for tenant workflows: the tenant, its shard, and the shard nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub shard: Option<Shard>,

    /// Nodes of the tenant's shard; empty when the tenant has no shard
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Context for webroot workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebrootContext {
    pub webroot: Webroot,
    pub tenant: Tenant,
    pub shard: Option<Shard>,

    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Context for FQDN and certificate workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FqdnContext {
    pub fqdn: Fqdn,
    pub webroot: Option<Webroot>,
    pub tenant: Tenant,
    pub shard: Option<Shard>,

    #[serde(default)]
    pub nodes: Vec<Node>,

    /// LB backend label for the tenant's web shard
    pub lb_backend: Option<String>,
}

/// Context for cron-job workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJobContext {
    pub cron_job: CronJob,
    pub webroot: Webroot,
    pub tenant: Tenant,
    pub shard: Option<Shard>,

    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Context for SFTP-key workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpKeyContext {
    pub key: SftpKey,
    pub tenant: Tenant,
    pub shard: Option<Shard>,

    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Context for WireGuard-peer workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireGuardPeerContext {
    pub peer: WireGuardPeer,
    pub tenant: Tenant,

    /// Nodes of the cluster's gateway shard
    #[serde(default)]
    pub gateway_nodes: Vec<Node>,
}

/// Context for S3-bucket workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3BucketContext {
    pub bucket: S3Bucket,
    pub tenant: Tenant,
}

/// Context for email-account workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAccountContext {
    pub account: EmailAccount,
    pub tenant: Tenant,
}

/// Context for cluster workflows: the cluster and its host machines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterContext {
    pub cluster: Cluster,

    #[serde(default)]
    pub hosts: Vec<HostMachine>,
}
