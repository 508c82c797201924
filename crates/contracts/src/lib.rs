//! # Hosting Control-Plane Contracts
//!
//! Wire records shared between the orchestration layer and the activity
//! implementations. Entities are owned by the core DB and mirrored here as
//! the workflow layer reads them; activity inputs/outputs are the JSON
//! payloads crossing the task queues.

pub mod activities;
pub mod cluster;
pub mod context;
pub mod data;
pub mod dns;
pub mod incident;
pub mod resource;
pub mod tenant;
pub mod web;

pub use cluster::{
    Cluster, ClusterSpec, HostMachine, InfraServiceType, InfraServices, InfrastructureService,
    Node, Shard, ShardRole, ShardSpec,
};
pub use context::{
    ClusterContext, CronJobContext, EmailAccountContext, FqdnContext, S3BucketContext,
    SftpKeyContext, TenantContext, WebrootContext, WireGuardPeerContext,
};
pub use data::{Database, DatabaseUser, S3Bucket, ValkeyInstance, ValkeyUser};
pub use dns::{Zone, ZoneRecord};
pub use incident::{
    AutoResolveIncidentsInput, CreateIncidentParams, CreateIncidentResult, Incident,
    IncidentSeverity, IncidentStatus,
};
pub use resource::{queues, tables, ResourceStatus};
pub use tenant::{EmailAccount, SftpKey, Tenant, WireGuardPeer};
pub use web::{Certificate, CertificateType, CronJob, Fqdn, Webroot};
