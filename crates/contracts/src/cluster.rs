//! Cluster topology: clusters, shards, nodes, host machines

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::ResourceStatus;

/// Role of a shard within a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardRole {
    Web,
    Database,
    Valkey,
    Gateway,
    Lb,
    S3,
}

impl ShardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardRole::Web => "web",
            ShardRole::Database => "database",
            ShardRole::Valkey => "valkey",
            ShardRole::Gateway => "gateway",
            ShardRole::Lb => "lb",
            ShardRole::S3 => "s3",
        }
    }
}

impl std::fmt::Display for ShardRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infrastructure services a cluster can run alongside its shards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraServices {
    pub haproxy: bool,
    pub service_db: bool,
    pub valkey: bool,
}

impl InfraServices {
    /// Enabled services in deterministic declaration order
    pub fn enabled(&self) -> Vec<InfraServiceType> {
        let mut services = Vec::new();
        if self.haproxy {
            services.push(InfraServiceType::Haproxy);
        }
        if self.service_db {
            services.push(InfraServiceType::ServiceDb);
        }
        if self.valkey {
            services.push(InfraServiceType::Valkey);
        }
        services
    }
}

/// Infrastructure service kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraServiceType {
    Haproxy,
    ServiceDb,
    Valkey,
}

impl std::fmt::Display for InfraServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InfraServiceType::Haproxy => "haproxy",
            InfraServiceType::ServiceDb => "service_db",
            InfraServiceType::Valkey => "valkey",
        };
        f.write_str(s)
    }
}

/// Shard definition within a cluster spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardSpec {
    pub name: String,
    pub role: ShardRole,
    pub node_count: u32,
}

/// Desired sharding topology and infrastructure toggles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default)]
    pub shards: Vec<ShardSpec>,

    #[serde(default)]
    pub services: InfraServices,
}

/// A cluster of host machines carrying shards and infrastructure services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub spec: ClusterSpec,

    /// Opaque key/value bag (Docker network name, registry, ...)
    #[serde(default)]
    pub config: Value,

    pub status: ResourceStatus,
}

/// A named grouping of nodes with a single role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub id: String,
    pub cluster_id: String,
    pub name: String,
    pub role: ShardRole,

    /// Label used to route traffic at the load balancer
    pub lb_backend: String,

    /// Opaque per-shard config; database shards carry `primary_node_id`
    #[serde(default)]
    pub config: Value,

    pub status: ResourceStatus,
}

impl Shard {
    /// The configured primary node id, if the shard declares one
    pub fn primary_node_id(&self) -> Option<&str> {
        self.config.get("primary_node_id").and_then(Value::as_str)
    }
}

/// A worker machine within a cluster, optionally assigned to a shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub cluster_id: String,
    pub shard_id: Option<String>,

    /// Stable ordinal within the shard
    pub shard_index: Option<u32>,

    #[serde(default)]
    pub roles: Vec<String>,

    pub hostname: String,
    pub status: ResourceStatus,
}

/// A physical or virtual machine hosting cluster workloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMachine {
    pub id: String,
    pub cluster_id: String,
    pub hostname: String,
    pub address: String,
}

/// A containerized infrastructure service running on a host machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureService {
    pub id: String,
    pub cluster_id: String,
    pub host_id: String,
    pub service_type: InfraServiceType,
    pub container_id: String,
}
