//! Data-plane entities: databases, Valkey instances, S3 buckets

use serde::{Deserialize, Serialize};

use crate::resource::ResourceStatus;

/// A MySQL database on a database shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub tenant_id: String,
    pub shard_id: Option<String>,

    /// Schema name on the shard
    pub name: String,

    pub status: ResourceStatus,
}

/// A MySQL user scoped to one database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseUser {
    pub id: String,
    pub database_id: String,
    pub username: String,

    /// Opaque password hash produced upstream
    pub password_hash: String,

    #[serde(default)]
    pub privileges: Vec<String>,

    pub status: ResourceStatus,
}

/// A Valkey instance on a valkey shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValkeyInstance {
    pub id: String,
    pub tenant_id: String,
    pub shard_id: Option<String>,
    pub port: u16,

    /// Instance-level auth password; opaque to the workflow layer
    pub password: String,

    pub max_memory_mb: u32,
    pub status: ResourceStatus,
}

/// An ACL user on a Valkey instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValkeyUser {
    pub id: String,
    pub instance_id: String,
    pub username: String,
    pub password: String,

    #[serde(default)]
    pub acl_rules: Vec<String>,

    pub status: ResourceStatus,
}

/// An object-storage bucket owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub quota_bytes: Option<u64>,
    pub status: ResourceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_without_shard() {
        let db = Database {
            id: "d1".into(),
            tenant_id: "t1".into(),
            shard_id: None,
            name: "acme_main".into(),
            status: ResourceStatus::Pending,
        };

        let json = serde_json::to_string(&db).unwrap();
        let parsed: Database = serde_json::from_str(&json).unwrap();
        assert!(parsed.shard_id.is_none());
    }
}
