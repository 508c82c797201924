//! Tenant-scoped entities: tenants, SFTP keys, WireGuard peers, email accounts

use serde::{Deserialize, Serialize};

use crate::resource::ResourceStatus;

/// A customer identity owning resources, bound to a cluster and a shard
///
/// A tenant without a shard assignment cannot be provisioned; workflows that
/// find one fail fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub cluster_id: String,
    pub shard_id: Option<String>,

    /// Human-visible name, also the POSIX account name on nodes
    pub name: String,

    /// Numeric POSIX uid on the shard nodes
    pub uid: u32,

    pub sftp_enabled: bool,
    pub ssh_enabled: bool,

    /// Storage quota in bytes
    pub quota_bytes: u64,

    pub brand_id: Option<String>,
    pub status: ResourceStatus,
}

/// An SSH public key granting SFTP access to a tenant account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpKey {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub public_key: String,
    pub status: ResourceStatus,
}

/// A WireGuard peer giving a tenant VPN access through the gateway shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireGuardPeer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub public_key: String,

    #[serde(default)]
    pub allowed_ips: Vec<String>,

    pub status: ResourceStatus,
}

/// A mailbox on the mail backend, owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAccount {
    pub id: String,
    pub tenant_id: String,

    /// Full address, e.g. `info@example.com`
    pub address: String,

    /// Password hash as produced upstream; opaque to the workflow layer
    pub password_hash: String,

    pub quota_mb: u32,
    pub status: ResourceStatus,
}

impl EmailAccount {
    /// Domain part of the address
    pub fn domain(&self) -> Option<&str> {
        self.address.split_once('@').map(|(_, domain)| domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_account_domain() {
        let account = EmailAccount {
            id: "e1".into(),
            tenant_id: "t1".into(),
            address: "info@example.com".into(),
            password_hash: "x".into(),
            quota_mb: 1024,
            status: ResourceStatus::Pending,
        };
        assert_eq!(account.domain(), Some("example.com"));
    }

    #[test]
    fn test_tenant_serialization_roundtrip() {
        let tenant = Tenant {
            id: "t1".into(),
            cluster_id: "c1".into(),
            shard_id: Some("s1".into()),
            name: "acme".into(),
            uid: 10001,
            sftp_enabled: true,
            ssh_enabled: false,
            quota_bytes: 10 * 1024 * 1024 * 1024,
            brand_id: None,
            status: ResourceStatus::Active,
        };

        let json = serde_json::to_string(&tenant).unwrap();
        let parsed: Tenant = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.shard_id.as_deref(), Some("s1"));
        assert_eq!(parsed.uid, 10001);
    }
}
