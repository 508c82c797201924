//! Resource lifecycle status and addressing constants

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by every managed entity
///
/// Created by the API in `Pending`; workflows move entities through
/// `Provisioning`/`Deleting` into one of the terminal outcomes. `Degraded`
/// is set and cleared only by the health crons; `Suspended` applies to
/// tenants and is terminal until an explicit unsuspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Pending,
    Provisioning,
    Converging,
    Active,
    Degraded,
    Suspended,
    Deleting,
    Deleted,
    Failed,
}

impl ResourceStatus {
    /// String form as stored in the core DB
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Provisioning => "provisioning",
            ResourceStatus::Converging => "converging",
            ResourceStatus::Active => "active",
            ResourceStatus::Degraded => "degraded",
            ResourceStatus::Suspended => "suspended",
            ResourceStatus::Deleting => "deleting",
            ResourceStatus::Deleted => "deleted",
            ResourceStatus::Failed => "failed",
        }
    }

    /// Whether this status ends a workflow run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Active
                | ResourceStatus::Suspended
                | ResourceStatus::Deleted
                | ResourceStatus::Failed
        )
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical core-DB table names used for status updates and incident keys
pub mod tables {
    pub const TENANTS: &str = "tenants";
    pub const WEBROOTS: &str = "webroots";
    pub const FQDNS: &str = "fqdns";
    pub const CERTIFICATES: &str = "certificates";
    pub const CRON_JOBS: &str = "cron_jobs";
    pub const DATABASES: &str = "databases";
    pub const VALKEY_INSTANCES: &str = "valkey_instances";
    pub const VALKEY_USERS: &str = "valkey_users";
    pub const S3_BUCKETS: &str = "s3_buckets";
    pub const SFTP_KEYS: &str = "sftp_keys";
    pub const WIREGUARD_PEERS: &str = "wireguard_peers";
    pub const ZONES: &str = "zones";
    pub const ZONE_RECORDS: &str = "zone_records";
    pub const EMAIL_ACCOUNTS: &str = "email_accounts";
    pub const CLUSTERS: &str = "clusters";
    pub const SHARDS: &str = "shards";
    pub const NODES: &str = "nodes";
}

/// Task queue addressing
pub mod queues {
    /// Default queue for workflows and orchestration-level activities
    pub const DEFAULT_TASK_QUEUE: &str = "hosting-tasks";

    /// Queue carrying activities that must execute on one specific node
    pub fn node_task_queue(node_id: &str) -> String {
        format!("node-{node_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ResourceStatus::Provisioning).unwrap();
        assert_eq!(json, "\"provisioning\"");

        let parsed: ResourceStatus = serde_json::from_str("\"deleted\"").unwrap();
        assert_eq!(parsed, ResourceStatus::Deleted);
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [
            ResourceStatus::Pending,
            ResourceStatus::Provisioning,
            ResourceStatus::Converging,
            ResourceStatus::Active,
            ResourceStatus::Degraded,
            ResourceStatus::Suspended,
            ResourceStatus::Deleting,
            ResourceStatus::Deleted,
            ResourceStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(ResourceStatus::Active.is_terminal());
        assert!(ResourceStatus::Deleted.is_terminal());
        assert!(ResourceStatus::Suspended.is_terminal());
        assert!(ResourceStatus::Failed.is_terminal());
        assert!(!ResourceStatus::Provisioning.is_terminal());
        assert!(!ResourceStatus::Degraded.is_terminal());
    }

    #[test]
    fn test_node_task_queue() {
        assert_eq!(queues::node_task_queue("n1"), "node-n1");
    }
}
