//! Orchestration configuration
//!
//! Loaded once at worker start and closed into the registered handlers.
//! Workflow code never reads the environment directly; that would break
//! replay across differently-configured workers, so keep these knobs stable
//! across the fleet.

/// Tunables for the orchestration layer
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Renew Let's Encrypt certificates expiring within this many days
    pub renewal_window_days: u32,

    /// Delete certificate records expired for at least this many days
    pub expired_cert_retention_days: u32,

    /// Replica lag above this many seconds counts as degraded
    pub replication_lag_threshold_secs: u64,

    /// Directory on shard nodes holding migration dump files
    pub migrate_dump_dir: String,

    /// Root of per-tenant web storage on shard nodes
    pub webroot_base_dir: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            renewal_window_days: 30,
            expired_cert_retention_days: 30,
            replication_lag_threshold_secs: 300,
            migrate_dump_dir: "/var/backups/hosting/migrate".to_string(),
            webroot_base_dir: "/var/www/storage".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            renewal_window_days: env_parse("CERT_RENEWAL_WINDOW_DAYS", defaults.renewal_window_days),
            expired_cert_retention_days: env_parse(
                "EXPIRED_CERT_RETENTION_DAYS",
                defaults.expired_cert_retention_days,
            ),
            replication_lag_threshold_secs: env_parse(
                "REPLICATION_LAG_THRESHOLD_SECS",
                defaults.replication_lag_threshold_secs,
            ),
            migrate_dump_dir: std::env::var("MIGRATE_DUMP_DIR")
                .unwrap_or(defaults.migrate_dump_dir),
            webroot_base_dir: std::env::var("WEBROOT_BASE_DIR")
                .unwrap_or(defaults.webroot_base_dir),
        }
    }

    /// Path of a webroot's public folder on shard nodes
    pub fn webroot_public_path(
        &self,
        tenant_id: &str,
        webroot_name: &str,
        public_folder: &str,
    ) -> String {
        format!(
            "{}/{}/{}/{}",
            self.webroot_base_dir, tenant_id, webroot_name, public_folder
        )
    }

    /// Path of a migration dump file on shard nodes
    pub fn migrate_dump_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.migrate_dump_dir, file_name)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
