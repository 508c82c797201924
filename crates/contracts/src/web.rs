//! Web-serving entities: webroots, FQDNs, certificates, cron jobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::ResourceStatus;

/// A tenant-scoped website root with runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webroot {
    pub id: String,
    pub tenant_id: String,

    /// Directory name under the tenant's storage root
    pub name: String,

    /// Runtime kind, e.g. `php`, `node`, `static`
    pub runtime: String,
    pub runtime_version: String,

    /// Opaque runtime settings (pool sizes, extensions, ...)
    #[serde(default)]
    pub runtime_config: Value,

    /// Folder served as the document root, relative to the webroot
    pub public_folder: String,

    pub env_file_name: Option<String>,
    pub env_shell_source: Option<String>,

    pub status: ResourceStatus,
}

/// A fully qualified domain name, optionally bound to a webroot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fqdn {
    pub id: String,
    pub fqdn: String,
    pub webroot_id: Option<String>,
    pub ssl_enabled: bool,
    pub status: ResourceStatus,
}

/// Certificate provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    LetsEncrypt,
    Custom,
}

/// A TLS certificate for an FQDN
///
/// At most one certificate per FQDN is `active`; activation goes through
/// `DeactivateOtherCerts` then `ActivateCertificate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub fqdn_id: String,

    #[serde(rename = "type")]
    pub cert_type: CertificateType,

    pub cert_pem: Option<String>,
    pub key_pem: Option<String>,
    pub chain_pem: Option<String>,

    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,

    pub active: bool,
    pub status: ResourceStatus,
}

/// A scheduled command running under a tenant account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub id: String,
    pub tenant_id: String,
    pub webroot_id: String,

    /// Five-field cron expression
    pub schedule: String,

    pub command: String,
    pub working_directory: String,
    pub timeout_seconds: u32,
    pub max_memory_mb: u32,
    pub enabled: bool,
    pub status: ResourceStatus,
}
