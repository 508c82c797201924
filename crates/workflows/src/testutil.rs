//! Shared entity fixtures for workflow tests

use serde_json::json;

use hosting_contracts::{
    Certificate, CertificateType, Cluster, ClusterSpec, CronJob, CronJobContext, Database,
    EmailAccount, Fqdn, FqdnContext, HostMachine, InfraServices, Node, ResourceStatus, Shard,
    ShardRole, ShardSpec, Tenant, TenantContext, ValkeyInstance, ValkeyUser, Webroot,
};

pub fn tenant(id: &str, shard_id: Option<&str>) -> Tenant {
    Tenant {
        id: id.to_string(),
        cluster_id: "c1".to_string(),
        shard_id: shard_id.map(str::to_string),
        name: format!("tenant-{id}"),
        uid: 10001,
        sftp_enabled: true,
        ssh_enabled: false,
        quota_bytes: 10 * 1024 * 1024 * 1024,
        brand_id: None,
        status: ResourceStatus::Pending,
    }
}

pub fn shard(id: &str) -> Shard {
    Shard {
        id: id.to_string(),
        cluster_id: "c1".to_string(),
        name: format!("web-{id}"),
        role: ShardRole::Web,
        lb_backend: format!("backend-{id}"),
        config: json!({}),
        status: ResourceStatus::Active,
    }
}

pub fn db_shard(id: &str, primary_node_id: Option<&str>) -> Shard {
    Shard {
        id: id.to_string(),
        cluster_id: "c1".to_string(),
        name: format!("db-{id}"),
        role: ShardRole::Database,
        lb_backend: format!("db-{id}"),
        config: match primary_node_id {
            Some(node_id) => json!({ "primary_node_id": node_id }),
            None => json!({}),
        },
        status: ResourceStatus::Active,
    }
}

pub fn test_node(id: &str) -> Node {
    Node {
        id: id.to_string(),
        cluster_id: "c1".to_string(),
        shard_id: Some("s1".to_string()),
        shard_index: Some(0),
        roles: vec!["web".to_string()],
        hostname: format!("{id}.example.net"),
        status: ResourceStatus::Active,
    }
}

pub fn tenant_context(tenant: Tenant, shard: Option<Shard>, nodes: Vec<Node>) -> TenantContext {
    TenantContext {
        tenant,
        shard,
        nodes,
    }
}

pub fn webroot(id: &str, tenant_id: &str) -> Webroot {
    Webroot {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: format!("site-{id}"),
        runtime: "php".to_string(),
        runtime_version: "8.3".to_string(),
        runtime_config: json!({}),
        public_folder: "public".to_string(),
        env_file_name: None,
        env_shell_source: None,
        status: ResourceStatus::Pending,
    }
}

pub fn fqdn(id: &str, name: &str, webroot_id: Option<&str>, ssl: bool) -> Fqdn {
    Fqdn {
        id: id.to_string(),
        fqdn: name.to_string(),
        webroot_id: webroot_id.map(str::to_string),
        ssl_enabled: ssl,
        status: ResourceStatus::Pending,
    }
}

pub fn fqdn_context(
    fqdn: Fqdn,
    webroot: Option<Webroot>,
    tenant: Tenant,
    shard: Option<Shard>,
    nodes: Vec<Node>,
) -> FqdnContext {
    let lb_backend = shard.as_ref().map(|s| s.lb_backend.clone());
    FqdnContext {
        fqdn,
        webroot,
        tenant,
        shard,
        nodes,
        lb_backend,
    }
}

pub fn certificate(id: &str, fqdn_id: &str, cert_type: CertificateType) -> Certificate {
    Certificate {
        id: id.to_string(),
        fqdn_id: fqdn_id.to_string(),
        cert_type,
        cert_pem: None,
        key_pem: None,
        chain_pem: None,
        issued_at: None,
        expires_at: None,
        active: false,
        status: ResourceStatus::Pending,
    }
}

pub fn cron_job(id: &str, tenant_id: &str, webroot_id: &str) -> CronJob {
    CronJob {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        webroot_id: webroot_id.to_string(),
        schedule: "*/5 * * * *".to_string(),
        command: "php artisan schedule:run".to_string(),
        working_directory: "/var/www".to_string(),
        timeout_seconds: 300,
        max_memory_mb: 256,
        enabled: true,
        status: ResourceStatus::Pending,
    }
}

pub fn cron_job_context(
    cron_job: CronJob,
    webroot: Webroot,
    tenant: Tenant,
    shard: Option<Shard>,
    nodes: Vec<Node>,
) -> CronJobContext {
    CronJobContext {
        cron_job,
        webroot,
        tenant,
        shard,
        nodes,
    }
}

pub fn database(id: &str, tenant_id: &str, shard_id: Option<&str>) -> Database {
    Database {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        shard_id: shard_id.map(str::to_string),
        name: format!("db_{id}"),
        status: ResourceStatus::Active,
    }
}

pub fn valkey_instance(id: &str, tenant_id: &str, shard_id: Option<&str>) -> ValkeyInstance {
    ValkeyInstance {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        shard_id: shard_id.map(str::to_string),
        port: 6400,
        password: "secret".to_string(),
        max_memory_mb: 256,
        status: ResourceStatus::Active,
    }
}

pub fn valkey_user(id: &str, instance_id: &str, username: &str) -> ValkeyUser {
    ValkeyUser {
        id: id.to_string(),
        instance_id: instance_id.to_string(),
        username: username.to_string(),
        password: "hunter2".to_string(),
        acl_rules: vec!["~*".to_string(), "+@all".to_string()],
        status: ResourceStatus::Active,
    }
}

pub fn email_account(id: &str, tenant_id: &str, address: &str) -> EmailAccount {
    EmailAccount {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        address: address.to_string(),
        password_hash: "$2y$10$abcdef".to_string(),
        quota_mb: 2048,
        status: ResourceStatus::Pending,
    }
}

pub fn cluster(id: &str, spec: ClusterSpec) -> Cluster {
    Cluster {
        id: id.to_string(),
        name: format!("cluster-{id}"),
        spec,
        config: json!({ "docker_network": "hosting" }),
        status: ResourceStatus::Pending,
    }
}

pub fn host(id: &str) -> HostMachine {
    HostMachine {
        id: id.to_string(),
        cluster_id: "c1".to_string(),
        hostname: format!("{id}.hosts.example.net"),
        address: format!("10.0.0.{}", id.len()),
    }
}

pub fn cluster_spec(shards: Vec<ShardSpec>, services: InfraServices) -> ClusterSpec {
    ClusterSpec { shards, services }
}
