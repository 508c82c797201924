//! Scheduled health and reconciliation sweeps
//!
//! All three sweeps share one error policy: the enumeration read failing
//! fails the sweep, anything per-item is logged and skipped. Degradation
//! raises deduplicated incidents; recovery flips the resource back and
//! auto-resolves them.

use tracing::{info, warn};

use hosting_contracts::{
    tables, CreateIncidentParams, IncidentSeverity, Node, ResourceStatus, Shard, ShardRole,
};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::config::WorkflowConfig;
use crate::database::db_shard_primary;
use crate::error::OrchestrationError;
use crate::status::{auto_resolve_incidents, create_incident, update_status};

/// `CheckReplicationHealth`: probe every database shard's replicas
pub async fn check_replication_health(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
) -> Result<(), OrchestrationError> {
    let shards = activities::list_shards_by_role(ctx, ShardRole::Database).await?;

    for shard in &shards {
        if !matches!(shard.status, ResourceStatus::Active | ResourceStatus::Degraded) {
            continue;
        }

        if let Err(e) = check_shard_replication(ctx, config, shard).await {
            warn!(shard_id = %shard.id, error = %e, "replication check failed for shard");
        }
    }

    Ok(())
}

async fn check_shard_replication(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    shard: &Shard,
) -> Result<(), OrchestrationError> {
    let nodes = activities::list_nodes_by_shard(ctx, &shard.id).await?;

    let primary_id = match db_shard_primary(shard, &nodes) {
        Some(primary) => primary.id.clone(),
        None => return Ok(()),
    };

    let replicas: Vec<&Node> = nodes.iter().filter(|n| n.id != primary_id).collect();

    let mut broken = false;
    let mut lagged = false;

    for replica in &replicas {
        match activities::get_replication_status(ctx, &replica.id).await {
            Ok(status) if status.is_broken() => {
                warn!(shard_id = %shard.id, replica = %replica.id, "replication threads stopped");
                broken = true;
            }
            Ok(status) => {
                if status.seconds_behind.unwrap_or(0) > config.replication_lag_threshold_secs {
                    warn!(
                        shard_id = %shard.id,
                        replica = %replica.id,
                        seconds_behind = status.seconds_behind,
                        "replication lagging"
                    );
                    lagged = true;
                }
            }
            Err(e) => {
                // An unreachable replica is indistinguishable from a broken
                // one for alerting purposes.
                warn!(shard_id = %shard.id, replica = %replica.id, error = %e,
                    "replication status probe failed");
                broken = true;
            }
        }
    }

    if broken || lagged {
        update_status(ctx, tables::SHARDS, &shard.id, ResourceStatus::Degraded).await?;

        let (incident_type, severity, title) = if broken {
            (
                "replication_broken",
                IncidentSeverity::Critical,
                format!("replication broken on shard {}", shard.name),
            )
        } else {
            (
                "replication_lag",
                IncidentSeverity::Warning,
                format!("replication lagging on shard {}", shard.name),
            )
        };

        create_incident(
            ctx,
            CreateIncidentParams {
                dedupe_key: format!("{incident_type}:{}", shard.id),
                incident_type: incident_type.to_string(),
                severity,
                title,
                detail: format!("shard {} has unhealthy replicas", shard.id),
                resource_type: Some(tables::SHARDS.to_string()),
                resource_id: Some(shard.id.clone()),
                source: "CheckReplicationHealth".to_string(),
            },
        )
        .await;
    } else if shard.status == ResourceStatus::Degraded {
        update_status(ctx, tables::SHARDS, &shard.id, ResourceStatus::Active).await?;
        auto_resolve_incidents(
            ctx,
            tables::SHARDS,
            &shard.id,
            "replication_",
            "all replicas healthy",
        )
        .await;
    }

    Ok(())
}

/// `CheckCephFSHealth`: verify the shared filesystem mount on every web node
pub async fn check_cephfs_health(ctx: &dyn WorkflowContext) -> Result<(), OrchestrationError> {
    let shards = activities::list_shards_by_role(ctx, ShardRole::Web).await?;

    for shard in &shards {
        let nodes = match activities::list_nodes_by_shard(ctx, &shard.id).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(shard_id = %shard.id, error = %e, "failed to list shard nodes");
                continue;
            }
        };

        for node in &nodes {
            match activities::check_cephfs_mount(ctx, &node.id).await {
                Ok(status) if !status.mounted => {
                    create_incident(
                        ctx,
                        CreateIncidentParams {
                            dedupe_key: format!("cephfs_unmounted:{}", node.id),
                            incident_type: "cephfs_unmounted".to_string(),
                            severity: IncidentSeverity::Critical,
                            title: format!("CephFS unmounted on node {}", node.hostname),
                            detail: status.detail.unwrap_or_default(),
                            resource_type: Some(tables::NODES.to_string()),
                            resource_id: Some(node.id.clone()),
                            source: "CheckCephFSHealth".to_string(),
                        },
                    )
                    .await;
                }
                Ok(_) => {
                    auto_resolve_incidents(
                        ctx,
                        tables::NODES,
                        &node.id,
                        "cephfs_",
                        "mount present",
                    )
                    .await;
                }
                Err(e) => {
                    warn!(node_id = %node.id, error = %e, "cephfs mount probe failed");
                }
            }
        }
    }

    Ok(())
}

/// `CollectResourceUsage`: sample one node per shard and upsert the entries
pub async fn collect_resource_usage(ctx: &dyn WorkflowContext) -> Result<(), OrchestrationError> {
    for role in [ShardRole::Web, ShardRole::Database, ShardRole::Valkey] {
        let shards = activities::list_shards_by_role(ctx, role).await?;

        for shard in &shards {
            if let Err(e) = collect_shard_usage(ctx, shard, role).await {
                warn!(shard_id = %shard.id, error = %e, "usage collection failed for shard");
            }
        }
    }

    Ok(())
}

async fn collect_shard_usage(
    ctx: &dyn WorkflowContext,
    shard: &Shard,
    role: ShardRole,
) -> Result<(), OrchestrationError> {
    let nodes = activities::list_nodes_by_shard(ctx, &shard.id).await?;

    // Usage is shard-wide; one node answers for the shard. Database shards
    // are sampled on the primary so the numbers reflect the writable copy.
    let sampled = match role {
        ShardRole::Database => db_shard_primary(shard, &nodes),
        _ => nodes.first(),
    };

    let Some(node) = sampled else {
        return Ok(());
    };

    let entries = activities::get_resource_usage(ctx, &node.id, role).await?;
    info!(shard_id = %shard.id, node_id = %node.id, count = entries.len(), "collected usage");

    for entry in &entries {
        if let Err(e) = activities::upsert_resource_usage(ctx, entry).await {
            warn!(
                resource_id = %entry.resource_id,
                metric = %entry.metric,
                error = %e,
                "failed to upsert usage entry"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{db_shard, shard, test_node};
    use hosting_contracts::activities::names;
    use hosting_engine::testing::ScriptedContext;
    use serde_json::json;

    fn replication(io: bool, sql: bool, behind: u64) -> serde_json::Value {
        json!({ "io_running": io, "sql_running": sql, "seconds_behind": behind })
    }

    #[tokio::test]
    async fn test_broken_replica_degrades_shard_and_raises_critical() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::LIST_SHARDS_BY_ROLE,
            json!([db_shard("s1", Some("n1"))]),
        );
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(names::GET_REPLICATION_STATUS, replication(false, true, 0));
        ctx.respond(names::CREATE_INCIDENT, json!({ "id": "i1", "created": true }));

        check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap();

        // only the replica is probed, never the primary
        assert_eq!(ctx.calls_of(names::GET_REPLICATION_STATUS).len(), 1);
        assert_eq!(
            ctx.calls_of(names::GET_REPLICATION_STATUS)[0].task_queue.as_deref(),
            Some("node-n2")
        );

        let status = &ctx.calls_of(names::UPDATE_RESOURCE_STATUS)[0].input;
        assert_eq!(status["table"], "shards");
        assert_eq!(status["status"], "degraded");

        let incident = &ctx.calls_of(names::CREATE_INCIDENT)[0].input;
        assert_eq!(incident["dedupe_key"], "replication_broken:s1");
        assert_eq!(incident["severity"], "critical");
    }

    #[tokio::test]
    async fn test_lagged_replica_raises_warning() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::LIST_SHARDS_BY_ROLE,
            json!([db_shard("s1", Some("n1"))]),
        );
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(names::GET_REPLICATION_STATUS, replication(true, true, 900));
        ctx.respond(names::CREATE_INCIDENT, json!({ "id": "i1", "created": true }));

        check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap();

        let incident = &ctx.calls_of(names::CREATE_INCIDENT)[0].input;
        assert_eq!(incident["dedupe_key"], "replication_lag:s1");
        assert_eq!(incident["severity"], "warning");
    }

    #[tokio::test]
    async fn test_recovered_shard_goes_active_and_auto_resolves() {
        let ctx = ScriptedContext::new();
        let mut degraded = db_shard("s1", Some("n1"));
        degraded.status = ResourceStatus::Degraded;
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([degraded]));
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(names::GET_REPLICATION_STATUS, replication(true, true, 3));
        ctx.respond(names::AUTO_RESOLVE_INCIDENTS, json!(2));

        check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap();

        let status = &ctx.calls_of(names::UPDATE_RESOURCE_STATUS)[0].input;
        assert_eq!(status["status"], "active");

        let resolve = &ctx.calls_of(names::AUTO_RESOLVE_INCIDENTS)[0].input;
        assert_eq!(resolve["type_prefix"], "replication_");
        assert_eq!(resolve["resource_id"], "s1");
    }

    #[tokio::test]
    async fn test_healthy_active_shard_makes_no_changes() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::LIST_SHARDS_BY_ROLE,
            json!([db_shard("s1", Some("n1"))]),
        );
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(names::GET_REPLICATION_STATUS, replication(true, true, 0));

        check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap();

        assert!(ctx.calls_of(names::UPDATE_RESOURCE_STATUS).is_empty());
        assert!(ctx.calls_of(names::CREATE_INCIDENT).is_empty());
        assert!(ctx.calls_of(names::AUTO_RESOLVE_INCIDENTS).is_empty());
    }

    #[tokio::test]
    async fn test_per_shard_failure_does_not_stop_sweep() {
        let ctx = ScriptedContext::new();
        ctx.respond(
            names::LIST_SHARDS_BY_ROLE,
            json!([db_shard("s1", None), db_shard("s2", None)]),
        );
        ctx.fail(
            names::LIST_NODES_BY_SHARD,
            hosting_engine::ActivityError::retryable("timeout"),
        );
        ctx.respond(names::LIST_NODES_BY_SHARD, json!([test_node("n1")]));

        // first shard's node listing fails; second shard still processed
        check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap();

        assert_eq!(ctx.calls_of(names::LIST_NODES_BY_SHARD).len(), 2);
    }

    #[tokio::test]
    async fn test_enumeration_failure_stops_sweep() {
        let ctx = ScriptedContext::new();
        ctx.fail(
            names::LIST_SHARDS_BY_ROLE,
            hosting_engine::ActivityError::retryable("db down"),
        );

        let err = check_replication_health(&ctx, &WorkflowConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "upstream_activity_error");
    }

    #[tokio::test]
    async fn test_cephfs_unmounted_raises_incident_mounted_resolves() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([shard("s1")]));
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(
            names::CHECK_CEPHFS_MOUNT,
            json!({ "mounted": false, "detail": "mount point empty" }),
        );
        ctx.respond(names::CREATE_INCIDENT, json!({ "id": "i1", "created": true }));
        ctx.respond(names::CHECK_CEPHFS_MOUNT, json!({ "mounted": true, "detail": null }));
        ctx.respond(names::AUTO_RESOLVE_INCIDENTS, json!(1));

        check_cephfs_health(&ctx).await.unwrap();

        let incident = &ctx.calls_of(names::CREATE_INCIDENT)[0].input;
        assert_eq!(incident["dedupe_key"], "cephfs_unmounted:n1");
        assert_eq!(incident["severity"], "critical");

        let resolve = &ctx.calls_of(names::AUTO_RESOLVE_INCIDENTS)[0].input;
        assert_eq!(resolve["resource_id"], "n2");
        assert_eq!(resolve["type_prefix"], "cephfs_");
    }

    #[tokio::test]
    async fn test_collect_usage_samples_primary_for_db_shards() {
        let ctx = ScriptedContext::new();
        // web sweep: no shards
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([]));
        // database sweep: one shard with explicit primary n2
        ctx.respond(
            names::LIST_SHARDS_BY_ROLE,
            json!([db_shard("s1", Some("n2"))]),
        );
        ctx.respond(
            names::LIST_NODES_BY_SHARD,
            json!([test_node("n1"), test_node("n2")]),
        );
        ctx.respond(
            names::GET_RESOURCE_USAGE,
            json!([
                { "resource_type": "databases", "resource_id": "d1", "metric": "disk_bytes", "value": 42 },
                { "resource_type": "databases", "resource_id": "d2", "metric": "disk_bytes", "value": 7 },
            ]),
        );
        // valkey sweep: no shards
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([]));

        collect_resource_usage(&ctx).await.unwrap();

        let usage = ctx.calls_of(names::GET_RESOURCE_USAGE);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].task_queue.as_deref(), Some("node-n2"));

        assert_eq!(ctx.calls_of(names::UPSERT_RESOURCE_USAGE).len(), 2);
    }

    #[tokio::test]
    async fn test_collect_usage_upsert_failure_continues() {
        let ctx = ScriptedContext::new();
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([shard("s1")]));
        ctx.respond(names::LIST_NODES_BY_SHARD, json!([test_node("n1")]));
        ctx.respond(
            names::GET_RESOURCE_USAGE,
            json!([
                { "resource_type": "webroots", "resource_id": "w1", "metric": "disk_bytes", "value": 1 },
                { "resource_type": "webroots", "resource_id": "w2", "metric": "disk_bytes", "value": 2 },
            ]),
        );
        ctx.fail(
            names::UPSERT_RESOURCE_USAGE,
            hosting_engine::ActivityError::retryable("conflict"),
        );
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([]));
        ctx.respond(names::LIST_SHARDS_BY_ROLE, json!([]));

        collect_resource_usage(&ctx).await.unwrap();

        assert_eq!(ctx.calls_of(names::UPSERT_RESOURCE_USAGE).len(), 2);
    }
}
