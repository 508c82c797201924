//! Database migration workflow
//!
//! Moves a MySQL database between database shards: dump on the source
//! primary, import on the target, recreate users, then the atomic shard-id
//! cut-over. Source-side teardown is best-effort; a leftover schema or dump
//! file never undoes a completed migration.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hosting_contracts::activities::MySqlDumpInput;
use hosting_contracts::{tables, Node, ResourceStatus, Shard};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::config::WorkflowConfig;
use crate::error::OrchestrationError;
use crate::status::{set_resource_failed, update_status};

/// Parameters for `MigrateDatabase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateDatabaseParams {
    pub database_id: String,
    pub target_shard_id: String,
}

/// The write-accepting node of a database shard
///
/// Prefers the shard's configured `primary_node_id`; shards without one
/// default to the first listed node.
pub fn db_shard_primary<'a>(shard: &Shard, nodes: &'a [Node]) -> Option<&'a Node> {
    if let Some(primary_id) = shard.primary_node_id() {
        if let Some(node) = nodes.iter().find(|n| n.id == primary_id) {
            return Some(node);
        }
    }
    nodes.first()
}

/// `MigrateDatabase`
pub async fn migrate_database(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    params: MigrateDatabaseParams,
) -> Result<(), OrchestrationError> {
    info!(
        database_id = %params.database_id,
        target_shard_id = %params.target_shard_id,
        "migrating database"
    );
    update_status(ctx, tables::DATABASES, &params.database_id, ResourceStatus::Provisioning)
        .await?;

    if let Err(err) = run_migrate(ctx, config, &params).await {
        set_resource_failed(ctx, tables::DATABASES, &params.database_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_migrate(
    ctx: &dyn WorkflowContext,
    config: &WorkflowConfig,
    params: &MigrateDatabaseParams,
) -> Result<(), OrchestrationError> {
    let database = activities::get_database_by_id(ctx, &params.database_id).await?;

    let source_shard_id = database
        .shard_id
        .as_deref()
        .ok_or_else(|| OrchestrationError::NoShard(database.tenant_id.clone()))?;

    let source_nodes = activities::list_nodes_by_shard(ctx, source_shard_id).await?;
    let target_nodes = activities::list_nodes_by_shard(ctx, &params.target_shard_id).await?;

    let source = source_nodes.first().ok_or_else(|| {
        OrchestrationError::Validation(format!("source shard {source_shard_id} has no nodes"))
    })?;
    let target = target_nodes.first().ok_or_else(|| {
        OrchestrationError::Validation(format!(
            "target shard {} has no nodes",
            params.target_shard_id
        ))
    })?;

    let dump = MySqlDumpInput {
        database: database.name.clone(),
        dump_path: config.migrate_dump_path(&format!("{}.sql.gz", database.name)),
    };

    activities::create_database_on(ctx, &target.id, &database.name).await?;
    activities::dump_mysql_database(ctx, &source.id, &dump).await?;
    activities::import_mysql_database(ctx, &target.id, &dump).await?;

    let users = activities::list_database_users_by_database_id(ctx, &database.id).await?;
    for user in &users {
        activities::create_database_user_on(ctx, &target.id, &database.name, user).await?;
    }

    // Authoritative cut-over: from here, reads resolve to the target shard.
    activities::update_database_shard_id(ctx, &database.id, &params.target_shard_id).await?;

    if let Err(e) = activities::delete_database_on(ctx, &source.id, &database.name).await {
        warn!(node_id = %source.id, error = %e, "failed to drop source database");
    }
    for node in [source, target] {
        if let Err(e) = activities::cleanup_migrate_file(ctx, &node.id, &dump.dump_path).await {
            warn!(node_id = %node.id, error = %e, "failed to remove migration dump");
        }
    }

    update_status(ctx, tables::DATABASES, &params.database_id, ResourceStatus::Active).await?;
    Ok(())
}
