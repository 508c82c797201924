//! Managed-DNS workflows
//!
//! Zones and records are written into the authoritative DNS backend; the
//! core DB rows are the source of truth and the backend write is the
//! provisioning step.

use tracing::info;

use hosting_contracts::{tables, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::status::{set_resource_failed, update_status};

/// `CreateZone`: create the zone with its SOA/NS skeleton
pub async fn create_zone(
    ctx: &dyn WorkflowContext,
    zone_id: String,
) -> Result<(), OrchestrationError> {
    info!(zone_id, "creating dns zone");
    update_status(ctx, tables::ZONES, &zone_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_create_zone(ctx, &zone_id).await {
        set_resource_failed(ctx, tables::ZONES, &zone_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create_zone(ctx: &dyn WorkflowContext, zone_id: &str) -> Result<(), OrchestrationError> {
    let zone = activities::get_zone_by_id(ctx, zone_id).await?;

    activities::create_zone_backend(ctx, &zone).await?;

    update_status(ctx, tables::ZONES, zone_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteZone`: drop the zone and all its records from the backend
pub async fn delete_zone(
    ctx: &dyn WorkflowContext,
    zone_id: String,
) -> Result<(), OrchestrationError> {
    info!(zone_id, "deleting dns zone");
    update_status(ctx, tables::ZONES, &zone_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete_zone(ctx, &zone_id).await {
        set_resource_failed(ctx, tables::ZONES, &zone_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete_zone(ctx: &dyn WorkflowContext, zone_id: &str) -> Result<(), OrchestrationError> {
    let zone = activities::get_zone_by_id(ctx, zone_id).await?;

    activities::delete_zone_backend(ctx, &zone.id, &zone.name).await?;

    update_status(ctx, tables::ZONES, zone_id, ResourceStatus::Deleted).await?;
    Ok(())
}

/// `CreateZoneRecord`
pub async fn create_zone_record(
    ctx: &dyn WorkflowContext,
    record_id: String,
) -> Result<(), OrchestrationError> {
    info!(record_id, "creating zone record");
    update_status(ctx, tables::ZONE_RECORDS, &record_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_record(ctx, &record_id, RecordOp::Create).await {
        set_resource_failed(ctx, tables::ZONE_RECORDS, &record_id, &err).await;
        return Err(err);
    }

    Ok(())
}

/// `UpdateZoneRecord`
pub async fn update_zone_record(
    ctx: &dyn WorkflowContext,
    record_id: String,
) -> Result<(), OrchestrationError> {
    info!(record_id, "updating zone record");
    update_status(ctx, tables::ZONE_RECORDS, &record_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_record(ctx, &record_id, RecordOp::Update).await {
        set_resource_failed(ctx, tables::ZONE_RECORDS, &record_id, &err).await;
        return Err(err);
    }

    Ok(())
}

/// `DeleteZoneRecord`
pub async fn delete_zone_record(
    ctx: &dyn WorkflowContext,
    record_id: String,
) -> Result<(), OrchestrationError> {
    info!(record_id, "deleting zone record");
    update_status(ctx, tables::ZONE_RECORDS, &record_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_record(ctx, &record_id, RecordOp::Delete).await {
        set_resource_failed(ctx, tables::ZONE_RECORDS, &record_id, &err).await;
        return Err(err);
    }

    Ok(())
}

enum RecordOp {
    Create,
    Update,
    Delete,
}

async fn run_record(
    ctx: &dyn WorkflowContext,
    record_id: &str,
    op: RecordOp,
) -> Result<(), OrchestrationError> {
    let record = activities::get_zone_record_by_id(ctx, record_id).await?;

    let final_status = match op {
        RecordOp::Create => {
            activities::create_zone_record_backend(ctx, &record).await?;
            ResourceStatus::Active
        }
        RecordOp::Update => {
            activities::update_zone_record_backend(ctx, &record).await?;
            ResourceStatus::Active
        }
        RecordOp::Delete => {
            activities::delete_zone_record_backend(ctx, &record).await?;
            ResourceStatus::Deleted
        }
    };

    update_status(ctx, tables::ZONE_RECORDS, record_id, final_status).await?;
    Ok(())
}
