//! S3 bucket workflows
//!
//! Buckets live behind the object-storage admin API rather than on shard
//! nodes, so there is no per-node dispatch and no shard guard.

use tracing::info;

use hosting_contracts::{tables, ResourceStatus};
use hosting_engine::WorkflowContext;

use crate::activities;
use crate::error::OrchestrationError;
use crate::status::{set_resource_failed, update_status};

/// `CreateS3Bucket`
pub async fn create_s3_bucket(
    ctx: &dyn WorkflowContext,
    bucket_id: String,
) -> Result<(), OrchestrationError> {
    info!(bucket_id, "creating s3 bucket");
    update_status(ctx, tables::S3_BUCKETS, &bucket_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_create(ctx, &bucket_id).await {
        set_resource_failed(ctx, tables::S3_BUCKETS, &bucket_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_create(ctx: &dyn WorkflowContext, bucket_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_s3_bucket_context(ctx, bucket_id).await?;

    activities::create_bucket(ctx, &context.tenant.id, &context.bucket.name).await?;
    if let Some(quota) = context.bucket.quota_bytes {
        activities::set_bucket_quota(ctx, &context.bucket.name, quota).await?;
    }

    update_status(ctx, tables::S3_BUCKETS, bucket_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `UpdateS3Bucket`: re-apply quota
pub async fn update_s3_bucket(
    ctx: &dyn WorkflowContext,
    bucket_id: String,
) -> Result<(), OrchestrationError> {
    info!(bucket_id, "updating s3 bucket");
    update_status(ctx, tables::S3_BUCKETS, &bucket_id, ResourceStatus::Provisioning).await?;

    if let Err(err) = run_update(ctx, &bucket_id).await {
        set_resource_failed(ctx, tables::S3_BUCKETS, &bucket_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_update(ctx: &dyn WorkflowContext, bucket_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_s3_bucket_context(ctx, bucket_id).await?;

    if let Some(quota) = context.bucket.quota_bytes {
        activities::set_bucket_quota(ctx, &context.bucket.name, quota).await?;
    }

    update_status(ctx, tables::S3_BUCKETS, bucket_id, ResourceStatus::Active).await?;
    Ok(())
}

/// `DeleteS3Bucket`
pub async fn delete_s3_bucket(
    ctx: &dyn WorkflowContext,
    bucket_id: String,
) -> Result<(), OrchestrationError> {
    info!(bucket_id, "deleting s3 bucket");
    update_status(ctx, tables::S3_BUCKETS, &bucket_id, ResourceStatus::Deleting).await?;

    if let Err(err) = run_delete(ctx, &bucket_id).await {
        set_resource_failed(ctx, tables::S3_BUCKETS, &bucket_id, &err).await;
        return Err(err);
    }

    Ok(())
}

async fn run_delete(ctx: &dyn WorkflowContext, bucket_id: &str) -> Result<(), OrchestrationError> {
    let context = activities::get_s3_bucket_context(ctx, bucket_id).await?;

    activities::delete_bucket(ctx, &context.bucket.name).await?;

    update_status(ctx, tables::S3_BUCKETS, bucket_id, ResourceStatus::Deleted).await?;
    Ok(())
}
