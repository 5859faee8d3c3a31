use chrono::{Duration as ChronoDuration, Utc};
use sentinel_core::types::TenantId;
use sentinel_history::HistoryStore;
use tracing::instrument;

use crate::error::Result;
use crate::types::{CleanupReport, RetentionPolicy};

/// Deletes messages older than `policy.messages_retention_days`, then
/// sessions older than `policy.sessions_retention_days`, in batches of
/// `batch_size`. Idempotent: a re-run against the same cutoff deletes 0.
#[instrument(skip(history, policy), fields(tenant = %tenant_id, batch_size))]
pub async fn cleanup_tenant(
    history: &HistoryStore,
    tenant_id: &TenantId,
    policy: RetentionPolicy,
    batch_size: i64,
) -> Result<CleanupReport> {
    let messages_cutoff = Utc::now() - ChronoDuration::days(policy.messages_retention_days);
    let sessions_cutoff = Utc::now() - ChronoDuration::days(policy.sessions_retention_days);

    let mut messages_deleted = 0u64;
    loop {
        let deleted = history.delete_messages_before(tenant_id, messages_cutoff, batch_size).await?;
        messages_deleted += deleted;
        if deleted < batch_size as u64 {
            break;
        }
    }

    let mut sessions_deleted = 0u64;
    loop {
        let deleted = history.delete_sessions_before(tenant_id, sessions_cutoff, batch_size).await?;
        sessions_deleted += deleted;
        if deleted < batch_size as u64 {
            break;
        }
    }

    Ok(CleanupReport { messages_deleted, sessions_deleted })
}

/// Dry-run counterpart of `cleanup_tenant` — counts without deleting.
#[instrument(skip(history, policy), fields(tenant = %tenant_id))]
pub async fn estimate(
    history: &HistoryStore,
    tenant_id: &TenantId,
    policy: RetentionPolicy,
) -> Result<CleanupReport> {
    let messages_cutoff = Utc::now() - ChronoDuration::days(policy.messages_retention_days);
    let sessions_cutoff = Utc::now() - ChronoDuration::days(policy.sessions_retention_days);

    let messages_deleted = history.count_messages_before(tenant_id, messages_cutoff).await? as u64;
    let sessions_deleted = history.count_sessions_before(tenant_id, sessions_cutoff).await? as u64;

    Ok(CleanupReport { messages_deleted, sessions_deleted })
}

/// Right-to-erasure: unconditional delete of every row for a tenant.
#[instrument(skip(history), fields(tenant = %tenant_id))]
pub async fn delete_all_tenant_data(history: &HistoryStore, tenant_id: &TenantId) -> Result<()> {
    history.delete_all_tenant_data(tenant_id).await?;
    Ok(())
}
