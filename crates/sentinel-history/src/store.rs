use std::time::Duration;

use chrono::{DateTime, Utc};
use sentinel_core::types::{ChannelKind, MessageKind, SessionState, TenantId};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::instrument;

use crate::error::Result;
use crate::types::{MessageFilter, MessageRecord, Page, SessionFilter, SessionSnapshot};

/// Durable, tenant-scoped message log and session-snapshot store.
///
/// Every write happens inside a single transaction per request; reads are
/// plain pooled queries.
#[derive(Clone)]
pub struct HistoryStore {
    pool: PgPool,
}

impl HistoryStore {
    pub async fn connect(url: &str, max_connections: u32, connect_timeout_secs: u64) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, msg), fields(tenant = %msg.tenant_id, session = %msg.session_id))]
    pub async fn insert_message(&self, msg: &MessageRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO messages
                (id, tenant_id, session_id, channel_kind, kind, text, media_url,
                 is_from_bot, from_user_id, from_user_name, metadata, created_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)"#,
        )
        .bind(msg.id)
        .bind(msg.tenant_id.as_str())
        .bind(&msg.session_id)
        .bind(msg.channel_kind.to_string())
        .bind(msg.kind.to_string())
        .bind(&msg.text)
        .bind(&msg.media_url)
        .bind(msg.is_from_bot)
        .bind(&msg.from_user_id)
        .bind(&msg.from_user_name)
        .bind(&msg.metadata)
        .bind(msg.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create-or-update, preserving `created_at` from the first insert.
    #[instrument(skip(self, snapshot), fields(tenant = %snapshot.tenant_id, session = %snapshot.id))]
    pub async fn upsert_session(&self, snapshot: &SessionSnapshot) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions
                (id, tenant_id, external_user_id, channel_kind, state, context,
                 crm_client_ref, crm_appointment_ref, created_at, last_activity, updated_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,now())
               ON CONFLICT (id) DO UPDATE SET
                 state = EXCLUDED.state,
                 context = EXCLUDED.context,
                 crm_client_ref = EXCLUDED.crm_client_ref,
                 crm_appointment_ref = EXCLUDED.crm_appointment_ref,
                 last_activity = EXCLUDED.last_activity,
                 updated_at = now()"#,
        )
        .bind(&snapshot.id)
        .bind(snapshot.tenant_id.as_str())
        .bind(&snapshot.external_user_id)
        .bind(snapshot.channel_kind.to_string())
        .bind(snapshot.state.to_string())
        .bind(&snapshot.context)
        .bind(&snapshot.crm_client_ref)
        .bind(&snapshot.crm_appointment_ref)
        .bind(snapshot.created_at)
        .bind(snapshot.last_activity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(tenant = %tenant_id, session = %session_id))]
    pub async fn get_session(&self, tenant_id: &TenantId, session_id: &str) -> Result<Option<SessionSnapshot>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"SELECT id, tenant_id, external_user_id, channel_kind, state, context,
                      crm_client_ref, crm_appointment_ref, created_at, last_activity
               FROM sessions WHERE tenant_id = $1 AND id = $2"#,
        )
        .bind(tenant_id.as_str())
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_snapshot))
    }

    /// Paginated session snapshots, filterable by channel, state, and an
    /// activity date range.
    #[instrument(skip(self, filter), fields(tenant = %tenant_id))]
    pub async fn list_sessions(
        &self,
        tenant_id: &TenantId,
        filter: &SessionFilter,
        page: Page,
    ) -> Result<Vec<SessionSnapshot>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"SELECT id, tenant_id, external_user_id, channel_kind, state, context,
                      crm_client_ref, crm_appointment_ref, created_at, last_activity
               FROM sessions
               WHERE tenant_id = $1
                 AND ($2::text IS NULL OR channel_kind = $2)
                 AND ($3::text IS NULL OR state = $3)
                 AND ($4::timestamptz IS NULL OR last_activity >= $4)
                 AND ($5::timestamptz IS NULL OR last_activity <= $5)
               ORDER BY last_activity DESC
               LIMIT $6 OFFSET $7"#,
        )
        .bind(tenant_id.as_str())
        .bind(filter.channel_kind.map(|c| c.to_string()))
        .bind(filter.state.map(|s| s.to_string()))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_snapshot).collect())
    }

    #[instrument(skip(self, filter), fields(tenant = %tenant_id))]
    pub async fn list_messages(
        &self,
        tenant_id: &TenantId,
        filter: &MessageFilter,
        page: Page,
    ) -> Result<Vec<MessageRecord>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"SELECT id, tenant_id, session_id, channel_kind, kind, text, media_url,
                      is_from_bot, from_user_id, from_user_name, metadata, created_at
               FROM messages
               WHERE tenant_id = $1
                 AND ($2::text IS NULL OR channel_kind = $2)
                 AND ($3::text IS NULL OR session_id = $3)
                 AND ($4::bool IS NULL OR is_from_bot = $4)
               ORDER BY created_at DESC
               LIMIT $5 OFFSET $6"#,
        )
        .bind(tenant_id.as_str())
        .bind(filter.channel_kind.map(|c| c.to_string()))
        .bind(&filter.session_id)
        .bind(filter.is_from_bot)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_record).collect())
    }

    #[instrument(skip(self), fields(tenant = %tenant_id))]
    pub async fn count_by_channel(&self, tenant_id: &TenantId) -> Result<Vec<(ChannelKind, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT channel_kind, COUNT(*) FROM messages WHERE tenant_id = $1 GROUP BY channel_kind",
        )
        .bind(tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(k, n)| k.parse::<ChannelKind>().ok().map(|k| (k, n)))
            .collect())
    }

    #[instrument(skip(self), fields(tenant = %tenant_id))]
    pub async fn count_by_state(&self, tenant_id: &TenantId) -> Result<Vec<(SessionState, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT state, COUNT(*) FROM sessions WHERE tenant_id = $1 GROUP BY state",
        )
        .bind(tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(s, n)| s.parse::<SessionState>().ok().map(|s| (s, n)))
            .collect())
    }

    /// Sessions created in the trailing `days` days that both completed and
    /// produced a booked CRM appointment — the conversion-rate numerator.
    /// Backed by `idx_sessions_appointment`, the partial index on
    /// `crm_appointment_ref IS NOT NULL`.
    #[instrument(skip(self), fields(tenant = %tenant_id, days))]
    pub async fn count_converted_in_window(&self, tenant_id: &TenantId, days: i32) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM sessions
               WHERE tenant_id = $1
                 AND state = $2
                 AND crm_appointment_ref IS NOT NULL
                 AND created_at >= now() - make_interval(days => $3)"#,
        )
        .bind(tenant_id.as_str())
        .bind(SessionState::Completed.to_string())
        .bind(days)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Total sessions created in the trailing `days` days — the
    /// conversion-rate denominator.
    #[instrument(skip(self), fields(tenant = %tenant_id, days))]
    pub async fn count_sessions_in_window(&self, tenant_id: &TenantId, days: i32) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE tenant_id = $1 AND created_at >= now() - make_interval(days => $2)",
        )
        .bind(tenant_id.as_str())
        .bind(days)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Daily message counts over the trailing `days` days, oldest first.
    #[instrument(skip(self), fields(tenant = %tenant_id, days))]
    pub async fn daily_message_counts(
        &self,
        tenant_id: &TenantId,
        days: i32,
    ) -> Result<Vec<(DateTime<Utc>, i64)>> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            r#"SELECT date_trunc('day', created_at) AS day, COUNT(*)
               FROM messages
               WHERE tenant_id = $1 AND created_at >= now() - make_interval(days => $2)
               GROUP BY day
               ORDER BY day ASC"#,
        )
        .bind(tenant_id.as_str())
        .bind(days)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete messages older than `cutoff`, capped at `batch_size` rows per
    /// call. Callers loop until the returned count drops below `batch_size`.
    #[instrument(skip(self), fields(tenant = %tenant_id, batch_size))]
    pub async fn delete_messages_before(
        &self,
        tenant_id: &TenantId,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"DELETE FROM messages WHERE id IN (
                 SELECT id FROM messages
                 WHERE tenant_id = $1 AND created_at < $2
                 LIMIT $3
               )"#,
        )
        .bind(tenant_id.as_str())
        .bind(cutoff)
        .bind(batch_size)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose `last_activity` is older than `cutoff`, capped
    /// at `batch_size` rows per call.
    #[instrument(skip(self), fields(tenant = %tenant_id, batch_size))]
    pub async fn delete_sessions_before(
        &self,
        tenant_id: &TenantId,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"DELETE FROM sessions WHERE id IN (
                 SELECT id FROM sessions
                 WHERE tenant_id = $1 AND last_activity < $2
                 LIMIT $3
               )"#,
        )
        .bind(tenant_id.as_str())
        .bind(cutoff)
        .bind(batch_size)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(tenant = %tenant_id))]
    pub async fn count_messages_before(&self, tenant_id: &TenantId, cutoff: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE tenant_id = $1 AND created_at < $2",
        )
        .bind(tenant_id.as_str())
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(tenant = %tenant_id))]
    pub async fn count_sessions_before(&self, tenant_id: &TenantId, cutoff: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE tenant_id = $1 AND last_activity < $2",
        )
        .bind(tenant_id.as_str())
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Every tenant id with at least one session or message on file — the
    /// sweep universe for the scheduled retention pass.
    #[instrument(skip(self))]
    pub async fn list_active_tenants(&self) -> Result<Vec<TenantId>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"SELECT DISTINCT tenant_id FROM sessions
               UNION
               SELECT DISTINCT tenant_id FROM messages"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TenantId::from).collect())
    }

    /// Unconditional delete of every row for a tenant — right-to-erasure.
    #[instrument(skip(self), fields(tenant = %tenant_id))]
    pub async fn delete_all_tenant_data(&self, tenant_id: &TenantId) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE tenant_id = $1")
            .bind(tenant_id.as_str())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM sessions WHERE tenant_id = $1")
            .bind(tenant_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    tenant_id: String,
    external_user_id: String,
    channel_kind: String,
    state: String,
    context: serde_json::Value,
    crm_client_ref: Option<String>,
    crm_appointment_ref: Option<String>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl SessionRow {
    fn into_snapshot(self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            tenant_id: TenantId::from(self.tenant_id),
            external_user_id: self.external_user_id,
            channel_kind: self.channel_kind.parse::<ChannelKind>().unwrap_or(ChannelKind::Web),
            state: self.state.parse::<SessionState>().unwrap_or(SessionState::Initiated),
            context: self.context,
            crm_client_ref: self.crm_client_ref,
            crm_appointment_ref: self.crm_appointment_ref,
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: uuid::Uuid,
    tenant_id: String,
    session_id: String,
    channel_kind: String,
    kind: String,
    text: Option<String>,
    media_url: Option<String>,
    is_from_bot: bool,
    from_user_id: Option<String>,
    from_user_name: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_record(self) -> MessageRecord {
        MessageRecord {
            id: self.id,
            tenant_id: TenantId::from(self.tenant_id),
            session_id: self.session_id,
            channel_kind: self
                .channel_kind
                .parse::<ChannelKind>()
                .unwrap_or(ChannelKind::Web),
            kind: self.kind.parse::<MessageKind>().unwrap_or(MessageKind::Text),
            text: self.text,
            media_url: self.media_url,
            is_from_bot: self.is_from_bot,
            from_user_id: self.from_user_id,
            from_user_name: self.from_user_name,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}
