use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sentinel_core::types::SessionId;
use tracing::instrument;

use crate::error::{Result, SessionStoreError};
use crate::types::{HistoryEntry, Session};

fn session_key(id: &SessionId) -> String {
    format!("session:{}", id.as_str())
}

fn history_key(id: &SessionId) -> String {
    format!("history:{}", id.as_str())
}

/// TTL-bounded hot store for session state and bounded conversation history.
///
/// Wraps a `redis::aio::ConnectionManager`, which re-establishes its own
/// connection transparently on drop, so callers never see a dead socket.
#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
}

impl SessionStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }

    #[instrument(skip(self), fields(session = %id))]
    pub async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(session_key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, session), fields(session = %session.id))]
    pub async fn save_session(&self, session: &Session) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(session)?;
        let ttl = session.ttl_secs.max(1);
        let _: () = conn.set_ex(session_key(&session.id), json, ttl).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(session = %id))]
    pub async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(session_key(id)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(session = %id, ttl_secs))]
    pub async fn touch_ttl(&self, id: &SessionId, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.expire(session_key(id), ttl_secs.max(1) as i64).await?;
        Ok(())
    }

    /// Right-push one entry, trim to the last `max_items`, and reset the
    /// TTL — all as a single pipeline so readers never observe a
    /// momentarily over-length list.
    #[instrument(skip(self, entry), fields(session = %id, max_items, ttl_secs))]
    pub async fn append_history(
        &self,
        id: &SessionId,
        entry: &HistoryEntry,
        max_items: usize,
        ttl_secs: u64,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = history_key(id);
        let json = serde_json::to_string(entry)?;
        let keep_from = -(max_items as isize);

        redis::pipe()
            .atomic()
            .rpush(&key, json)
            .ignore()
            .ltrim(&key, keep_from, -1)
            .ignore()
            .expire(&key, ttl_secs.max(1) as i64)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    /// Latest `max_items` entries, oldest first.
    #[instrument(skip(self), fields(session = %id, max_items))]
    pub async fn get_history(&self, id: &SessionId, max_items: usize) -> Result<Vec<HistoryEntry>> {
        let mut conn = self.conn.clone();
        let key = history_key(id);
        let keep_from = -(max_items as isize);
        let raw: Vec<String> = conn.lrange(&key, keep_from, -1).await?;
        raw.into_iter()
            .map(|s| serde_json::from_str(&s).map_err(SessionStoreError::from))
            .collect()
    }

    #[instrument(skip(self), fields(session = %id))]
    pub async fn clear_history(&self, id: &SessionId) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(history_key(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_and_stable() {
        let id = SessionId::from("tg_42");
        assert_eq!(session_key(&id), "session:tg_42");
        assert_eq!(history_key(&id), "history:tg_42");
    }
}
