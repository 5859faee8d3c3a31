use std::sync::Arc;

use dashmap::DashMap;
use sentinel_core::types::SessionId;
use tokio::sync::Mutex;

/// Per-session serialization built on the same `DashMap`-keyed concurrent-map
/// pattern used elsewhere for shared per-key state. Strict cross-session
/// ordering is never required; this only guarantees that two messages for
/// the same session don't interleave their state transitions.
#[derive(Default)]
pub struct SessionLockTable {
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionLockTable {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    pub fn lock_for(&self, id: &SessionId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_session_id_yields_the_same_lock() {
        let table = SessionLockTable::new();
        let id = SessionId::from("tg_42");
        let a = table.lock_for(&id);
        let b = table.lock_for(&id);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
