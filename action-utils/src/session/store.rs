//! In-process session storage

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{SessionData, SessionId};

/// Saves between automatic sweeps of expired sessions
pub const PURGE_EVERY: usize = 256;

/// Sessions kept in memory, shared by clones
///
/// Expired sessions are dropped when loaded, by
/// [`purge_expired`](Self::purge_expired), and by a sweep that runs every
/// [`PURGE_EVERY`] saves.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionData>>>,
    saves: Arc<AtomicUsize>,
}

impl MemorySessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a live session
    #[must_use]
    pub fn load(&self, id: &SessionId) -> Option<SessionData> {
        let data = self.sessions.read().get(id).cloned()?;
        if data.is_expired() {
            self.sessions.write().remove(id);
            tracing::debug!(session_id = %id, "expired session dropped");
            return None;
        }
        Some(data)
    }

    /// Insert or replace a session
    pub fn save(&self, id: SessionId, data: SessionData) {
        self.sessions.write().insert(id, data);

        let saves = self.saves.fetch_add(1, Ordering::Relaxed) + 1;
        if saves % PURGE_EVERY == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = self.len(), "expired sessions purged");
            }
        }
    }

    /// Delete a session
    pub fn remove(&self, id: &SessionId) -> Option<SessionData> {
        self.sessions.write().remove(id)
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired());
        before - sessions.len()
    }

    /// Number of stored sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_save_and_load() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        let mut data = SessionData::new();
        data.flashes.add("notice", "saved");

        store.save(id.clone(), data);
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.flashes.peek("notice"), ["saved"]);
    }

    #[test]
    fn test_clones_share_sessions() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.save(SessionId::generate(), SessionData::new());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_expired_sessions_are_dropped_on_load() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store.save(id.clone(), SessionData::with_expiration(Duration::seconds(-1)));

        assert!(store.load(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let store = MemorySessionStore::new();
        store.save(SessionId::generate(), SessionData::with_expiration(Duration::seconds(-1)));
        store.save(SessionId::generate(), SessionData::new());

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_saves_sweep_expired_sessions() {
        let store = MemorySessionStore::new();
        let stale = SessionId::generate();
        store.save(stale.clone(), SessionData::with_expiration(Duration::seconds(-1)));

        for _ in 1..PURGE_EVERY {
            store.save(SessionId::generate(), SessionData::new());
        }

        assert_eq!(store.len(), PURGE_EVERY - 1);
        assert!(store.remove(&stale).is_none());
    }

    #[test]
    fn test_remove() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store.save(id.clone(), SessionData::new());
        assert!(store.remove(&id).is_some());
        assert!(store.load(&id).is_none());
    }
}
