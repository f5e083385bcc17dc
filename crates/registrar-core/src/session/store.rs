//! Concurrent per-user session store.
//!
//! Each session sits behind its own async mutex, so turns for one user run
//! one at a time while different users proceed in parallel. Handles are
//! cloned out of the map before locking; no `DashMap` guard is ever held
//! across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use registrar_types::session::{Session, SessionSnapshot};
use tokio::sync::Mutex;
use tracing::debug;

/// Shared handle to one user's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions keyed by user id. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the session for `user_id`, created on first use.
    pub fn handle(&self, user_id: &str) -> SessionHandle {
        if let Some(existing) = self.inner.get(user_id) {
            return Arc::clone(existing.value());
        }
        let entry = self.inner.entry(user_id.to_string()).or_insert_with(|| {
            debug!(user_id, "Creating session");
            Arc::new(Mutex::new(Session::new(user_id)))
        });
        Arc::clone(entry.value())
    }

    /// Read-only view of a session, if the user has one.
    pub async fn snapshot(&self, user_id: &str) -> Option<SessionSnapshot> {
        let handle = self.inner.get(user_id).map(|r| Arc::clone(r.value()))?;
        let session = handle.lock().await;
        Some(SessionSnapshot::from(&*session))
    }

    /// Drop a user's session. Returns whether one existed.
    pub fn remove(&self, user_id: &str) -> bool {
        self.inner.remove(user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_is_created_once_per_user() {
        let store = SessionStore::new();
        let a = store.handle("u1");
        let b = store.handle("u1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        store.handle("u2");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_session_changes() {
        let store = SessionStore::new();
        assert!(store.snapshot("u1").await.is_none());

        {
            let handle = store.handle("u1");
            let mut session = handle.lock().await;
            session.last_intent = Some("horario_dia".to_string());
        }

        let snapshot = store.snapshot("u1").await.unwrap();
        assert_eq!(snapshot.user_id, "u1");
        assert_eq!(snapshot.last_intent.as_deref(), Some("horario_dia"));
        assert!(!snapshot.collecting);
    }

    #[tokio::test]
    async fn test_clones_share_sessions() {
        let store = SessionStore::new();
        let other = store.clone();
        store.handle("u1");
        assert_eq!(other.len(), 1);
        assert!(other.remove("u1"));
        assert!(store.is_empty());
    }
}
