//! Session registry
//!
//! Lifecycle-scoped table from session id to the session's handle. It is
//! memory-resident and single-process: sessions do not survive a restart and
//! two server processes do not see each other's sessions. Moving to a
//! multi-process deployment means replacing this table with an external
//! key-value store keyed by `SessionId` and routing each session's traffic to
//! the process that runs its task.
//!
//! The map lock is only held for lookups and inserts. Everything that waits on
//! a session (its turn channel, its task join) goes through the session's own
//! locks, so one slow patient never blocks another session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::manager::SessionHandle;
use crate::types::SessionId;

type SessionMap = HashMap<SessionId, Arc<SessionHandle>>;

/// Process-wide session table, injected into the manager at construction
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<SessionMap>>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session
    pub(crate) async fn insert(&self, handle: Arc<SessionHandle>) {
        let session_id = handle.session_id.clone();
        self.sessions.lock().await.insert(session_id, handle);
    }

    /// Look a session up
    pub(crate) async fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Remove a session, returning its handle if it was present
    pub(crate) async fn remove(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.lock().await.remove(session_id)
    }

    /// Snapshot of every registered handle
    pub(crate) async fn handles(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.lock().await.values().cloned().collect()
    }

    /// Remove and return every session
    pub(crate) async fn drain(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions
            .lock()
            .await
            .drain()
            .map(|(_, handle)| handle)
            .collect()
    }

    /// Whether a session id is registered
    pub async fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.lock().await.contains_key(session_id)
    }

    /// Number of registered sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// True when no session is registered
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry").finish_non_exhaustive()
    }
}
