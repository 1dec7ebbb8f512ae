//! # Session Store Module
//!
//! In-memory per-user sessions with idle-time eviction. Each session sits
//! behind its own mutex, so turns of one user run one after another while
//! different users proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::dialogue::Session;

/// Shared handle to one user's session
pub type SessionHandle = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: Mutex<HashMap<i64, SessionHandle>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Get the user's session, creating a fresh one on first contact.
    ///
    /// The session is marked active before the map lock is released, so a
    /// concurrent sweep cannot evict it between this call and the turn
    /// locking it.
    pub async fn session(&self, user_id: i64) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        let handle = Arc::clone(sessions.entry(user_id).or_insert_with(|| {
            debug!(user_id, "Creating new session");
            Arc::new(Mutex::new(Session::default()))
        }));

        // A locked session is in use and never evicted
        if let Ok(mut session) = handle.try_lock() {
            session.touch();
        }
        handle
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop sessions idle for longer than the TTL. Sessions locked by an
    /// in-flight turn are kept. Returns the number of evicted sessions.
    pub async fn evict_expired(&self) -> usize {
        self.evict_idle_before(Instant::now()).await
    }

    async fn evict_idle_before(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => now.saturating_duration_since(session.last_activity) <= self.ttl,
            Err(_) => true,
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }
}
