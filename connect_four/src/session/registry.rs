//! Concurrent map of live and finished sessions.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::{SessionId, game_session::GameSession};

/// Session registry shared by the transport, matchmaking and bot tasks.
///
/// Entries are added at pairing time and are not removed here; clearing out
/// finished sessions is left to whoever owns the process lifecycle.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<GameSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session
    ///
    /// # Arguments
    ///
    /// * `session` - Newly paired session
    ///
    /// # Returns
    ///
    /// * `bool` - `false` if the identifier was already registered (the existing entry is kept)
    pub async fn register(&self, session: Arc<GameSession>) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id()) {
            log::warn!("Session {} already registered", session.id());
            return false;
        }
        sessions.insert(session.id(), session);
        true
    }

    /// Look up a session by identifier.
    pub async fn find(&self, id: SessionId) -> Option<Arc<GameSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Number of sessions still accepting moves.
    pub async fn active_count(&self) -> usize {
        let sessions: Vec<_> = self.sessions.read().await.values().cloned().collect();

        let mut active = 0;
        for session in sessions {
            if !session.is_finished().await {
                active += 1;
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::participant::Participant;
    use uuid::Uuid;

    fn bot_session() -> Arc<GameSession> {
        Arc::new(GameSession::new(
            Arc::new(Participant::bot("Bot A")),
            Arc::new(Participant::bot("Bot B")),
        ))
    }

    #[tokio::test]
    async fn test_register_and_find() {
        let registry = SessionRegistry::new();
        let session = bot_session();

        assert!(registry.register(session.clone()).await);
        let found = registry.find(session.id()).await.unwrap();
        assert!(Arc::ptr_eq(&found, &session));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_unknown_returns_none() {
        let registry = SessionRegistry::new();
        assert!(registry.find(Uuid::new_v4()).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_register_keeps_original() {
        let registry = SessionRegistry::new();
        let session = bot_session();

        assert!(registry.register(session.clone()).await);
        assert!(!registry.register(session.clone()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let registry = SessionRegistry::new();
        let other = registry.clone();
        let session = bot_session();

        registry.register(session.clone()).await;
        assert!(other.find(session.id()).await.is_some());
        assert_eq!(other.active_count().await, 1);
    }
}
