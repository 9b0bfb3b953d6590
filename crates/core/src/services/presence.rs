//! Presence registry.
//!
//! Tracks which conversation each connected user is currently viewing. The
//! registry is process-local and session-scoped: entries are created when a
//! streaming connection authenticates, mutated by view/stop-view signals, and
//! removed on disconnect. A restart starts empty.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Map of user ID to the conversation they are actively viewing, if any.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<HashMap<String, Option<String>>>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected user with no active conversation.
    pub async fn connect(&self, user_id: &str) {
        self.inner
            .write()
            .await
            .insert(user_id.to_string(), None);
    }

    /// Mark the user as viewing the given conversation.
    pub async fn view_conversation(&self, user_id: &str, conversation_id: &str) {
        self.inner
            .write()
            .await
            .insert(user_id.to_string(), Some(conversation_id.to_string()));
    }

    /// Clear the user's active conversation, keeping them connected.
    pub async fn stop_viewing(&self, user_id: &str) {
        if let Some(entry) = self.inner.write().await.get_mut(user_id) {
            *entry = None;
        }
    }

    /// Remove the user entirely on disconnect.
    pub async fn disconnect(&self, user_id: &str) {
        self.inner.write().await.remove(user_id);
    }

    /// Whether the user is currently viewing the given conversation.
    pub async fn is_viewing(&self, user_id: &str, conversation_id: &str) -> bool {
        self.inner
            .read()
            .await
            .get(user_id)
            .is_some_and(|active| active.as_deref() == Some(conversation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_view_and_stop_viewing() {
        let registry = PresenceRegistry::new();
        registry.connect("alice").await;
        assert!(!registry.is_viewing("alice", "c1").await);

        registry.view_conversation("alice", "c1").await;
        assert!(registry.is_viewing("alice", "c1").await);
        assert!(!registry.is_viewing("alice", "c2").await);

        registry.stop_viewing("alice").await;
        assert!(!registry.is_viewing("alice", "c1").await);
    }

    #[tokio::test]
    async fn test_disconnect_clears_entry() {
        let registry = PresenceRegistry::new();
        registry.view_conversation("bob", "c9").await;
        assert!(registry.is_viewing("bob", "c9").await);

        registry.disconnect("bob").await;
        assert!(!registry.is_viewing("bob", "c9").await);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_viewing() {
        let registry = PresenceRegistry::new();
        registry.stop_viewing("ghost").await;
        assert!(!registry.is_viewing("ghost", "c1").await);
    }
}
