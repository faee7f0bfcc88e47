//! Ephemeral conversation store backed by host sessions.
//!
//! Each host session owns one bucket holding the messages of every
//! conversation opened in that session. Rows carry their owning user, and
//! reads and deletes only see the caller's rows. Buckets live in a shared
//! `DashMap` and disappear when the session ends or goes idle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use parley_core::chat::store::ConversationStore;
use parley_types::chat::{ChatId, Message};
use parley_types::error::RepositoryError;

struct SessionBucket {
    /// `(owner_user_id, message)` in insertion order.
    messages: Vec<(i64, Message)>,
    next_id: i64,
    last_seen: Instant,
}

impl SessionBucket {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 0,
            last_seen: Instant::now(),
        }
    }
}

/// All live sessions, keyed by host session id.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, SessionBucket>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store handle for one session. Cheap; create one per request.
    pub fn store(&self, session_id: impl Into<String>) -> SessionConversationStore {
        SessionConversationStore {
            registry: self.clone(),
            session_id: session_id.into(),
        }
    }

    /// Drop a session and everything in it.
    pub fn end_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drop sessions not touched within `max_idle`. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, bucket| bucket.last_seen.elapsed() <= max_idle);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// `ConversationStore` over one session's bucket, scoped by owning user.
#[derive(Clone)]
pub struct SessionConversationStore {
    registry: SessionRegistry,
    session_id: String,
}

impl SessionConversationStore {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl ConversationStore for SessionConversationStore {
    async fn append(&self, owner_user_id: i64, message: &Message) -> Result<i64, RepositoryError> {
        let mut bucket = self
            .registry
            .sessions
            .entry(self.session_id.clone())
            .or_insert_with(SessionBucket::new);
        bucket.next_id += 1;
        let id = bucket.next_id;
        bucket
            .messages
            .push((owner_user_id, message.clone().persisted(id)));
        bucket.last_seen = Instant::now();
        Ok(id)
    }

    async fn list(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<Vec<Message>, RepositoryError> {
        let Some(mut bucket) = self.registry.sessions.get_mut(&self.session_id) else {
            return Ok(Vec::new());
        };
        bucket.last_seen = Instant::now();

        let mut messages: Vec<Message> = bucket
            .messages
            .iter()
            .filter(|(owner, m)| *owner == owner_user_id && m.chat_id() == chat_id)
            .map(|(_, m)| m.clone())
            .collect();
        // Stable: equal timestamps keep insertion order.
        messages.sort_by_key(|m| m.created_at());
        Ok(messages)
    }

    async fn delete(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<u64, RepositoryError> {
        let Some(mut bucket) = self.registry.sessions.get_mut(&self.session_id) else {
            return Ok(0);
        };
        bucket.last_seen = Instant::now();

        let before = bucket.messages.len();
        bucket
            .messages
            .retain(|(owner, m)| *owner != owner_user_id || m.chat_id() != chat_id);
        Ok((before - bucket.messages.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use parley_types::llm::MessageRole;

    fn chat(id: &str) -> ChatId {
        ChatId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_in_order() {
        let registry = SessionRegistry::new();
        let store = registry.store("sess-1");
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            let id = store
                .append(1, &Message::new(chat("c1"), MessageRole::User, *text))
                .await
                .unwrap();
            assert_eq!(id, i as i64 + 1);
        }

        let texts: Vec<String> = store
            .list(&chat("c1"), 1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.content().to_string())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_sorts_by_timestamp() {
        let store = SessionRegistry::new().store("s");
        let base = Utc::now();
        for (offset, text) in [(5, "later"), (-5, "earlier")] {
            let msg = Message::restore(
                0,
                chat("c1"),
                MessageRole::User,
                text.to_string(),
                base + ChronoDuration::seconds(offset),
            );
            store.append(1, &msg).await.unwrap();
        }
        let first = &store.list(&chat("c1"), 1).await.unwrap()[0];
        assert_eq!(first.content(), "earlier");
    }

    #[tokio::test]
    async fn test_filters_by_chat_and_isolates_delete() {
        let store = SessionRegistry::new().store("s");
        store
            .append(1, &Message::new(chat("a"), MessageRole::User, "a1"))
            .await
            .unwrap();
        store
            .append(1, &Message::new(chat("b"), MessageRole::User, "b1"))
            .await
            .unwrap();

        assert_eq!(store.list(&chat("a"), 1).await.unwrap().len(), 1);
        assert_eq!(store.delete(&chat("a"), 1).await.unwrap(), 1);
        assert!(store.list(&chat("a"), 1).await.unwrap().is_empty());
        assert_eq!(store.list(&chat("b"), 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_messages() {
        let registry = SessionRegistry::new();
        let one = registry.store("one");
        let two = registry.store("two");
        one.append(1, &Message::new(chat("c"), MessageRole::User, "x"))
            .await
            .unwrap();

        assert!(two.list(&chat("c"), 1).await.unwrap().is_empty());
        assert_eq!(two.delete(&chat("c"), 1).await.unwrap(), 0);
        assert_eq!(one.list(&chat("c"), 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shared_session_id_is_scoped_by_owner() {
        let registry = SessionRegistry::new();
        registry
            .store("shared")
            .append(1, &Message::new(chat("c"), MessageRole::User, "private"))
            .await
            .unwrap();

        let intruder = registry.store("shared");
        assert!(intruder.list(&chat("c"), 2).await.unwrap().is_empty());
        assert_eq!(intruder.delete(&chat("c"), 2).await.unwrap(), 0);

        let own = registry.store("shared").list(&chat("c"), 1).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].content(), "private");
    }

    #[tokio::test]
    async fn test_handles_share_registry() {
        let registry = SessionRegistry::new();
        registry
            .store("s")
            .append(1, &Message::new(chat("c"), MessageRole::User, "x"))
            .await
            .unwrap();
        assert_eq!(registry.store("s").list(&chat("c"), 1).await.unwrap().len(), 1);
        assert_eq!(registry.len(), 1);

        assert!(registry.end_session("s"));
        assert!(registry.is_empty());
        assert!(registry.store("s").list(&chat("c"), 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let registry = SessionRegistry::new();
        registry
            .store("s")
            .append(1, &Message::new(chat("c"), MessageRole::User, "x"))
            .await
            .unwrap();

        assert_eq!(registry.evict_idle(Duration::from_secs(60)), 0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(registry.evict_idle(Duration::from_millis(1)), 1);
        assert!(registry.is_empty());
    }
}
