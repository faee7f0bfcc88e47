//! The conversation aggregate.
//!
//! A `Conversation` is built per request: it eagerly loads the stored
//! history for (chat id, owner) from the selected store, accepts new
//! messages in memory, and writes the unpersisted ones back on `save`.

use chrono::{DateTime, Utc};

use parley_types::chat::{chat_title, ChatId, ChatView, Message, DISPLAY_TIME_FORMAT};
use parley_types::error::{ChatError, RepositoryError};
use parley_types::llm::PromptMessage;

use super::store::ConversationStore;
use super::window::build_window;

#[derive(Debug, Clone)]
pub struct Conversation {
    id: ChatId,
    owner_user_id: i64,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
    messages: Vec<Message>,
    max_window: Option<u32>,
    persistent: bool,
}

impl Conversation {
    /// A conversation with no history.
    pub fn new(id: ChatId, owner_user_id: i64, persistent: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_user_id,
            created_at: now,
            last_updated_at: now,
            messages: Vec::new(),
            max_window: None,
            persistent,
        }
    }

    /// Load the full stored history for (id, owner) from `store`.
    pub async fn load<S: ConversationStore>(
        store: &S,
        id: ChatId,
        owner_user_id: i64,
        persistent: bool,
    ) -> Result<Self, RepositoryError> {
        let messages = store.list(&id, owner_user_id).await?;
        let mut conversation = Self::new(id, owner_user_id, persistent);
        if let Some(first) = messages.first() {
            conversation.created_at = first.created_at();
        }
        if let Some(latest) = messages.iter().map(Message::created_at).max() {
            conversation.last_updated_at = latest;
        }
        conversation.messages = messages;
        Ok(conversation)
    }

    /// Cap the provider window. Zero means no limit.
    pub fn with_max_window(mut self, max_window: u32) -> Self {
        self.max_window = (max_window > 0).then_some(max_window);
        self
    }

    pub fn id(&self) -> &ChatId {
        &self.id
    }

    pub fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    pub fn persistent(&self) -> bool {
        self.persistent
    }

    pub fn max_window(&self) -> Option<u32> {
        self.max_window
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    /// Chronological history, including messages not yet saved.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the end of the history.
    pub fn append(&mut self, message: Message) -> Result<(), ChatError> {
        if message.chat_id() != &self.id {
            return Err(ChatError::Validation(format!(
                "message for chat '{}' appended to chat '{}'",
                message.chat_id(),
                self.id
            )));
        }
        let stamp = Utc::now().max(message.created_at());
        self.last_updated_at = self.last_updated_at.max(stamp);
        self.messages.push(message);
        Ok(())
    }

    /// Number of messages that have not been written to a store yet.
    pub fn pending(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_persisted()).count()
    }

    /// Write every unsaved message to `store`, oldest first.
    ///
    /// Each append is atomic on its own; if one fails, earlier ones stay saved.
    pub async fn save<S: ConversationStore>(&mut self, store: &S) -> Result<usize, RepositoryError> {
        let mut saved = 0;
        for slot in self.messages.iter_mut().filter(|m| !m.is_persisted()) {
            let id = store.append(self.owner_user_id, slot).await?;
            *slot = slot.clone().persisted(id);
            saved += 1;
        }
        Ok(saved)
    }

    /// Delete the stored history and drop it from memory.
    pub async fn clear<S: ConversationStore>(&mut self, store: &S) -> Result<u64, RepositoryError> {
        let removed = store.delete(&self.id, self.owner_user_id).await?;
        self.messages.clear();
        Ok(removed)
    }

    /// Window for the next provider call, using this conversation's cap.
    pub fn window(&self, system_prompt: &str) -> Vec<PromptMessage> {
        build_window(self, system_prompt, self.max_window)
    }

    /// Widget payload. Messages are limited to the window cap when one is set.
    pub fn to_view(&self) -> ChatView {
        let start = self
            .max_window
            .map(|cap| self.messages.len().saturating_sub(cap as usize))
            .unwrap_or(0);
        ChatView {
            id: self.id.to_string(),
            title: chat_title(self.created_at),
            created_at: self.created_at.format(DISPLAY_TIME_FORMAT).to_string(),
            user_id: self.owner_user_id,
            messages: self.messages[start..].iter().map(Message::to_view).collect(),
            last_update: self.last_updated_at.format(DISPLAY_TIME_FORMAT).to_string(),
            persistent: self.persistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use chrono::Duration;
    use parley_types::llm::MessageRole;

    fn chat(id: &str) -> ChatId {
        ChatId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_load_is_eager_and_ordered() {
        let store = MemoryStore::default();
        let id = chat("c1");
        let base = Utc::now() - Duration::minutes(10);
        // Stored out of order; the store returns them chronologically.
        for (offset, text) in [(2, "third"), (0, "first"), (1, "second")] {
            let msg = Message::restore(
                0,
                id.clone(),
                MessageRole::User,
                text.to_string(),
                base + Duration::seconds(offset),
            );
            store.append(5, &msg).await.unwrap();
        }

        let conversation = Conversation::load(&store, id, 5, false).await.unwrap();
        let texts: Vec<&str> = conversation.messages().iter().map(|m| m.content()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(conversation.created_at(), base);
        assert_eq!(conversation.last_updated_at(), base + Duration::seconds(2));

        let view = conversation.to_view();
        let expected = (base + Duration::seconds(2))
            .format(DISPLAY_TIME_FORMAT)
            .to_string();
        assert_eq!(view.last_update, expected);
        assert_eq!(view.created_at, base.format(DISPLAY_TIME_FORMAT).to_string());
    }

    #[tokio::test]
    async fn test_save_persists_only_pending() {
        let store = MemoryStore::default();
        let id = chat("c1");
        let mut conversation = Conversation::new(id.clone(), 1, true);
        conversation
            .append(Message::new(id.clone(), MessageRole::User, "hi"))
            .unwrap();
        assert_eq!(conversation.pending(), 1);
        assert_eq!(conversation.save(&store).await.unwrap(), 1);
        assert_eq!(conversation.pending(), 0);
        assert!(conversation.messages()[0].id().is_some());

        conversation
            .append(Message::new(id.clone(), MessageRole::Assistant, "hello"))
            .unwrap();
        assert_eq!(conversation.save(&store).await.unwrap(), 1);
        assert_eq!(store.list(&id, 1).await.unwrap().len(), 2);
    }

    #[test]
    fn test_append_rejects_foreign_message() {
        let mut conversation = Conversation::new(chat("a"), 1, false);
        let err = conversation
            .append(Message::new(chat("b"), MessageRole::User, "x"))
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert!(conversation.messages().is_empty());
    }

    #[test]
    fn test_last_updated_is_monotonic() {
        let id = chat("c1");
        let mut conversation = Conversation::new(id.clone(), 1, false);
        let mut previous = conversation.last_updated_at();
        for i in 0..5 {
            conversation
                .append(Message::new(id.clone(), MessageRole::User, format!("{i}")))
                .unwrap();
            assert!(conversation.last_updated_at() >= previous);
            previous = conversation.last_updated_at();
        }
    }

    #[tokio::test]
    async fn test_clear_removes_history() {
        let store = MemoryStore::default();
        let id = chat("c1");
        let mut conversation = Conversation::new(id.clone(), 1, true);
        conversation
            .append(Message::new(id.clone(), MessageRole::User, "hi"))
            .unwrap();
        conversation.save(&store).await.unwrap();

        assert_eq!(conversation.clear(&store).await.unwrap(), 1);
        assert!(conversation.messages().is_empty());
        let reloaded = Conversation::load(&store, id, 1, true).await.unwrap();
        assert!(reloaded.messages().is_empty());
    }

    #[test]
    fn test_view_applies_window_cap() {
        let id = chat("c1");
        let mut conversation = Conversation::new(id.clone(), 9, true).with_max_window(2);
        for i in 0..4 {
            conversation
                .append(Message::new(id.clone(), MessageRole::User, format!("m{i}")))
                .unwrap();
        }
        let view = conversation.to_view();
        assert_eq!(view.user_id, 9);
        assert!(view.persistent);
        assert!(view.title.starts_with("AI Chat - "));
        let texts: Vec<&str> = view.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3"]);

        let unlimited = conversation.clone().with_max_window(0);
        assert_eq!(unlimited.to_view().messages.len(), 4);
    }
}
