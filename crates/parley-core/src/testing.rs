//! In-memory test doubles shared by the unit tests of this crate.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parley_types::chat::{ChatId, Message};
use parley_types::error::{ProviderError, RepositoryError};
use parley_types::llm::{Delivery, PromptMessage};

use crate::chat::store::ConversationStore;
use crate::llm::provider::{ChatProvider, ChunkSender};

/// Vec-backed store scoped by (chat id, owner).
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(i64, Message)>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

impl ConversationStore for MemoryStore {
    async fn append(&self, owner_user_id: i64, message: &Message) -> Result<i64, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows
            .lock()
            .unwrap()
            .push((owner_user_id, message.clone().persisted(id)));
        Ok(id)
    }

    async fn list(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<Vec<Message>, RepositoryError> {
        let mut messages: Vec<Message> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, m)| *owner == owner_user_id && m.chat_id() == chat_id)
            .map(|(_, m)| m.clone())
            .collect();
        messages.sort_by_key(|m| (m.created_at(), m.id()));
        Ok(messages)
    }

    async fn delete(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<u64, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(owner, m)| !(*owner == owner_user_id && m.chat_id() == chat_id));
        Ok((before - rows.len()) as u64)
    }
}

type Failure = Box<dyn Fn() -> ProviderError + Send + Sync>;

/// Provider that returns a fixed reply or a fixed error and records calls.
pub struct ScriptedProvider {
    reply: Result<String, Failure>,
    chunks: Vec<Vec<u8>>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Vec<PromptMessage>>>>,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            chunks: Vec::new(),
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    pub fn failing(error: impl Fn() -> ProviderError + Send + Sync + 'static) -> Self {
        Self {
            reply: Err(Box::new(error)),
            ..Self::replying("")
        }
    }

    /// Raw chunks forwarded before replying.
    pub fn forwarding(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.as_bytes().to_vec()).collect();
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<Vec<PromptMessage>>>> {
        self.seen.clone()
    }
}

impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn delivery(&self) -> Delivery {
        Delivery::Buffered
    }

    async fn complete(
        &self,
        window: &[PromptMessage],
        forward: Option<&ChunkSender>,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(window.to_vec());
        if let Some(tx) = forward {
            for chunk in &self.chunks {
                tx.send(chunk.clone())
                    .await
                    .map_err(|_| ProviderError::Disconnected)?;
            }
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}
