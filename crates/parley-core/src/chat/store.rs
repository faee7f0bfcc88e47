//! ConversationStore trait definition.
//!
//! Two backends implement it with identical external behavior: a durable
//! store scoped by (chat id, owner) and an ephemeral store scoped to the
//! host session and owner. Uses native async fn in traits (RPITIT, Rust 2024 edition).

use parley_types::chat::{ChatId, Message};
use parley_types::error::RepositoryError;

/// Message persistence for conversations.
///
/// Implementations live in parley-infra (`SqliteConversationStore`,
/// `SessionConversationStore`). Every append is its own atomic unit; nothing
/// here is transactional across messages.
pub trait ConversationStore: Send + Sync {
    /// Append one message and return its assigned id.
    fn append(
        &self,
        owner_user_id: i64,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// All messages of a conversation, oldest first.
    fn list(
        &self,
        chat_id: &ChatId,
        owner_user_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Delete every message of a conversation. Returns how many were removed.
    fn delete(
        &self,
        chat_id: &ChatId,
        owner_user_id: i64,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}

/// The backend chosen for one request by the `persistent` flag.
pub enum SelectedStore<'a, D, E> {
    Durable(&'a D),
    Ephemeral(&'a E),
}

impl<'a, D, E> SelectedStore<'a, D, E> {
    pub fn choose(persistent: bool, durable: &'a D, ephemeral: &'a E) -> Self {
        if persistent {
            SelectedStore::Durable(durable)
        } else {
            SelectedStore::Ephemeral(ephemeral)
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, SelectedStore::Durable(_))
    }
}

impl<D: ConversationStore, E: ConversationStore> ConversationStore for SelectedStore<'_, D, E> {
    async fn append(&self, owner_user_id: i64, message: &Message) -> Result<i64, RepositoryError> {
        match self {
            SelectedStore::Durable(store) => store.append(owner_user_id, message).await,
            SelectedStore::Ephemeral(store) => store.append(owner_user_id, message).await,
        }
    }

    async fn list(
        &self,
        chat_id: &ChatId,
        owner_user_id: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        match self {
            SelectedStore::Durable(store) => store.list(chat_id, owner_user_id).await,
            SelectedStore::Ephemeral(store) => store.list(chat_id, owner_user_id).await,
        }
    }

    async fn delete(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<u64, RepositoryError> {
        match self {
            SelectedStore::Durable(store) => store.delete(chat_id, owner_user_id).await,
            SelectedStore::Ephemeral(store) => store.delete(chat_id, owner_user_id).await,
        }
    }
}
