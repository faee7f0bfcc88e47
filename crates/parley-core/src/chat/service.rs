//! Chat service implementing the widget actions.
//!
//! ChatService coordinates the durable store, the per-request ephemeral
//! store, and the provider registry. A turn is persisted only after the
//! provider has returned a complete reply.
//!
//! Two concurrent turns on the same chat id are not serialized: each loads
//! its own snapshot and appends its own messages, so the later save wins
//! the ordering race. One human typing makes this rare.

use tracing::{info, warn};

use parley_types::chat::{ChatId, Message};
use parley_types::error::ChatError;
use parley_types::llm::MessageRole;
use parley_types::request::{ActionResponse, ChatTarget, Identity, SendMessage};

use crate::chat::conversation::Conversation;
use crate::chat::store::{ConversationStore, SelectedStore};
use crate::llm::provider::ChunkSender;
use crate::llm::registry::ProviderRegistry;

/// Runs chat actions against a durable store `D` and a caller-supplied
/// ephemeral store.
///
/// Generic over `ConversationStore` so parley-core never depends on parley-infra.
pub struct ChatService<D: ConversationStore> {
    durable: D,
    providers: ProviderRegistry,
}

impl<D: ConversationStore> ChatService<D> {
    pub fn new(durable: D, providers: ProviderRegistry) -> Self {
        Self { durable, providers }
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    async fn open<E: ConversationStore>(
        &self,
        identity: &Identity,
        ephemeral: &E,
        chat_id: &ChatId,
        persistent: bool,
    ) -> Result<Conversation, ChatError> {
        let store = SelectedStore::choose(persistent, &self.durable, ephemeral);
        Ok(Conversation::load(&store, chat_id.clone(), identity.user_id, persistent).await?)
    }

    /// Run one user turn: append the user message, ask the provider, and
    /// persist both messages if and only if the provider succeeded.
    pub async fn send_message<E: ConversationStore>(
        &self,
        identity: &Identity,
        ephemeral: &E,
        request: SendMessage,
        forward: Option<&ChunkSender>,
    ) -> Result<ActionResponse, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::Validation(
                "Missing required parameters".to_string(),
            ));
        }

        let (service_key, provider) = self.providers.resolve(&request.ai_service)?;
        let ChatTarget {
            chat_id,
            persistent,
        } = request.target;

        let mut conversation = self
            .open(identity, ephemeral, &chat_id, persistent)
            .await?
            .with_max_window(request.max_memory);
        conversation.append(Message::new(
            chat_id.clone(),
            MessageRole::User,
            request.message,
        ))?;

        let reply = match provider
            .send(
                &conversation,
                &request.system_prompt,
                conversation.max_window(),
                forward,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    chat_id = %chat_id,
                    user_id = identity.user_id,
                    provider = service_key,
                    status = ?e.http_status(),
                    "provider call failed: {e}"
                );
                return Err(e.into());
            }
        };

        let text = reply.content().to_string();
        conversation.append(reply)?;

        let store = SelectedStore::choose(persistent, &self.durable, ephemeral);
        let saved = conversation.save(&store).await?;

        info!(
            chat_id = %chat_id,
            user_id = identity.user_id,
            provider = service_key,
            persistent,
            saved,
            history = conversation.messages().len(),
            "chat turn completed"
        );

        Ok(ActionResponse::MessageSent {
            message: text,
            chat: conversation.to_view(),
        })
    }

    pub async fn load_chat<E: ConversationStore>(
        &self,
        identity: &Identity,
        ephemeral: &E,
        target: ChatTarget,
    ) -> Result<ActionResponse, ChatError> {
        let conversation = self
            .open(identity, ephemeral, &target.chat_id, target.persistent)
            .await?;
        Ok(ActionResponse::Chat(conversation.to_view()))
    }

    pub async fn clear_chat<E: ConversationStore>(
        &self,
        identity: &Identity,
        ephemeral: &E,
        target: ChatTarget,
    ) -> Result<ActionResponse, ChatError> {
        let store = SelectedStore::choose(target.persistent, &self.durable, ephemeral);
        let mut conversation = Conversation::new(target.chat_id, identity.user_id, target.persistent);
        let removed = conversation.clear(&store).await?;
        info!(
            chat_id = %conversation.id(),
            user_id = identity.user_id,
            persistent = target.persistent,
            removed,
            "chat cleared"
        );
        Ok(ActionResponse::Cleared)
    }

    pub fn available_services(&self) -> ActionResponse {
        ActionResponse::Services(self.providers.available_services())
    }
}
