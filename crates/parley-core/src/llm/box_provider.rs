//! BoxChatProvider -- object-safe dynamic dispatch wrapper for ChatProvider.
//!
//! 1. Define an object-safe `ChatProviderDyn` trait with boxed futures
//! 2. Blanket-impl `ChatProviderDyn` for all `T: ChatProvider`
//! 3. `BoxChatProvider` wraps `Box<dyn ChatProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use tracing::Instrument;

use parley_types::chat::Message;
use parley_types::error::ProviderError;
use parley_types::llm::{Delivery, MessageRole, PromptMessage};

use super::provider::{ChatProvider, ChunkSender};
use crate::chat::conversation::Conversation;
use crate::chat::window::build_window;

/// Object-safe version of [`ChatProvider`] with boxed futures.
pub trait ChatProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn delivery(&self) -> Delivery;

    fn complete_boxed<'a>(
        &'a self,
        window: &'a [PromptMessage],
        forward: Option<&'a ChunkSender>,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

impl<T: ChatProvider> ChatProviderDyn for T {
    fn name(&self) -> &str {
        ChatProvider::name(self)
    }

    fn model(&self) -> &str {
        ChatProvider::model(self)
    }

    fn delivery(&self) -> Delivery {
        ChatProvider::delivery(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        window: &'a [PromptMessage],
        forward: Option<&'a ChunkSender>,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.complete(window, forward))
    }
}

/// Type-erased chat provider for runtime selection by service key.
pub struct BoxChatProvider {
    inner: Box<dyn ChatProviderDyn + Send + Sync>,
}

impl BoxChatProvider {
    pub fn new<T: ChatProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub fn delivery(&self) -> Delivery {
        self.inner.delivery()
    }

    /// Send an already-built window.
    pub async fn complete(
        &self,
        window: &[PromptMessage],
        forward: Option<&ChunkSender>,
    ) -> Result<String, ProviderError> {
        self.inner.complete_boxed(window, forward).await
    }

    /// Build the window for `conversation` and return the reply as an
    /// assistant message of the same conversation.
    pub async fn send(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
        max_window: Option<u32>,
        forward: Option<&ChunkSender>,
    ) -> Result<Message, ProviderError> {
        let window = build_window(conversation, system_prompt, max_window);
        let span = tracing::info_span!(
            "chat",
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %self.name(),
            gen_ai.request.model = %self.model(),
            window_len = window.len(),
        );
        let text = self.complete(&window, forward).instrument(span).await?;
        Ok(Message::new(
            conversation.id().clone(),
            MessageRole::Assistant,
            text,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use parley_types::chat::ChatId;

    #[tokio::test]
    async fn test_send_uses_shared_window() {
        let provider = ScriptedProvider::replying("pong");
        let seen = provider.seen();
        let boxed = BoxChatProvider::new(provider);

        let id = ChatId::parse("c1").unwrap();
        let mut conversation = Conversation::new(id.clone(), 1, false);
        for text in ["a", "b", "c"] {
            conversation
                .append(Message::new(id.clone(), MessageRole::User, text))
                .unwrap();
        }

        let reply = boxed.send(&conversation, "sys", Some(2), None).await.unwrap();
        assert_eq!(reply.role(), MessageRole::Assistant);
        assert_eq!(reply.content(), "pong");
        assert_eq!(reply.chat_id(), &id);
        assert!(!reply.is_persisted());

        let windows = seen.lock().unwrap();
        let sent: Vec<&str> = windows[0].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(sent, vec!["sys", "b", "c"]);
    }

    #[test]
    fn test_box_provider_delegates_metadata() {
        let boxed = BoxChatProvider::new(ScriptedProvider::replying("x"));
        assert_eq!(boxed.name(), "scripted");
        assert_eq!(boxed.model(), "scripted-model");
        assert_eq!(boxed.delivery(), Delivery::Buffered);
    }
}
