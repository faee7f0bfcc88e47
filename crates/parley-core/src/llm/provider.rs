//! ChatProvider trait definition.

use parley_types::error::ProviderError;
use parley_types::llm::{Delivery, PromptMessage};

/// Channel receiving raw provider response bytes as they arrive.
///
/// Used when the caller wants the reply flushed progressively instead of
/// waiting for the complete message.
pub type ChunkSender = tokio::sync::mpsc::Sender<Vec<u8>>;

/// Trait for LLM providers (OpenAI-compatible endpoints, test doubles, ...).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// For dynamic dispatch, use [`super::box_provider::BoxChatProvider`].
///
/// Implementations make exactly one HTTP call per `complete` and never retry.
pub trait ChatProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Whether replies arrive as one document or as an event stream.
    fn delivery(&self) -> Delivery;

    /// Send a prepared window and return the complete reply text.
    ///
    /// When `forward` is set, every raw response chunk is also sent to it
    /// verbatim as soon as it is read. A closed `forward` channel aborts the
    /// call with [`ProviderError::Disconnected`].
    fn complete(
        &self,
        window: &[PromptMessage],
        forward: Option<&ChunkSender>,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}
