//! Request routing: one typed request in, one action result out.
//!
//! Each request walks `Received -> Authenticated -> Dispatched -> Responded`,
//! or stops at `Rejected` when the caller is anonymous. The router keeps no
//! state between requests.

use std::fmt;

use tracing::debug;

use parley_types::error::ChatError;
use parley_types::request::{ActionResponse, ChatRequest, Identity};

use crate::chat::service::ChatService;
use crate::chat::store::ConversationStore;
use crate::llm::provider::ChunkSender;

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Authenticated,
    Dispatched,
    Responded,
    Rejected,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Received => "received",
            RequestStage::Authenticated => "authenticated",
            RequestStage::Dispatched => "dispatched",
            RequestStage::Responded => "responded",
            RequestStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Dispatches typed requests to [`ChatService`] actions.
pub struct RequestRouter<D: ConversationStore> {
    service: ChatService<D>,
}

impl<D: ConversationStore> RequestRouter<D> {
    pub fn new(service: ChatService<D>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ChatService<D> {
        &self.service
    }

    /// Handle one request on behalf of `identity`.
    ///
    /// `ephemeral` is the caller's session store; `forward` receives raw
    /// provider chunks for `send_message` when the caller streams.
    pub async fn dispatch<E: ConversationStore>(
        &self,
        identity: &Identity,
        ephemeral: &E,
        request: ChatRequest,
        forward: Option<&ChunkSender>,
    ) -> Result<ActionResponse, ChatError> {
        let action = request.action();
        debug!(stage = %RequestStage::Received, action, "chat request");

        if identity.is_anonymous() {
            debug!(stage = %RequestStage::Rejected, action, "anonymous caller");
            return Err(ChatError::Auth("Authentication required".to_string()));
        }
        debug!(
            stage = %RequestStage::Authenticated,
            action,
            user_id = identity.user_id
        );

        debug!(stage = %RequestStage::Dispatched, action);
        let result = match request {
            ChatRequest::SendMessage(send) => {
                self.service
                    .send_message(identity, ephemeral, send, forward)
                    .await
            }
            ChatRequest::LoadChat(target) => self.service.load_chat(identity, ephemeral, target).await,
            ChatRequest::ClearChat(target) => {
                self.service.clear_chat(identity, ephemeral, target).await
            }
            ChatRequest::ListServices => Ok(self.service.available_services()),
        };

        match &result {
            Ok(_) => debug!(stage = %RequestStage::Responded, action),
            Err(e) => debug!(stage = %RequestStage::Responded, action, kind = e.kind(), "action failed"),
        }
        result
    }
}
