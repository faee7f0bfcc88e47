//! Typed request variants and action results.
//!
//! The HTTP boundary decodes raw query/form/JSON input into exactly one
//! [`ChatRequest`] before anything in the core sees it.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::chat::{ChatId, ChatView};

/// Who is making a request, as vouched for by the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    /// Host session key, scoping the ephemeral store.
    pub session_id: String,
}

impl Identity {
    pub fn new(user_id: i64, session_id: impl Into<String>) -> Self {
        Self {
            user_id,
            session_id: session_id.into(),
        }
    }

    /// User id 0 (or anything non-positive) means anonymous/unset.
    pub fn is_anonymous(&self) -> bool {
        self.user_id <= 0
    }
}

/// A conversation plus the store it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub chat_id: ChatId,
    pub persistent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub target: ChatTarget,
    /// Never blank.
    pub message: String,
    pub system_prompt: String,
    /// Window cap; 0 means no limit.
    pub max_memory: u32,
    /// `default` or a registered provider key.
    pub ai_service: String,
}

/// The closed set of actions the endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    SendMessage(SendMessage),
    LoadChat(ChatTarget),
    ClearChat(ChatTarget),
    ListServices,
}

impl ChatRequest {
    pub fn action(&self) -> &'static str {
        match self {
            ChatRequest::SendMessage(_) => "send_message",
            ChatRequest::LoadChat(_) => "load_chat",
            ChatRequest::ClearChat(_) => "clear_chat",
            ChatRequest::ListServices => "get_available_services",
        }
    }
}

/// Successful result of one action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    MessageSent { message: String, chat: ChatView },
    Chat(ChatView),
    Cleared,
    Services(BTreeMap<String, String>),
}

impl ActionResponse {
    /// Render the JSON body returned to the widget.
    pub fn into_json(self) -> Value {
        match self {
            ActionResponse::MessageSent { message, chat } => json!({
                "success": true,
                "message": message,
                "chat": chat,
            }),
            ActionResponse::Chat(chat) => json!({
                "success": true,
                "chat": chat,
            }),
            ActionResponse::Cleared => json!({
                "success": true,
                "message": "Chat cleared",
            }),
            ActionResponse::Services(services) => json!({
                "success": true,
                "services": services,
            }),
        }
    }
}
