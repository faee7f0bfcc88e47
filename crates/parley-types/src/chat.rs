//! Chat domain types: conversation ids, stored messages, and the payload
//! returned to the widget.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::llm::MessageRole;

/// Display format for timestamps in widget payloads.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Conversation identifier. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Parse a caller-supplied id, rejecting blank input.
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatError::Validation("Missing chat_id parameter".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single role-tagged utterance.
///
/// Everything except `id` is fixed at construction. `id` is present only
/// once a store has persisted the message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: Option<i64>,
    chat_id: ChatId,
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// A new, unpersisted message stamped with the current time.
    pub fn new(chat_id: ChatId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: None,
            chat_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a message read back from a store.
    pub fn restore(
        id: i64,
        chat_id: ChatId,
        role: MessageRole,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            chat_id,
            role,
            content,
            created_at,
        }
    }

    /// The same message, marked as persisted under `id`.
    pub fn persisted(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn to_view(&self) -> MessageView {
        MessageView {
            id: self.id,
            chat_id: self.chat_id.to_string(),
            role: self.role,
            content: self.content.clone(),
            timestamp: self.created_at.format(DISPLAY_TIME_FORMAT).to_string(),
        }
    }
}

/// A message as rendered into the widget payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
}

/// The `chat` payload returned by `send_message` and `load_chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatView {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub user_id: i64,
    pub messages: Vec<MessageView>,
    /// Same format as `created_at`.
    pub last_update: String,
    pub persistent: bool,
}

/// Title shown in the widget header for a conversation started at `created_at`.
pub fn chat_title(created_at: DateTime<Utc>) -> String {
    format!("AI Chat - {}", created_at.format(DISPLAY_TIME_FORMAT))
}
