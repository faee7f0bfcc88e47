//! Provider window construction.
//!
//! Every provider receives the same window for the same conversation:
//! the last `max_window` stored messages, oldest first, behind one
//! optional leading system message.

use parley_types::chat::Message;
use parley_types::llm::{MessageRole, PromptMessage};

use super::conversation::Conversation;

/// Build the window sent to a provider for one turn.
///
/// `max_window` of `None` or `Some(0)` means no limit. A non-blank
/// `system_prompt` is always prepended and never counts against the cap.
pub fn build_window(
    conversation: &Conversation,
    system_prompt: &str,
    max_window: Option<u32>,
) -> Vec<PromptMessage> {
    window_from_messages(conversation.messages(), system_prompt, max_window)
}

/// Same as [`build_window`], over a plain chronological slice.
pub fn window_from_messages(
    messages: &[Message],
    system_prompt: &str,
    max_window: Option<u32>,
) -> Vec<PromptMessage> {
    let start = match max_window {
        Some(cap) if cap > 0 => messages.len().saturating_sub(cap as usize),
        _ => 0,
    };

    let mut window = Vec::with_capacity(messages.len() - start + 1);
    if !system_prompt.trim().is_empty() {
        window.push(PromptMessage::new(MessageRole::System, system_prompt));
    }
    window.extend(
        messages[start..]
            .iter()
            .map(|m| PromptMessage::new(m.role(), m.content())),
    );
    window
}
