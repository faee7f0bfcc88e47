//! Conversations: the message store port, the conversation aggregate,
//! provider window construction, and the chat actions.

pub mod conversation;
pub mod service;
pub mod store;
pub mod window;
