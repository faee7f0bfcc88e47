//! LLM provider abstractions for Parley.
//!
//! - `ChatProvider`: RPITIT trait for concrete provider implementations
//! - `BoxChatProvider`: object-safe wrapper for runtime selection
//! - `ProviderRegistry`: service key to provider mapping, with an explicit default
//! - `assembler`: reconstructs one reply from a server-sent-events stream

pub mod assembler;
pub mod box_provider;
pub mod provider;
pub mod registry;
