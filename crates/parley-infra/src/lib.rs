//! Infrastructure layer for Parley.
//!
//! Implements the store and provider traits defined in `parley-core`:
//! SQLite conversation and widget storage, the in-memory session store,
//! OpenAI-compatible HTTP providers, and config file loading.

pub mod config;
pub mod llm;
pub mod session;
pub mod sqlite;
