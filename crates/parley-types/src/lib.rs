//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley chat service:
//! messages and conversation payloads, typed request variants, service
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod request;
