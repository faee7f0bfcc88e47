//! Conversation model, provider ports and request routing for Parley.
//!
//! This crate defines the "ports" (store and provider traits) that the
//! infrastructure layer implements, plus the pure logic built on them.
//! It depends only on `parley-types` -- never on `parley-infra` or any
//! database/HTTP crate.

pub mod chat;
pub mod llm;
pub mod repository;
pub mod router;

#[cfg(test)]
mod testing;
