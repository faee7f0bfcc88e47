//! HTTP boundary for the chat widget.
//!
//! A single JSON endpoint at `/api/chat` with host-forwarded identity,
//! typed payload decoding, CORS support and optional event-stream replies.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod payload;
pub mod router;
