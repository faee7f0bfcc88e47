//! SQLite storage layer.
//!
//! Durable conversation store and widget configuration repository backed by
//! SQLite with WAL mode and split read/write connection pools.

pub mod conversation;
pub mod pool;
pub mod widget;
