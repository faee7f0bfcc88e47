//! Repository trait definitions (ports) that are not conversation stores.
//!
//! The infrastructure layer (parley-infra) implements these. The core crate
//! never depends on any specific storage technology.

pub mod widget;
