//! Observability for Parley: subscriber setup and span export.

pub mod tracing_setup;
