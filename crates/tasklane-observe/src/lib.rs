//! Observability support for Tasklane.

pub mod tracing_setup;
