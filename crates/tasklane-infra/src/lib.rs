//! SQLite-backed infrastructure for Tasklane.
//!
//! Implements the generic persistence engine over sqlx/SQLite: connection
//! factory with environment expansion, unit-of-work lifecycle, the generic
//! entity provider, per-entity store bindings, and the independent
//! action-log writer.

pub mod store;
