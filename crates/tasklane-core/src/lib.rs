//! Store-agnostic persistence building blocks for Tasklane.
//!
//! This crate holds everything the generic storage engine needs that does
//! not touch a database driver: the SQL value model, pre-declared entity
//! metadata with startup validation, the composable predicate (filter)
//! library, and the connection-subscription registry used by the real-time
//! channel. The sqlx-backed implementation lives in tasklane-infra.

pub mod realtime;
pub mod store;
