//! Shared domain types for Tasklane.
//!
//! This crate contains the domain records persisted by the storage layer
//! (users, areas, folders, tasks, subtasks, action-log entries), the error
//! taxonomy, and configuration types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod action_log;
pub mod area;
pub mod config;
pub mod error;
pub mod folder;
pub mod subtask;
pub mod task;
pub mod user;
