use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A top-level grouping of tasks and folders (e.g. "Work", "Home").
///
/// Areas are soft-deleted: the business layer flips `is_deleted` through a
/// generic update instead of issuing a hard delete, so that tasks keep a
/// valid parent reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Display color as a hex string, e.g. "#4a90d9".
    pub color: Option<String>,
    /// Manual sort position within the owning user's area list.
    pub position: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Area {
    /// Create a new area with a fresh v7 id and current timestamps.
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            name: name.into(),
            description: None,
            color: None,
            position: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}
