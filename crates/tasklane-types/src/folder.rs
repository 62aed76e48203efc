use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named container for tasks, optionally nested under an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Owning area, if the folder lives inside one.
    pub area_id: Option<Uuid>,
    pub name: String,
    /// Manual sort position within the containing area (or the root list).
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Create a new folder with a fresh v7 id and current timestamps.
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            area_id: None,
            name: name.into(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
