use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, SqlValue, StoreType,
};
use tasklane_types::error::StoreError;
use tasklane_types::subtask::Subtask;
use uuid::Uuid;

use crate::store::entity::{get_datetime, get_uuid, Entity};
use crate::store::sql::map_sqlx_error;

static SUBTASK_METADATA: EntityMetadata = EntityMetadata {
    table: "subtasks",
    columns: &[
        ColumnDescriptor::new("id", "id", StoreType::Uuid),
        ColumnDescriptor::new("task_id", "task_id", StoreType::Uuid),
        ColumnDescriptor::new("title", "title", StoreType::Text).searchable(),
        ColumnDescriptor::new("is_done", "is_done", StoreType::Boolean),
        ColumnDescriptor::new("position", "position", StoreType::Integer),
        ColumnDescriptor::new("created_at", "created_at", StoreType::Timestamp),
        ColumnDescriptor::new("updated_at", "updated_at", StoreType::Timestamp),
    ],
    key: KeyDescriptor {
        column: "id",
        store_type: StoreType::Uuid,
        generation: KeyGeneration::ClientGenerated,
    },
};

impl Entity for Subtask {
    type Key = Uuid;

    fn metadata() -> &'static EntityMetadata {
        &SUBTASK_METADATA
    }

    fn key(&self) -> Option<Uuid> {
        (!self.id.is_nil()).then_some(self.id)
    }

    fn set_key(&mut self, key: Uuid) {
        self.id = key;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.task_id.into(),
            self.title.clone().into(),
            self.is_done.into(),
            self.position.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: get_uuid(row, "id")?,
            task_id: get_uuid(row, "task_id")?,
            title: row.try_get("title").map_err(map_sqlx_error)?,
            is_done: row.try_get("is_done").map_err(map_sqlx_error)?,
            position: row.try_get("position").map_err(map_sqlx_error)?,
            created_at: get_datetime(row, "created_at")?,
            updated_at: get_datetime(row, "updated_at")?,
        })
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
