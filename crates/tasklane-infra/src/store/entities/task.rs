use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, SqlValue, StoreType,
};
use tasklane_types::error::StoreError;
use tasklane_types::task::{Task, TaskStatus};
use uuid::Uuid;

use crate::store::entity::{get_datetime, get_opt_datetime, get_opt_uuid, get_uuid, Entity};
use crate::store::sql::map_sqlx_error;

static TASK_METADATA: EntityMetadata = EntityMetadata {
    table: "tasks",
    columns: &[
        ColumnDescriptor::new("id", "id", StoreType::Uuid),
        ColumnDescriptor::new("user_id", "user_id", StoreType::Uuid),
        ColumnDescriptor::new("area_id", "area_id", StoreType::Uuid),
        ColumnDescriptor::new("folder_id", "folder_id", StoreType::Uuid),
        ColumnDescriptor::new("title", "title", StoreType::Text).searchable(),
        ColumnDescriptor::new("notes", "notes", StoreType::Text).searchable(),
        ColumnDescriptor::new("status", "status", StoreType::Text),
        ColumnDescriptor::new("due_at", "due_at", StoreType::Timestamp),
        ColumnDescriptor::new("completed_at", "completed_at", StoreType::Timestamp),
        ColumnDescriptor::new("created_at", "created_at", StoreType::Timestamp),
        ColumnDescriptor::new("updated_at", "updated_at", StoreType::Timestamp),
    ],
    key: KeyDescriptor {
        column: "id",
        store_type: StoreType::Uuid,
        generation: KeyGeneration::ClientGenerated,
    },
};

impl Entity for Task {
    type Key = Uuid;

    fn metadata() -> &'static EntityMetadata {
        &TASK_METADATA
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
            self.user_id.into(),
            self.area_id.into(),
            self.folder_id.into(),
            self.title.clone().into(),
            self.notes.clone().into(),
            self.status.to_string().into(),
            self.due_at.into(),
            self.completed_at.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let status_text: String = row.try_get("status").map_err(map_sqlx_error)?;
        let status: TaskStatus = status_text
            .parse()
            .map_err(|e: String| StoreError::Query(e))?;
        Ok(Self {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            area_id: get_opt_uuid(row, "area_id")?,
            folder_id: get_opt_uuid(row, "folder_id")?,
            title: row.try_get("title").map_err(map_sqlx_error)?,
            notes: row.try_get("notes").map_err(map_sqlx_error)?,
            status,
            due_at: get_opt_datetime(row, "due_at")?,
            completed_at: get_opt_datetime(row, "completed_at")?,
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
