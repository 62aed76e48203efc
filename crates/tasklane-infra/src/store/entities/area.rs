use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, SqlValue, StoreType,
};
use tasklane_types::area::Area;
use tasklane_types::error::StoreError;
use uuid::Uuid;

use crate::store::entity::{get_datetime, get_uuid, Entity};
use crate::store::sql::map_sqlx_error;

static AREA_METADATA: EntityMetadata = EntityMetadata {
    table: "areas",
    columns: &[
        ColumnDescriptor::new("id", "id", StoreType::Uuid),
        ColumnDescriptor::new("user_id", "user_id", StoreType::Uuid),
        ColumnDescriptor::new("name", "name", StoreType::Text).searchable(),
        ColumnDescriptor::new("description", "description", StoreType::Text).searchable(),
        ColumnDescriptor::new("color", "color", StoreType::Text),
        ColumnDescriptor::new("position", "position", StoreType::Integer),
        ColumnDescriptor::new("is_deleted", "is_deleted", StoreType::Boolean),
        ColumnDescriptor::new("created_at", "created_at", StoreType::Timestamp),
        ColumnDescriptor::new("updated_at", "updated_at", StoreType::Timestamp),
    ],
    key: KeyDescriptor {
        column: "id",
        store_type: StoreType::Uuid,
        generation: KeyGeneration::ClientGenerated,
    },
};

impl Entity for Area {
    type Key = Uuid;

    fn metadata() -> &'static EntityMetadata {
        &AREA_METADATA
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
            self.name.clone().into(),
            self.description.clone().into(),
            self.color.clone().into(),
            self.position.into(),
            self.is_deleted.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            name: row.try_get("name").map_err(map_sqlx_error)?,
            description: row.try_get("description").map_err(map_sqlx_error)?,
            color: row.try_get("color").map_err(map_sqlx_error)?,
            position: row.try_get("position").map_err(map_sqlx_error)?,
            is_deleted: row.try_get("is_deleted").map_err(map_sqlx_error)?,
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
