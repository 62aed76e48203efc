use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, SqlValue, StoreType,
};
use tasklane_types::error::StoreError;
use tasklane_types::user::User;
use uuid::Uuid;

use crate::store::entity::{get_datetime, get_uuid, Entity};
use crate::store::sql::map_sqlx_error;

static USER_METADATA: EntityMetadata = EntityMetadata {
    table: "users",
    columns: &[
        ColumnDescriptor::new("id", "id", StoreType::Uuid),
        ColumnDescriptor::new("email", "email", StoreType::Text).searchable(),
        ColumnDescriptor::new("display_name", "display_name", StoreType::Text).searchable(),
        ColumnDescriptor::new("created_at", "created_at", StoreType::Timestamp),
        ColumnDescriptor::new("updated_at", "updated_at", StoreType::Timestamp),
    ],
    key: KeyDescriptor {
        column: "id",
        store_type: StoreType::Uuid,
        generation: KeyGeneration::ClientGenerated,
    },
};

impl Entity for User {
    type Key = Uuid;

    fn metadata() -> &'static EntityMetadata {
        &USER_METADATA
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
            self.email.clone().into(),
            self.display_name.clone().into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: get_uuid(row, "id")?,
            email: row.try_get("email").map_err(map_sqlx_error)?,
            display_name: row.try_get("display_name").map_err(map_sqlx_error)?,
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
