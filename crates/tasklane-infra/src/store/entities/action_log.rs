use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, SqlValue, StoreType,
};
use tasklane_types::action_log::ActionLogRecord;
use tasklane_types::error::StoreError;

use crate::store::entity::{get_datetime, get_opt_uuid, Entity};
use crate::store::sql::map_sqlx_error;

static ACTION_LOG_METADATA: EntityMetadata = EntityMetadata {
    table: "action_log",
    columns: &[
        ColumnDescriptor::new("id", "id", StoreType::Integer),
        ColumnDescriptor::new("actor_id", "actor_id", StoreType::Uuid),
        ColumnDescriptor::new("origin", "origin", StoreType::Text),
        ColumnDescriptor::new("user_agent", "user_agent", StoreType::Text),
        ColumnDescriptor::new("method", "method", StoreType::Text),
        ColumnDescriptor::new("path", "path", StoreType::Text).searchable(),
        ColumnDescriptor::new("params", "params", StoreType::Json),
        ColumnDescriptor::new("description", "description", StoreType::Text).searchable(),
        ColumnDescriptor::new("status", "status", StoreType::Integer),
        ColumnDescriptor::new("error", "error", StoreType::Text),
        ColumnDescriptor::new("created_at", "created_at", StoreType::Timestamp),
    ],
    key: KeyDescriptor {
        column: "id",
        store_type: StoreType::Integer,
        generation: KeyGeneration::StoreGenerated,
    },
};

impl Entity for ActionLogRecord {
    type Key = i64;

    fn metadata() -> &'static EntityMetadata {
        &ACTION_LOG_METADATA
    }

    fn key(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    fn set_key(&mut self, key: i64) {
        self.id = key;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.actor_id.into(),
            self.origin.clone().into(),
            self.user_agent.clone().into(),
            self.method.clone().into(),
            self.path.clone().into(),
            self.params.clone().into(),
            self.description.clone().into(),
            self.status.map(i64::from).into(),
            self.error.clone().into(),
            self.created_at.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let status: Option<i64> = row.try_get("status").map_err(map_sqlx_error)?;
        let status = status
            .map(|s| {
                u16::try_from(s)
                    .map_err(|_| StoreError::Query(format!("status {s} out of range")))
            })
            .transpose()?;
        Ok(Self {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            actor_id: get_opt_uuid(row, "actor_id")?,
            origin: row.try_get("origin").map_err(map_sqlx_error)?,
            user_agent: row.try_get("user_agent").map_err(map_sqlx_error)?,
            method: row.try_get("method").map_err(map_sqlx_error)?,
            path: row.try_get("path").map_err(map_sqlx_error)?,
            params: row.try_get("params").map_err(map_sqlx_error)?,
            description: row.try_get("description").map_err(map_sqlx_error)?,
            status,
            error: row.try_get("error").map_err(map_sqlx_error)?,
            created_at: get_datetime(row, "created_at")?,
        })
    }

    /// Records are stamped when written; they are never updated afterwards.
    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
    }
}
