//! Entity and key traits binding domain types to the store.
//!
//! A persisted type declares its `'static` metadata once and provides the
//! value/row conversions; everything else (SQL assembly, binding, defaults,
//! key generation) is the generic provider's job. The per-entity
//! implementations live in [`super::entities`].

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tasklane_core::store::{EntityMetadata, SqlValue};
use tasklane_types::error::StoreError;
use uuid::Uuid;

use super::sql::map_sqlx_error;

/// A primary-key type usable by the generic provider.
pub trait EntityKey: Clone + Send + Sync {
    /// The bound-parameter form of this key.
    fn to_value(&self) -> SqlValue;

    /// Generate a fresh key client-side, where the type supports it.
    fn generate() -> Option<Self>;

    /// Recover a key from a store-generated integer row id, where the type
    /// supports it.
    fn from_row_id(row_id: i64) -> Option<Self>;
}

impl EntityKey for Uuid {
    fn to_value(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }

    fn generate() -> Option<Self> {
        Some(Uuid::now_v7())
    }

    fn from_row_id(_row_id: i64) -> Option<Self> {
        None
    }
}

impl EntityKey for i64 {
    fn to_value(&self) -> SqlValue {
        SqlValue::Integer(*self)
    }

    fn generate() -> Option<Self> {
        None
    }

    fn from_row_id(row_id: i64) -> Option<Self> {
        Some(row_id)
    }
}

impl EntityKey for String {
    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn generate() -> Option<Self> {
        None
    }

    fn from_row_id(_row_id: i64) -> Option<Self> {
        None
    }
}

/// A typed record persisted as one row of one table.
pub trait Entity: Send + Sync + Sized {
    type Key: EntityKey;

    /// The shared, immutable store mapping for this type.
    fn metadata() -> &'static EntityMetadata;

    /// Current primary key, if one has been assigned.
    fn key(&self) -> Option<Self::Key>;

    fn set_key(&mut self, key: Self::Key);

    /// Values for every column, in exactly `metadata().columns` order.
    fn column_values(&self) -> Vec<SqlValue>;

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError>;

    /// Populate creation defaults (called by `create` with `set_defaults`).
    fn stamp_created(&mut self, now: DateTime<Utc>) {
        let _ = now;
    }

    /// Refresh update defaults (called by `update` with `set_defaults`).
    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        let _ = now;
    }
}

// ---------------------------------------------------------------------------
// Row decoding helpers shared by the entity implementations
// ---------------------------------------------------------------------------

pub(crate) fn get_uuid(row: &SqliteRow, column: &str) -> Result<Uuid, StoreError> {
    let text: String = row.try_get(column).map_err(map_sqlx_error)?;
    Uuid::parse_str(&text)
        .map_err(|e| StoreError::Query(format!("invalid uuid in column '{column}': {e}")))
}

pub(crate) fn get_opt_uuid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, StoreError> {
    let text: Option<String> = row.try_get(column).map_err(map_sqlx_error)?;
    text.map(|t| {
        Uuid::parse_str(&t)
            .map_err(|e| StoreError::Query(format!("invalid uuid in column '{column}': {e}")))
    })
    .transpose()
}

pub(crate) fn get_datetime(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, StoreError> {
    let text: String = row.try_get(column).map_err(map_sqlx_error)?;
    parse_datetime(&text, column)
}

pub(crate) fn get_opt_datetime(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    let text: Option<String> = row.try_get(column).map_err(map_sqlx_error)?;
    text.map(|t| parse_datetime(&t, column)).transpose()
}

fn parse_datetime(text: &str, column: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid timestamp in column '{column}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_key_generates_v7() {
        let key = <Uuid as EntityKey>::generate().unwrap();
        assert_eq!(key.get_version_num(), 7);
        assert!(<Uuid as EntityKey>::from_row_id(5).is_none());
    }

    #[test]
    fn test_i64_key_comes_from_row_id() {
        assert!(<i64 as EntityKey>::generate().is_none());
        assert_eq!(<i64 as EntityKey>::from_row_id(41), Some(41));
    }

    #[test]
    fn test_key_values_bind_typed() {
        let id = Uuid::now_v7();
        assert_eq!(id.to_value(), SqlValue::Uuid(id));
        assert_eq!(7i64.to_value(), SqlValue::Integer(7));
        assert_eq!(
            "k".to_string().to_value(),
            SqlValue::Text("k".to_string())
        );
    }
}
