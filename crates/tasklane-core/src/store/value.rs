//! The value model for bound SQL parameters.
//!
//! Every value that crosses the predicate -> provider -> bind-path boundary
//! is an [`SqlValue`]. Keeping one value type makes the binding path a
//! single exhaustive match, so no value can reach the database through a
//! second, unchecked route.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::metadata::StoreType;

/// A value destined for exactly one bound SQL parameter.
///
/// `Array` is only valid for membership (`in`/`not in`) parameters; the
/// binding path expands it into one placeholder per element, each bound
/// with the element's own store type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Array(Vec<SqlValue>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// The store-side type this value binds as.
    ///
    /// This is the one centralized type-to-store-type mapping; array values
    /// report their element type so membership lists bind element-typed.
    pub fn store_type(&self) -> Option<StoreType> {
        match self {
            SqlValue::Null => None,
            SqlValue::Text(_) => Some(StoreType::Text),
            SqlValue::Integer(_) => Some(StoreType::Integer),
            SqlValue::Real(_) => Some(StoreType::Real),
            SqlValue::Boolean(_) => Some(StoreType::Boolean),
            SqlValue::Uuid(_) => Some(StoreType::Uuid),
            SqlValue::Timestamp(_) => Some(StoreType::Timestamp),
            SqlValue::Array(elems) => elems.first().and_then(SqlValue::store_type),
        }
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

impl<T> From<Vec<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Vec<T>) -> Self {
        SqlValue::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_none_becomes_null() {
        let v: SqlValue = Option::<i64>::None.into();
        assert!(v.is_null());
        assert_eq!(v.store_type(), None);
    }

    #[test]
    fn test_array_reports_element_store_type() {
        let ids = vec![Uuid::now_v7(), Uuid::now_v7()];
        let v: SqlValue = ids.into();
        assert_eq!(v.store_type(), Some(StoreType::Uuid));
    }

    #[test]
    fn test_scalar_store_types() {
        assert_eq!(SqlValue::from("x").store_type(), Some(StoreType::Text));
        assert_eq!(SqlValue::from(3i64).store_type(), Some(StoreType::Integer));
        assert_eq!(SqlValue::from(true).store_type(), Some(StoreType::Boolean));
        assert_eq!(
            SqlValue::from(Utc::now()).store_type(),
            Some(StoreType::Timestamp)
        );
    }
}
