//! The single parameter-binding path.
//!
//! Statements are assembled as SQL text with named `:placeholder`s plus an
//! ordered parameter list; placeholders always appear in the same order the
//! parameters were pushed. `finish` resolves every named placeholder to the
//! driver's positional `?` form (one `?` per element for array parameters,
//! so membership lists bind element-typed like every other value) and
//! flattens the values to match. No value is ever interpolated into SQL
//! text.

use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use tasklane_core::store::{RenderedFilter, SqlParam, SqlValue};
use tasklane_types::error::StoreError;
use tokio_util::sync::CancellationToken;

/// A statement under construction: SQL text plus its parameters in
/// placeholder order.
#[derive(Debug, Default)]
pub struct SqlStatement {
    sql: String,
    params: Vec<SqlParam>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn push_sql(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Append a parameter whose placeholder was already written into the SQL.
    pub fn push_param(&mut self, name: impl Into<String>, value: SqlValue) {
        self.params.push(SqlParam {
            name: name.into(),
            value,
        });
    }

    /// Append a rendered filter's fragment and parameter together.
    pub fn push_filter(&mut self, rendered: RenderedFilter) {
        self.sql.push_str(&rendered.fragment);
        if let Some(param) = rendered.param {
            self.params.push(param);
        }
    }

    /// Finalize: resolve placeholders to positional `?` form and flatten
    /// the parameters to scalar bind order.
    ///
    /// The SQLite driver binds positional `?` parameters only, so every
    /// named placeholder is rewritten here, one `?` per scalar and one per
    /// array element. Placeholders appear in push order, which keeps the
    /// rewritten SQL aligned with the flattened value list.
    pub fn finish(self) -> Result<(String, Vec<SqlValue>), StoreError> {
        let mut sql = self.sql;
        let mut flat = Vec::with_capacity(self.params.len());
        for param in self.params {
            let positional = match &param.value {
                SqlValue::Array(elems) if elems.is_empty() => {
                    return Err(StoreError::Validation(format!(
                        "empty membership list for parameter ':{}'",
                        param.name
                    )));
                }
                SqlValue::Array(elems) => vec!["?"; elems.len()].join(", "),
                _ => "?".to_string(),
            };
            let needle = format!(":{}", param.name);
            let resolved = sql.replacen(&needle, &positional, 1);
            if resolved == sql {
                return Err(StoreError::Validation(format!(
                    "parameter ':{}' has no placeholder in statement",
                    param.name
                )));
            }
            sql = resolved;
            match param.value {
                SqlValue::Array(elems) => flat.extend(elems),
                value => flat.push(value),
            }
        }
        Ok((sql, flat))
    }
}

/// Bind one scalar value. Uuids bind as canonical text, timestamps as
/// RFC 3339 text, matching the column encodings in the migrations.
pub fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Integer(i) => query.bind(*i),
        SqlValue::Real(f) => query.bind(*f),
        SqlValue::Boolean(b) => query.bind(*b),
        SqlValue::Uuid(u) => query.bind(u.to_string()),
        SqlValue::Timestamp(ts) => query.bind(ts.to_rfc3339()),
        // Arrays are flattened by `SqlStatement::finish` before binding.
        SqlValue::Array(_) => query.bind(Option::<String>::None),
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including their extended forms
/// in the low byte. The busy timeout expired while another writer held the
/// lock; the caller may retry.
fn is_lock_contention(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code()
        .and_then(|code| code.parse::<u32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

/// Classify a driver error into the stable store-error kinds.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => StoreError::Constraint(db.message().to_string()),
            _ if is_lock_contention(&*db) => StoreError::Transient(db.message().to_string()),
            _ => StoreError::Query(db.message().to_string()),
        },
        sqlx::Error::Io(e) => StoreError::Transient(e.to_string()),
        sqlx::Error::PoolTimedOut => StoreError::Transient("connection pool timed out".to_string()),
        sqlx::Error::PoolClosed => StoreError::Transient("connection pool closed".to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// Await a store future, aborting promptly if the caller's cancellation
/// signal fires first.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, StoreError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        res = fut => res.map_err(map_sqlx_error),
    }
}
