use thiserror::Error;

/// Errors from the generic storage layer.
///
/// "Row not found" is deliberately absent: a missing row surfaces as
/// `Option::None` or an affected count of 0, never as an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity, timeout or pool failure. Safe to retry at a higher layer.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// Unique, foreign-key, not-null or check constraint violation.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Malformed filter or entity, rejected before any I/O.
    #[error("validation failure: {0}")]
    Validation(String),

    /// Any other store failure (syntax, decoding, migration).
    #[error("query error: {0}")]
    Query(String),

    /// The caller's cancellation signal fired before the operation finished.
    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from configuration loading and connection-string expansion.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("connection string is empty")]
    MissingConnectionString,

    #[error("environment variable '{0}' referenced by the connection string is not set")]
    UnsetVariable(String),

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("config parse error: {0}")]
    Parse(String),
}

/// Errors raised while registering entity metadata at startup.
///
/// Any of these is fatal: the process must not serve requests with a
/// half-validated schema description.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("entity table name is empty")]
    EmptyTableName,

    #[error("table '{0}' registered twice")]
    DuplicateTable(String),

    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' primary key column '{column}' is not in the column list")]
    MissingKeyColumn { table: String, column: String },

    #[error("table '{table}' primary key column '{column}' store type does not match its descriptor")]
    KeyTypeMismatch { table: String, column: String },

    #[error("table '{table}' uses a store-generated key on non-integer column '{column}'")]
    NonIntegerGeneratedKey { table: String, column: String },
}

/// Errors from the real-time subscription registry.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The push transport rejected a group join/leave.
    #[error("group membership update failed: {0}")]
    Membership(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Constraint("UNIQUE constraint failed: users.email".to_string());
        assert_eq!(
            err.to_string(),
            "constraint violation: UNIQUE constraint failed: users.email"
        );
    }

    #[test]
    fn test_config_error_names_variable() {
        let err = ConfigError::UnsetVariable("DB_PWD".to_string());
        assert!(err.to_string().contains("DB_PWD"));
    }

    #[test]
    fn test_metadata_error_display() {
        let err = MetadataError::MissingKeyColumn {
            table: "tasks".to_string(),
            column: "id".to_string(),
        };
        assert!(err.to_string().contains("tasks"));
        assert!(err.to_string().contains("id"));
    }
}
