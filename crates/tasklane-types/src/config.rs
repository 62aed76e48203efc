//! Storage configuration for Tasklane.
//!
//! `StorageConfig` is the `[storage]` section of the application's
//! `config.toml`. The connection string may reference environment variables
//! in `%VAR%`, `$VAR` or `${VAR}` form; expansion happens in the
//! infrastructure layer when the connection factory is built.

use serde::{Deserialize, Serialize};

/// Connection settings for the relational store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sqlx connection string, e.g. `sqlite://$TASKLANE_DATA_DIR/tasklane.db`.
    pub connection_string: String,

    /// Maximum connections in the read pool.
    #[serde(default = "default_max_read_connections")]
    pub max_read_connections: u32,

    /// SQLite busy timeout in seconds.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_max_read_connections() -> u32 {
    8
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl StorageConfig {
    /// Config pointing at the given connection string with default pool settings.
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            max_read_connections: default_max_read_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}
