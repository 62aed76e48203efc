//! Connection factory with environment-variable expansion.
//!
//! The configured connection string may reference environment variables in
//! three forms: `%VAR%`, `$VAR` and `${VAR}`. An unset variable is a fatal
//! configuration error; a `%` or `$` that does not introduce a valid
//! reference passes through literally.
//!
//! Pools open in WAL journal mode with foreign keys enforced and a busy
//! timeout. `connect` opens eagerly and runs migrations; `connect_lazy`
//! defers the first open to the caller and leaves the schema alone.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tasklane_types::config::StorageConfig;
use tasklane_types::error::{ConfigError, StoreError};

use super::sql::map_sqlx_error;

/// Expand `%VAR%`, `$VAR` and `${VAR}` references against the process
/// environment. Returns an error naming the first unset variable.
pub fn expand_env(raw: &str) -> Result<String, ConfigError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '%' => {
                if let Some(len) = chars[i + 1..].iter().position(|&c| c == '%') {
                    let name: String = chars[i + 1..i + 1 + len].iter().collect();
                    if is_ident(&name) {
                        out.push_str(&lookup(&name)?);
                        i += len + 2;
                        continue;
                    }
                }
                out.push('%');
                i += 1;
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                if let Some(len) = chars[i + 2..].iter().position(|&c| c == '}') {
                    let name: String = chars[i + 2..i + 2 + len].iter().collect();
                    if !name.is_empty() {
                        out.push_str(&lookup(&name)?);
                        i += len + 3;
                        continue;
                    }
                }
                out.push('$');
                i += 1;
            }
            '$' if chars.get(i + 1).copied().is_some_and(is_ident_start) => {
                let mut end = i + 1;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[i + 1..end].iter().collect();
                out.push_str(&lookup(&name)?);
                i = end;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

fn lookup(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::UnsetVariable(name.to_string()))
}

/// Produces SQLite pools from a validated, expanded connection string.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    options: SqliteConnectOptions,
    max_connections: u32,
}

impl ConnectionFactory {
    /// Expand and parse the configured connection string.
    ///
    /// An empty or unexpandable connection string is a fatal startup error.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ConfigError> {
        if config.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }
        let expanded = expand_env(&config.connection_string)?;
        let options = SqliteConnectOptions::from_str(&expanded)
            .map_err(|e| ConfigError::InvalidConnectionString(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .create_if_missing(true);
        Ok(Self {
            options,
            max_connections: config.max_read_connections,
        })
    }

    /// Open the pool eagerly and run migrations.
    ///
    /// Entity declarations are validated first: a bad declaration must
    /// fail bring-up, not the first query that touches it.
    pub async fn connect(&self) -> Result<SqlitePool, StoreError> {
        super::entities::metadata_registry()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.options.clone())
            .await
            .map_err(map_sqlx_error)?;
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(pool)
    }

    /// Build the pool without opening a connection; the first caller opens.
    ///
    /// No migrations run on this path -- it is for callers that manage the
    /// schema themselves.
    pub fn connect_lazy(&self) -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_lazy_with(self.options.clone())
    }
}
