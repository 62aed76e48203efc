//! Unit of work: a scoped connection plus optional transaction.
//!
//! One unit of work is exclusively owned by one logical operation. Commit
//! and rollback are terminal and act only when a transaction is held;
//! without one they are no-ops. Dropping an unterminated transactional unit
//! rolls it back (sqlx transaction drop semantics) and then returns the
//! connection to the pool, on every exit path -- including panics and
//! cancellation between creation and disposal.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;
use tasklane_types::error::StoreError;
use tokio_util::sync::CancellationToken;

use super::sql::{cancellable, map_sqlx_error};

enum Inner {
    /// Plain pooled connection; commit/rollback are no-ops.
    Connection(PoolConnection<Sqlite>),
    /// Owned transaction (holds its pooled connection until terminated).
    Transaction(Option<Transaction<'static, Sqlite>>),
}

/// A connection/transaction pair owned by exactly one logical operation.
pub struct UnitOfWork {
    inner: Inner,
}

impl UnitOfWork {
    /// Executor access for the provider. Fails once a transactional unit
    /// has been committed or rolled back.
    pub fn connection(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        match &mut self.inner {
            Inner::Connection(conn) => Ok(&mut **conn),
            Inner::Transaction(Some(tx)) => Ok(&mut **tx),
            Inner::Transaction(None) => Err(StoreError::Validation(
                "unit of work already terminated".to_string(),
            )),
        }
    }

    /// Whether this unit currently holds an open transaction.
    pub fn in_transaction(&self) -> bool {
        matches!(self.inner, Inner::Transaction(Some(_)))
    }

    /// Commit the held transaction. No-op without one (or after termination).
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        if let Inner::Transaction(slot) = &mut self.inner {
            if let Some(tx) = slot.take() {
                tx.commit().await.map_err(map_sqlx_error)?;
            }
        }
        Ok(())
    }

    /// Roll back the held transaction. No-op without one (or after termination).
    pub async fn rollback(&mut self) -> Result<(), StoreError> {
        if let Inner::Transaction(slot) = &mut self.inner {
            if let Some(tx) = slot.take() {
                tx.rollback().await.map_err(map_sqlx_error)?;
            }
        }
        Ok(())
    }
}

/// Creates units of work from one shared pool.
#[derive(Clone)]
pub struct UnitOfWorkFactory {
    pool: SqlitePool,
}

impl UnitOfWorkFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection (and begin a transaction when requested),
    /// honoring the caller's cancellation signal.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        use_transaction: bool,
    ) -> Result<UnitOfWork, StoreError> {
        let inner = if use_transaction {
            let tx = cancellable(cancel, self.pool.begin()).await?;
            Inner::Transaction(Some(tx))
        } else {
            let conn = cancellable(cancel, self.pool.acquire()).await?;
            Inner::Connection(conn)
        };
        Ok(UnitOfWork { inner })
    }
}
