//! Independent action-log write path.
//!
//! The writer wraps a unit of business work. After the wrapped work
//! finishes -- committed or rolled back, succeeded or failed -- it opens
//! its **own** unit of work with its own transaction and persists an
//! [`ActionLogRecord`]. The two failure domains are deliberately separate:
//! a rolled-back business operation still leaves an audit trail, and an
//! audit-write failure is logged locally and never re-raised, so it can
//! neither mask nor roll back the business result.

use std::fmt::Display;

use chrono::Utc;
use tasklane_types::action_log::{ActionContext, ActionLogRecord, ActionOutcome};
use tasklane_types::error::StoreError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::provider::EntityProvider;
use super::uow::UnitOfWorkFactory;

/// Best-effort persistence of audit records, decoupled from the business
/// transaction.
pub struct ActionLogWriter {
    factory: UnitOfWorkFactory,
    provider: EntityProvider<ActionLogRecord>,
}

impl ActionLogWriter {
    pub fn new(factory: UnitOfWorkFactory) -> Self {
        Self {
            factory,
            provider: EntityProvider::new(),
        }
    }

    /// Persist one audit record for a finished operation.
    ///
    /// Never returns an error: failures are logged and swallowed here.
    pub async fn record(&self, ctx: &ActionContext, outcome: &ActionOutcome) {
        if let Err(err) = self.try_record(ctx, outcome).await {
            warn!(
                error = %err,
                method = %ctx.method,
                path = %ctx.path,
                "failed to persist action log record"
            );
        }
    }

    async fn try_record(
        &self,
        ctx: &ActionContext,
        outcome: &ActionOutcome,
    ) -> Result<(), StoreError> {
        // Audit writes finish regardless of the business operation's
        // cancellation signal, so they run under their own token.
        let cancel = CancellationToken::new();
        let mut uow = self.factory.create(&cancel, true).await?;
        let mut record = ActionLogRecord::from_context(ctx, outcome, Utc::now());
        self.provider
            .create(&mut uow, &mut record, true, &cancel)
            .await?;
        uow.commit().await
    }

    /// Decorate a unit of business work with audit hooks.
    ///
    /// Awaits the wrapped future, derives the outcome from its result
    /// (`success_status` on `Ok`, the error's display text on `Err`),
    /// records, and returns the original result untouched. Failures are
    /// recorded without a status code; callers that know how their errors
    /// render use [`observe_with`](Self::observe_with) instead.
    pub async fn observe<T, E, F>(
        &self,
        ctx: &ActionContext,
        success_status: u16,
        work: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        self.observe_with(ctx, success_status, |_| None, work).await
    }

    /// [`observe`](Self::observe) with a caller-supplied mapping from the
    /// error to a response status, so failed operations carry their status
    /// into the record.
    pub async fn observe_with<T, E, F>(
        &self,
        ctx: &ActionContext,
        success_status: u16,
        failure_status: impl Fn(&E) -> Option<u16>,
        work: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        let result = work.await;
        let outcome = match &result {
            Ok(_) => ActionOutcome::success(success_status),
            Err(err) => ActionOutcome::failure(failure_status(err), err.to_string()),
        };
        self.record(ctx, &outcome).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connect::ConnectionFactory;
    use tasklane_types::config::StorageConfig;
    use tasklane_types::user::User;

    async fn test_factory() -> (tempfile::TempDir, UnitOfWorkFactory) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/audit.db", dir.path().display());
        let pool = ConnectionFactory::from_config(&StorageConfig::new(url))
            .unwrap()
            .connect()
            .await
            .unwrap();
        (dir, UnitOfWorkFactory::new(pool))
    }

    fn test_context() -> ActionContext {
        ActionContext {
            origin: "10.0.0.7".to_string(),
            user_agent: "tests".to_string(),
            method: "POST".to_string(),
            path: "/api/areas".to_string(),
            description: "create area".to_string(),
            ..Default::default()
        }
    }

    async fn fetch_records(factory: &UnitOfWorkFactory) -> Vec<ActionLogRecord> {
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        EntityProvider::<ActionLogRecord>::new()
            .query(&mut uow, &[], &cancel)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_operation_still_produces_record() {
        let (_dir, factory) = test_factory().await;
        let writer = ActionLogWriter::new(factory.clone());

        let result: Result<(), StoreError> = writer
            .observe(&test_context(), 201, async {
                Err(StoreError::Constraint("area name taken".to_string()))
            })
            .await;
        assert!(result.is_err());

        let records = fetch_records(&factory).await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.method, "POST");
        assert_eq!(record.path, "/api/areas");
        assert!(record.status.is_none());
        assert!(
            record
                .error
                .as_deref()
                .unwrap()
                .contains("area name taken")
        );
    }

    #[tokio::test]
    async fn test_successful_operation_records_status() {
        let (_dir, factory) = test_factory().await;
        let writer = ActionLogWriter::new(factory.clone());

        let result: Result<u32, StoreError> =
            writer.observe(&test_context(), 201, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let records = fetch_records(&factory).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Some(201));
        assert!(records[0].error.is_none());
    }

    #[tokio::test]
    async fn test_failure_status_mapping_carries_into_record() {
        let (_dir, factory) = test_factory().await;
        let writer = ActionLogWriter::new(factory.clone());

        let result: Result<(), StoreError> = writer
            .observe_with(
                &test_context(),
                201,
                |err| match err {
                    StoreError::Constraint(_) => Some(409),
                    _ => None,
                },
                async { Err(StoreError::Constraint("area name taken".to_string())) },
            )
            .await;
        assert!(result.is_err());

        let records = fetch_records(&factory).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Some(409));
        assert!(records[0].error.is_some());
    }

    #[tokio::test]
    async fn test_rolled_back_business_work_still_audited() {
        let (_dir, factory) = test_factory().await;
        let writer = ActionLogWriter::new(factory.clone());
        let cancel = CancellationToken::new();

        let result: Result<(), StoreError> = writer
            .observe(&test_context(), 200, async {
                let mut uow = factory.create(&cancel, true).await?;
                let mut user = User::new("rolled@example.com", "Rolled");
                EntityProvider::<User>::new()
                    .create(&mut uow, &mut user, true, &cancel)
                    .await?;
                uow.rollback().await?;
                Err(StoreError::Validation("rejected after insert".to_string()))
            })
            .await;
        assert!(result.is_err());

        // The business write rolled back, the audit record committed.
        let users = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(factory.pool())
            .await
            .unwrap();
        let n: i64 = sqlx::Row::get(&users, "n");
        assert_eq!(n, 0);
        assert_eq!(fetch_records(&factory).await.len(), 1);
    }

    #[tokio::test]
    async fn test_broken_audit_store_never_disturbs_result() {
        // Point the writer at a database that has no schema: every audit
        // insert fails, the wrapped results come back untouched.
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/no-schema.db", dir.path().display());
        let pool = ConnectionFactory::from_config(&StorageConfig::new(url))
            .unwrap()
            .connect_lazy();
        let writer = ActionLogWriter::new(UnitOfWorkFactory::new(pool));

        let ok: Result<&str, StoreError> =
            writer.observe(&test_context(), 200, async { Ok("fine") }).await;
        assert_eq!(ok.unwrap(), "fine");

        let err: Result<(), StoreError> = writer
            .observe(&test_context(), 200, async {
                Err(StoreError::Transient("store offline".to_string()))
            })
            .await;
        assert!(matches!(err, Err(StoreError::Transient(_))));
    }
}
