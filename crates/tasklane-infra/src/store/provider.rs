//! The generic entity provider.
//!
//! One `EntityProvider<E>` implements create/read/list/update/delete for
//! every entity type from its `'static` metadata plus caller-supplied
//! filters. SQL text is assembled from metadata only; caller values reach
//! the store exclusively through the binding path in [`super::sql`], and
//! filter target columns are validated against metadata before rendering.
//!
//! The provider has no opinion on soft vs hard delete: `delete` and
//! `delete_many` remove rows, and a business service that wants soft
//! deletion flips its flag column through `update` instead.
//!
//! Transaction discipline belongs to the caller's [`UnitOfWork`]; the
//! provider only executes against whatever connection/transaction the unit
//! currently holds, in the order issued.

use std::marker::PhantomData;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqliteQueryResult, SqliteRow};
use sqlx::Row;
use tasklane_core::store::{EntityMetadata, Filter, KeyGeneration, SqlValue};
use tasklane_types::error::StoreError;
use tokio_util::sync::CancellationToken;

use super::entity::{Entity, EntityKey};
use super::sql::{bind_value, cancellable, map_sqlx_error, SqlStatement};
use super::uow::UnitOfWork;

/// Pagination and generic search arguments for `get_list`.
///
/// `search` applies a case-insensitive substring match across the entity's
/// searchable columns. `offset`/`limit` skip then take; both absent means
/// the full, unpaginated list.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Generic CRUD engine over one entity type and its key type.
pub struct EntityProvider<E: Entity> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for EntityProvider<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityProvider<E> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }

    /// Insert one row and return its primary key.
    ///
    /// With `set_defaults`, creation timestamps are stamped and a missing
    /// client-generated key is minted before binding. Store-generated keys
    /// come back from the insert itself and are written onto the entity.
    pub async fn create(
        &self,
        uow: &mut UnitOfWork,
        entity: &mut E,
        set_defaults: bool,
        cancel: &CancellationToken,
    ) -> Result<E::Key, StoreError> {
        let meta = E::metadata();
        if set_defaults {
            entity.stamp_created(Utc::now());
            if meta.key.generation == KeyGeneration::ClientGenerated && entity.key().is_none() {
                if let Some(key) = E::Key::generate() {
                    entity.set_key(key);
                }
            }
        }

        match meta.key.generation {
            KeyGeneration::ClientGenerated => {
                let key = entity.key().ok_or_else(|| {
                    StoreError::Validation(format!(
                        "entity for table '{}' has no primary key assigned",
                        meta.table
                    ))
                })?;
                let stmt = build_insert(meta, entity)?;
                execute(uow.connection()?, stmt, cancel).await?;
                Ok(key)
            }
            KeyGeneration::StoreGenerated => {
                let stmt = build_insert(meta, entity)?;
                let row = fetch_one(uow.connection()?, stmt, cancel).await?;
                let row_id: i64 = row.try_get(0).map_err(map_sqlx_error)?;
                let key = E::Key::from_row_id(row_id).ok_or_else(|| {
                    StoreError::Validation(format!(
                        "key type for table '{}' cannot carry a store-generated id",
                        meta.table
                    ))
                })?;
                entity.set_key(key.clone());
                Ok(key)
            }
        }
    }

    /// Insert a batch, returning keys in input order.
    ///
    /// Rows go through the caller's unit of work one by one; whether a
    /// mid-batch failure leaves earlier rows visible is decided entirely by
    /// the unit's transaction.
    pub async fn create_many(
        &self,
        uow: &mut UnitOfWork,
        entities: &mut [E],
        set_defaults: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<E::Key>, StoreError> {
        let mut keys = Vec::with_capacity(entities.len());
        for entity in entities.iter_mut() {
            keys.push(self.create(uow, entity, set_defaults, cancel).await?);
        }
        Ok(keys)
    }

    /// Fetch one row by primary key. Absence is a normal outcome.
    pub async fn get_by_id(
        &self,
        uow: &mut UnitOfWork,
        id: &E::Key,
        cancel: &CancellationToken,
    ) -> Result<Option<E>, StoreError> {
        let meta = E::metadata();
        let mut stmt = SqlStatement::new(format!(
            "select {} from {} where ",
            column_list(meta),
            meta.table
        ));
        stmt.push_filter(Filter::equals(meta.key.column, id.to_value()).render());
        let row = fetch_optional(uow.connection()?, stmt, cancel).await?;
        row.as_ref().map(E::from_row).transpose()
    }

    /// List rows with optional generic search and pagination.
    pub async fn get_list(
        &self,
        uow: &mut UnitOfWork,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<E>, StoreError> {
        let meta = E::metadata();
        let mut stmt = SqlStatement::new(format!(
            "select {} from {}",
            column_list(meta),
            meta.table
        ));

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let rendered: Vec<_> = meta
                .searchable_columns()
                .map(|col| Filter::contains(col.name, search).render())
                .collect();
            if !rendered.is_empty() {
                stmt.push_sql(" where (");
                for (i, filter) in rendered.into_iter().enumerate() {
                    if i > 0 {
                        stmt.push_sql(" or ");
                    }
                    stmt.push_filter(filter);
                }
                stmt.push_sql(")");
            }
        }

        if query.limit.is_some() || query.offset.is_some() {
            // SQLite reads a negative limit as "no limit", which gives
            // offset-only pagination.
            stmt.push_sql(" limit :limit offset :offset");
            stmt.push_param("limit", SqlValue::Integer(query.limit.unwrap_or(-1)));
            stmt.push_param("offset", SqlValue::Integer(query.offset.unwrap_or(0)));
        }

        let rows = fetch_all(uow.connection()?, stmt, cancel).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Fetch rows matching an ad hoc filter combination (AND-joined).
    ///
    /// Every filter's target column must exist in the entity's metadata;
    /// an unknown column is rejected before any I/O.
    pub async fn query(
        &self,
        uow: &mut UnitOfWork,
        filters: &[Filter],
        cancel: &CancellationToken,
    ) -> Result<Vec<E>, StoreError> {
        let meta = E::metadata();
        for filter in filters {
            if meta.column(filter.column()).is_none() {
                return Err(StoreError::Validation(format!(
                    "unknown filter column '{}' for table '{}'",
                    filter.column(),
                    meta.table
                )));
            }
        }

        let mut stmt = SqlStatement::new(format!(
            "select {} from {}",
            column_list(meta),
            meta.table
        ));
        if !filters.is_empty() {
            stmt.push_sql(" where ");
            for (i, filter) in filters.iter().enumerate() {
                if i > 0 {
                    stmt.push_sql(" and ");
                }
                stmt.push_filter(filter.render());
            }
        }

        let rows = fetch_all(uow.connection()?, stmt, cancel).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Update all non-key columns, matched by primary key.
    ///
    /// Returns the affected row count; 0 means "no matching row" and is a
    /// result, not an error. With `set_defaults`, the update timestamp is
    /// refreshed first.
    pub async fn update(
        &self,
        uow: &mut UnitOfWork,
        entity: &mut E,
        set_defaults: bool,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let meta = E::metadata();
        if set_defaults {
            entity.stamp_updated(Utc::now());
        }
        let key = entity.key().ok_or_else(|| {
            StoreError::Validation(format!(
                "cannot update entity for table '{}' without a primary key",
                meta.table
            ))
        })?;

        let values = entity.column_values();
        check_arity(meta, &values)?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (col, value) in meta.columns.iter().zip(values) {
            if col.name == meta.key.column {
                continue;
            }
            assignments.push(format!("{} = :{}", col.name, col.name));
            params.push((col.name, value));
        }
        if assignments.is_empty() {
            return Err(StoreError::Validation(format!(
                "table '{}' has no non-key columns to update",
                meta.table
            )));
        }

        let mut stmt = SqlStatement::new(format!(
            "update {} set {} where ",
            meta.table,
            assignments.join(", ")
        ));
        for (name, value) in params {
            stmt.push_param(name, value);
        }
        stmt.push_filter(Filter::equals(meta.key.column, key.to_value()).render());

        let result = execute(uow.connection()?, stmt, cancel).await?;
        Ok(result.rows_affected())
    }

    /// Hard-delete one row by primary key. Returns the affected count.
    pub async fn delete(
        &self,
        uow: &mut UnitOfWork,
        id: &E::Key,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let meta = E::metadata();
        self.delete_where(uow, Filter::equals(meta.key.column, id.to_value()), cancel)
            .await
    }

    /// Hard-delete a batch by primary keys. An empty batch renders the
    /// membership filter's null-check degrade and affects nothing.
    pub async fn delete_many(
        &self,
        uow: &mut UnitOfWork,
        ids: &[E::Key],
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let meta = E::metadata();
        let values = ids.iter().map(EntityKey::to_value).collect();
        self.delete_where(uow, Filter::any_of(meta.key.column, values), cancel)
            .await
    }

    async fn delete_where(
        &self,
        uow: &mut UnitOfWork,
        filter: Filter,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let meta = E::metadata();
        let mut stmt = SqlStatement::new(format!("delete from {} where ", meta.table));
        stmt.push_filter(filter.render());
        let result = execute(uow.connection()?, stmt, cancel).await?;
        Ok(result.rows_affected())
    }
}

fn column_list(meta: &EntityMetadata) -> String {
    meta.columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_arity(meta: &EntityMetadata, values: &[SqlValue]) -> Result<(), StoreError> {
    if values.len() != meta.columns.len() {
        return Err(StoreError::Validation(format!(
            "entity for table '{}' produced {} values for {} columns",
            meta.table,
            values.len(),
            meta.columns.len()
        )));
    }
    Ok(())
}

fn build_insert<E: Entity>(
    meta: &'static EntityMetadata,
    entity: &E,
) -> Result<SqlStatement, StoreError> {
    let values = entity.column_values();
    check_arity(meta, &values)?;

    let skip_key = meta.key.generation == KeyGeneration::StoreGenerated;
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut params = Vec::new();
    for (col, value) in meta.columns.iter().zip(values) {
        if skip_key && col.name == meta.key.column {
            continue;
        }
        columns.push(col.name);
        placeholders.push(format!(":{}", col.name));
        params.push((col.name, value));
    }

    let mut stmt = SqlStatement::new(format!(
        "insert into {} ({}) values ({})",
        meta.table,
        columns.join(", "),
        placeholders.join(", ")
    ));
    if skip_key {
        stmt.push_sql(&format!(" returning {}", meta.key.column));
    }
    for (name, value) in params {
        stmt.push_param(name, value);
    }
    Ok(stmt)
}

async fn execute(
    conn: &mut SqliteConnection,
    stmt: SqlStatement,
    cancel: &CancellationToken,
) -> Result<SqliteQueryResult, StoreError> {
    let (sql, values) = stmt.finish()?;
    let mut query = sqlx::query(&sql);
    for value in &values {
        query = bind_value(query, value);
    }
    cancellable(cancel, query.execute(conn)).await
}

async fn fetch_one(
    conn: &mut SqliteConnection,
    stmt: SqlStatement,
    cancel: &CancellationToken,
) -> Result<SqliteRow, StoreError> {
    let (sql, values) = stmt.finish()?;
    let mut query = sqlx::query(&sql);
    for value in &values {
        query = bind_value(query, value);
    }
    cancellable(cancel, query.fetch_one(conn)).await
}

async fn fetch_optional(
    conn: &mut SqliteConnection,
    stmt: SqlStatement,
    cancel: &CancellationToken,
) -> Result<Option<SqliteRow>, StoreError> {
    let (sql, values) = stmt.finish()?;
    let mut query = sqlx::query(&sql);
    for value in &values {
        query = bind_value(query, value);
    }
    cancellable(cancel, query.fetch_optional(conn)).await
}

async fn fetch_all(
    conn: &mut SqliteConnection,
    stmt: SqlStatement,
    cancel: &CancellationToken,
) -> Result<Vec<SqliteRow>, StoreError> {
    let (sql, values) = stmt.finish()?;
    let mut query = sqlx::query(&sql);
    for value in &values {
        query = bind_value(query, value);
    }
    cancellable(cancel, query.fetch_all(conn)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connect::ConnectionFactory;
    use crate::store::uow::UnitOfWorkFactory;
    use tasklane_types::action_log::{ActionContext, ActionLogRecord, ActionOutcome};
    use tasklane_types::config::StorageConfig;
    use tasklane_types::task::{Task, TaskStatus};
    use tasklane_types::user::User;
    use uuid::Uuid;

    async fn test_factory() -> (tempfile::TempDir, UnitOfWorkFactory) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/provider.db", dir.path().display());
        let pool = ConnectionFactory::from_config(&StorageConfig::new(url))
            .unwrap()
            .connect()
            .await
            .unwrap();
        (dir, UnitOfWorkFactory::new(pool))
    }

    #[tokio::test]
    async fn test_client_key_round_trip() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut user = User::new("ana@example.com", "Ana");
        let key = provider
            .create(&mut uow, &mut user, true, &cancel)
            .await
            .unwrap();
        assert_eq!(key, user.id);

        let fetched = provider
            .get_by_id(&mut uow, &key, &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_create_generates_missing_client_key() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut user = User::new("blank@example.com", "Blank");
        user.id = Uuid::nil();
        let key = provider
            .create(&mut uow, &mut user, true, &cancel)
            .await
            .unwrap();
        assert_eq!(key.get_version_num(), 7);
        assert_eq!(user.id, key);
    }

    #[tokio::test]
    async fn test_store_key_round_trip() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<ActionLogRecord>::new();

        let ctx = ActionContext {
            method: "POST".to_string(),
            path: "/api/tasks".to_string(),
            origin: "127.0.0.1".to_string(),
            user_agent: "tests".to_string(),
            description: "create task".to_string(),
            ..Default::default()
        };
        let mut record =
            ActionLogRecord::from_context(&ctx, &ActionOutcome::success(201), Utc::now());
        let key = provider
            .create(&mut uow, &mut record, true, &cancel)
            .await
            .unwrap();
        assert!(key >= 1);
        assert_eq!(record.id, key);

        let fetched = provider
            .get_by_id(&mut uow, &key, &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_none() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let missing = provider
            .get_by_id(&mut uow, &Uuid::now_v7(), &cancel)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_create_many_returns_keys_in_input_order() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, true).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut users = vec![
            User::new("a@example.com", "A"),
            User::new("b@example.com", "B"),
            User::new("c@example.com", "C"),
        ];
        let keys = provider
            .create_many(&mut uow, &mut users, true, &cancel)
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let expected: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut first = User::new("same@example.com", "First");
        provider
            .create(&mut uow, &mut first, true, &cancel)
            .await
            .unwrap();

        let mut second = User::new("same@example.com", "Second");
        let err = provider
            .create(&mut uow, &mut second, true, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_missing_row_returns_zero() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut never_inserted = User::new("nobody@example.com", "Nobody");
        let affected = provider
            .update(&mut uow, &mut never_inserted, true, &cancel)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_update_persists_changes_and_refreshes_timestamp() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut user = User::new("rename@example.com", "Before");
        provider
            .create(&mut uow, &mut user, true, &cancel)
            .await
            .unwrap();

        user.display_name = "After".to_string();
        let affected = provider
            .update(&mut uow, &mut user, true, &cancel)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let fetched = provider
            .get_by_id(&mut uow, &user.id, &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.display_name, "After");
        assert!(fetched.updated_at > fetched.created_at);
    }

    #[tokio::test]
    async fn test_delete_twice_reports_then_zero() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut user = User::new("gone@example.com", "Gone");
        let key = provider
            .create(&mut uow, &mut user, true, &cancel)
            .await
            .unwrap();

        assert_eq!(provider.delete(&mut uow, &key, &cancel).await.unwrap(), 1);
        assert_eq!(provider.delete(&mut uow, &key, &cancel).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_many_and_empty_batch() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut users = vec![
            User::new("d1@example.com", "D1"),
            User::new("d2@example.com", "D2"),
            User::new("d3@example.com", "D3"),
        ];
        let keys = provider
            .create_many(&mut uow, &mut users, true, &cancel)
            .await
            .unwrap();

        let affected = provider
            .delete_many(&mut uow, &keys[..2], &cancel)
            .await
            .unwrap();
        assert_eq!(affected, 2);

        // Empty batch degrades to the membership null check and deletes nothing.
        let affected = provider.delete_many(&mut uow, &[], &cancel).await.unwrap();
        assert_eq!(affected, 0);

        let survivor = provider
            .get_by_id(&mut uow, &keys[2], &cancel)
            .await
            .unwrap();
        assert!(survivor.is_some());
    }

    #[tokio::test]
    async fn test_get_list_search_and_pagination() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        let mut users = vec![
            User::new("one@example.com", "Quarterly Report"),
            User::new("two@example.com", "Weekly REPORT digest"),
            User::new("three@example.com", "Grocery list"),
            User::new("four@example.com", "Trip planning"),
            User::new("five@example.com", "Inbox zero"),
        ];
        provider
            .create_many(&mut uow, &mut users, true, &cancel)
            .await
            .unwrap();

        let found = provider
            .get_list(
                &mut uow,
                &ListQuery {
                    search: Some("report".to_string()),
                    ..Default::default()
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        // Search also matches the email column.
        let found = provider
            .get_list(
                &mut uow,
                &ListQuery {
                    search: Some("three@".to_string()),
                    ..Default::default()
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let page = provider
            .get_list(
                &mut uow,
                &ListQuery {
                    offset: Some(2),
                    limit: Some(2),
                    search: None,
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 2);

        // Offset without a limit skips and takes the rest.
        let tail = provider
            .get_list(
                &mut uow,
                &ListQuery {
                    offset: Some(3),
                    ..Default::default()
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(tail.len(), 2);

        let all = provider
            .get_list(&mut uow, &ListQuery::default(), &cancel)
            .await
            .unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_query_with_filters() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let users = EntityProvider::<User>::new();
        let tasks = EntityProvider::<Task>::new();

        let mut owner = User::new("owner@example.com", "Owner");
        users
            .create(&mut uow, &mut owner, true, &cancel)
            .await
            .unwrap();

        let mut batch = vec![
            Task::new(owner.id, "Write report"),
            Task::new(owner.id, "Review patch"),
            Task::new(owner.id, "File expenses"),
        ];
        batch[1].status = TaskStatus::Done;
        tasks
            .create_many(&mut uow, &mut batch, true, &cancel)
            .await
            .unwrap();

        let todo = tasks
            .query(
                &mut uow,
                &[Filter::equals("status", TaskStatus::Todo.to_string())],
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(todo.len(), 2);

        let either = tasks
            .query(
                &mut uow,
                &[Filter::any_of(
                    "status",
                    vec![
                        SqlValue::Text(TaskStatus::Todo.to_string()),
                        SqlValue::Text(TaskStatus::Done.to_string()),
                    ],
                )],
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(either.len(), 3);

        let none_done = tasks
            .query(
                &mut uow,
                &[
                    Filter::equals("user_id", owner.id),
                    Filter::equals("status", TaskStatus::Done.to_string()).excluded(),
                ],
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(none_done.len(), 2);

        let err = tasks
            .query(&mut uow, &[Filter::is_null("no_such_column")], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_provider_honors_cancellation() {
        let (_dir, factory) = test_factory().await;
        let cancel = CancellationToken::new();
        let mut uow = factory.create(&cancel, false).await.unwrap();
        let provider = EntityProvider::<User>::new();

        cancel.cancel();
        let result = provider.get_by_id(&mut uow, &Uuid::now_v7(), &cancel).await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
    }
}
