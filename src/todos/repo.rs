use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewTodo, Todo};
use crate::store::{
    error::{StoreError, StoreResult},
    with_timeout, TodoStore,
};
use crate::versioned::VersionedTable;

#[derive(Clone, Debug)]
pub struct PgTodoStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgTodoStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl VersionedTable<Todo> for PgTodoStore {
    async fn insert(&self, draft: NewTodo) -> StoreResult<Todo> {
        let query = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (name, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, name, description, done, user_id, version
            "#,
        )
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.user_id)
        .fetch_one(&self.pool);

        with_timeout(self.timeout, query).await
    }

    async fn update_if_version(&self, record: &Todo) -> StoreResult<Option<i32>> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE todos
            SET name = $1, description = $2, done = $3, version = version + 1
            WHERE id = $4 AND version = $5
            RETURNING version
            "#,
        )
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.done)
        .bind(record.id)
        .bind(record.version)
        .fetch_optional(&self.pool);

        with_timeout(self.timeout, query).await
    }

    async fn delete_row(&self, id: i64) -> StoreResult<u64> {
        let query = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool);

        Ok(with_timeout(self.timeout, query).await?.rows_affected())
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Todo> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        let query = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, created_at, name, description, done, user_id, version
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool);

        with_timeout(self.timeout, query)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Todo>> {
        let query = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, created_at, name, description, done, user_id, version
            FROM todos
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool);

        with_timeout(self.timeout, query).await
    }
}
