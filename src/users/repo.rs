use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User};
use crate::store::{error::StoreResult, with_timeout, UserStore};
use crate::versioned::VersionedTable;

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl VersionedTable<User> for PgUserStore {
    async fn insert(&self, draft: NewUser) -> StoreResult<User> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, name, email, password_hash, version
            "#,
        )
        .bind(draft.name)
        .bind(draft.email)
        .bind(draft.password_hash)
        .fetch_one(&self.pool);

        with_timeout(self.timeout, query).await
    }

    async fn update_if_version(&self, record: &User) -> StoreResult<Option<i32>> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, version = version + 1
            WHERE id = $4 AND version = $5
            RETURNING version
            "#,
        )
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.id)
        .bind(record.version)
        .fetch_optional(&self.pool);

        with_timeout(self.timeout, query).await
    }

    async fn delete_row(&self, id: i64) -> StoreResult<u64> {
        let query = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool);

        Ok(with_timeout(self.timeout, query).await?.rows_affected())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, created_at, name, email, password_hash, version
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool);

        with_timeout(self.timeout, query).await
    }

    async fn get_for_token(&self, token_hash: &[u8]) -> StoreResult<Option<User>> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT users.id, users.created_at, users.name, users.email,
                   users.password_hash, users.version
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = $1 AND tokens.expiry > now()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool);

        with_timeout(self.timeout, query).await
    }
}
