use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::tokens::Token;
use crate::store::{error::StoreResult, with_timeout, TokenStore};

#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgTokenStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert_token(&self, token: &Token) -> StoreResult<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .execute(&self.pool);

        with_timeout(self.timeout, query).await?;
        Ok(())
    }
}
