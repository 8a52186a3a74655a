//! Persistence contracts. Handlers and the authenticator talk to these traits;
//! the Postgres implementations live next to their domain (`users::repo`,
//! `todos::repo`, `auth::repo`).

use std::{future::Future, time::Duration};

use async_trait::async_trait;

use crate::auth::tokens::Token;
use crate::todos::repo_types::Todo;
use crate::users::repo_types::User;
use crate::versioned::VersionedTable;

pub mod error;
#[cfg(test)]
pub mod memory;

use error::{StoreError, StoreResult};

#[async_trait]
pub trait UserStore: VersionedTable<User> {
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// User owning a token with this hash whose expiry is still in the future,
    /// judged by the store's own clock.
    async fn get_for_token(&self, token_hash: &[u8]) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists hash, owner and expiry. The plaintext never reaches storage.
    async fn insert_token(&self, token: &Token) -> StoreResult<()>;
}

#[async_trait]
pub trait TodoStore: VersionedTable<Todo> {
    async fn get_by_id(&self, id: i64) -> StoreResult<Todo>;
    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Todo>>;
}

/// Bounds a single storage call. Dropping the returned future cancels the call.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(StoreError::from_sqlx),
        Err(_) => {
            tracing::error!(timeout_ms = limit.as_millis() as u64, "storage call timed out");
            Err(StoreError::Timeout)
        }
    }
}
