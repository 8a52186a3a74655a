use std::time::Duration;

use tracing::info;

use super::tokens::{self, Token};
use crate::error::AppError;
use crate::store::TokenStore;

/// Generates a token for `user_id` and stores its hash. The returned value is
/// the only place the plaintext will ever exist.
pub async fn issue_token(
    tokens_store: &dyn TokenStore,
    user_id: i64,
    ttl: Duration,
) -> Result<Token, AppError> {
    let token = tokens::generate(user_id, ttl)?;
    tokens_store.insert_token(&token).await?;
    info!(user_id, expiry = %token.expiry, "authentication token issued");
    Ok(token)
}
