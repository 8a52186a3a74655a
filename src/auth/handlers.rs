use axum::{extract::State, http::StatusCode, Json};
use tracing::{instrument, warn};

use super::{
    dto::{LoginRequest, TokenResponse},
    password::{verify_missing_blocking, verify_password_blocking},
    services::issue_token,
};
use crate::{
    error::AppError,
    extract::JsonBody,
    state::AppState,
    validator::{validate_email, validate_password_plaintext, Validator},
};

/// Exchanges email and password for a fresh authentication token.
///
/// An unknown email and a wrong password get the same answer.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let email = payload.email.trim().to_string();

    let mut v = Validator::new();
    validate_email(&mut v, &email);
    validate_password_plaintext(&mut v, &payload.password);
    v.finish()?;

    let Some(user) = state.users.get_by_email(&email).await? else {
        verify_missing_blocking(payload.password).await?;
        warn!("login for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(state.tokens.as_ref(), user.id, state.config.token_ttl).await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            authentication_token: token,
        }),
    ))
}
