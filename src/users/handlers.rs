use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::{
    dto::{RegisterRequest, UpdateUserRequest, UserResponse},
    repo_types::{NewUser, User},
};
use crate::{
    auth::{gate::CurrentUser, password::hash_password_blocking},
    error::AppError,
    extract::JsonBody,
    state::AppState,
    store::error::StoreError,
    validator::{validate_email, validate_name, validate_password_plaintext, Validator},
    versioned,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = payload.email.trim().to_string();

    let mut v = Validator::new();
    validate_name(&mut v, &payload.name);
    validate_email(&mut v, &email);
    validate_password_plaintext(&mut v, &payload.password);
    v.finish()?;

    let password_hash = hash_password_blocking(payload.password).await?;

    let user = versioned::insert::<User, _>(
        state.users.as_ref(),
        NewUser {
            name: payload.name,
            email,
            password_hash,
        },
    )
    .await
    .map_err(duplicate_email)?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::ACCEPTED, Json(UserResponse { user })))
}

#[instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if payload.version.is_some_and(|v| v != user.version) {
        return Err(AppError::EditConflict);
    }

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(email) = payload.email {
        user.email = email.trim().to_string();
    }

    let mut v = Validator::new();
    validate_name(&mut v, &user.name);
    validate_email(&mut v, &user.email);
    if let Some(password) = &payload.password {
        validate_password_plaintext(&mut v, password);
    }
    v.finish()?;

    if let Some(password) = payload.password {
        user.password_hash = hash_password_blocking(password).await?;
    }

    let user = versioned::update(state.users.as_ref(), user)
        .await
        .map_err(duplicate_email)?;

    info!(user_id = user.id, version = user.version, "user updated");
    Ok(Json(UserResponse { user }))
}

fn duplicate_email(e: StoreError) -> AppError {
    match e {
        StoreError::DuplicateKey { .. } => {
            AppError::field("email", "a user with this email address already exists")
        }
        other => other.into(),
    }
}
