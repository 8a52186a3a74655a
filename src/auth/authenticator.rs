use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{error::AuthError, identity::Identity, tokens};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::UserStore;

/// Resolves the raw `Authorization` header to an identity.
///
/// No header means anonymous. Anything other than exactly `Bearer <token>`
/// is rejected before the token is looked at, and a malformed token is
/// rejected before storage is asked.
pub async fn resolve(
    authorization: Option<&HeaderValue>,
    users: &dyn UserStore,
) -> Result<Identity, AuthError> {
    let Some(raw) = authorization else {
        return Ok(Identity::Anonymous);
    };

    let raw = raw.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let plaintext = match raw.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => *token,
        _ => return Err(AuthError::InvalidAuthHeader),
    };

    if !tokens::validate_format(plaintext) {
        return Err(AuthError::InvalidToken);
    }

    let hash = tokens::hash_token(plaintext);
    match users.get_for_token(&hash).await? {
        Some(user) => {
            debug!(user_id = user.id, "request authenticated");
            Ok(Identity::Authenticated(user))
        }
        None => Err(AuthError::InvalidOrExpiredToken),
    }
}

/// Attaches the resolved [`Identity`] to the request, once.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.extensions().get::<Identity>().is_some() {
        return Err(AppError::internal(anyhow::anyhow!(
            "identity already attached to request"
        )));
    }

    let resolved = resolve(
        req.headers().get(header::AUTHORIZATION),
        state.users.as_ref(),
    )
    .await;

    let mut res = match resolved {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => AppError::from(e).into_response(),
    };
    res.headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    Ok(res)
}
