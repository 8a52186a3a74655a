use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::{error::AuthError, identity::Identity};
use crate::error::AppError;
use crate::users::repo_types::User;

/// What a route demands of the caller's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    AllowAnonymous,
    RequireAuthenticated,
}

/// Pure decision: may `identity` enter a route declared with `access`?
pub fn admit(identity: &Identity, access: RouteAccess) -> Result<(), AuthError> {
    if access == RouteAccess::RequireAuthenticated && identity.is_anonymous() {
        return Err(AuthError::AuthenticationRequired);
    }
    Ok(())
}

async fn enforce(access: RouteAccess, req: Request, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<Identity>() {
        Some(identity) => admit(identity, access)?,
        None => admit(&Identity::Anonymous, access)?,
    }
    Ok(next.run(req).await)
}

/// Route layer for `AllowAnonymous` routes. Must sit inside `authenticate`.
pub async fn allow_anonymous(req: Request, next: Next) -> Result<Response, AppError> {
    enforce(RouteAccess::AllowAnonymous, req, next).await
}

/// Route layer for `RequireAuthenticated` routes. Must sit inside `authenticate`.
pub async fn require_authenticated(req: Request, next: Next) -> Result<Response, AppError> {
    enforce(RouteAccess::RequireAuthenticated, req, next).await
}

/// The authenticated caller, for handlers behind [`require_authenticated`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(Identity::user)
            .map(|user| CurrentUser(user.clone()))
            .ok_or_else(|| AuthError::AuthenticationRequired.into())
    }
}
