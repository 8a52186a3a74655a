use axum::{
    middleware,
    routing::{patch, post},
    Router,
};

use crate::auth::gate::{allow_anonymous, require_authenticated};
use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    let authenticated = Router::new()
        .route("/users/me", patch(handlers::update_me))
        .route_layer(middleware::from_fn(require_authenticated));

    Router::new()
        .route("/register", post(handlers::register))
        .route_layer(middleware::from_fn(allow_anonymous))
        .merge(authenticated)
}
