use crate::state::AppState;
use axum::{middleware, routing::post, Router};

pub mod authenticator;
mod dto;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod password;
pub mod repo;
pub mod services;
pub mod tokens;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route_layer(middleware::from_fn(gate::allow_anonymous))
}
