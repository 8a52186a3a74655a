use axum::{middleware, routing::get, Router};

use crate::auth::gate::require_authenticated;
use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

/// Every todo route requires an authenticated caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_mine).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/user/:id/todos", get(handlers::list_for_user))
        .route_layer(middleware::from_fn(require_authenticated))
}
