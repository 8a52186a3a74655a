use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateTodoRequest, MessageResponse, TodoResponse, TodosResponse, UpdateTodoRequest},
    repo_types::{NewTodo, Todo},
};
use crate::{
    auth::gate::CurrentUser,
    error::AppError,
    extract::{JsonBody, RecordId},
    state::AppState,
    users::repo_types::User,
    validator::Validator,
    versioned,
};

const NAME_MAX_BYTES: usize = 100;
const DESCRIPTION_MAX_BYTES: usize = 1000;

fn validate_todo(v: &mut Validator, name: &str, description: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= NAME_MAX_BYTES,
        "name",
        "must not be more than 100 bytes long",
    );
    v.check(
        description.len() <= DESCRIPTION_MAX_BYTES,
        "description",
        "must not be more than 1000 bytes long",
    );
}

/// A todo the caller owns. Someone else's todo is reported as missing.
async fn owned_todo(state: &AppState, user: &User, id: i64) -> Result<Todo, AppError> {
    let todo = state.todos.get_by_id(id).await?;
    if todo.user_id != user.id {
        warn!(todo_id = id, user_id = user.id, "todo owned by another user");
        return Err(AppError::NotFound);
    }
    Ok(todo)
}

#[instrument(skip_all)]
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TodosResponse>, AppError> {
    let todos = state.todos.list_by_user(user.id).await?;
    Ok(Json(TodosResponse { todos }))
}

#[instrument(skip_all)]
pub async fn list_for_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RecordId(user_id): RecordId,
) -> Result<Json<TodosResponse>, AppError> {
    if user_id != user.id {
        return Err(AppError::NotFound);
    }
    let todos = state.todos.list_by_user(user_id).await?;
    Ok(Json(TodosResponse { todos }))
}

#[instrument(skip_all)]
pub async fn get_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = owned_todo(&state, &user, id).await?;
    Ok(Json(TodoResponse { todo }))
}

#[instrument(skip_all)]
pub async fn create_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(payload): JsonBody<CreateTodoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();
    validate_todo(&mut v, &payload.name, &payload.description);
    v.finish()?;

    let todo = versioned::insert::<Todo, _>(
        state.todos.as_ref(),
        NewTodo {
            name: payload.name,
            description: payload.description,
            user_id: user.id,
        },
    )
    .await?;

    info!(todo_id = todo.id, user_id = user.id, "todo created");
    let location = format!("/todos/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoResponse { todo }),
    ))
}

#[instrument(skip_all)]
pub async fn update_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RecordId(id): RecordId,
    JsonBody(payload): JsonBody<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, AppError> {
    let mut todo = owned_todo(&state, &user, id).await?;

    if payload.version.is_some_and(|v| v != todo.version) {
        warn!(todo_id = id, "client version is stale");
        return Err(AppError::EditConflict);
    }

    if let Some(name) = payload.name {
        todo.name = name;
    }
    if let Some(description) = payload.description {
        todo.description = description;
    }
    if let Some(done) = payload.done {
        todo.done = done;
    }

    let mut v = Validator::new();
    validate_todo(&mut v, &todo.name, &todo.description);
    v.finish()?;

    let todo = versioned::update(state.todos.as_ref(), todo).await?;
    Ok(Json(TodoResponse { todo }))
}

#[instrument(skip_all)]
pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, AppError> {
    owned_todo(&state, &user, id).await?;
    versioned::delete_by_id::<Todo, _>(state.todos.as_ref(), id).await?;
    Ok(Json(MessageResponse {
        message: "todo successfully deleted",
    }))
}
