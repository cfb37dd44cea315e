use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use taskdeck_types::api::{
    Claims, CreateTodoRequest, TodoListResponse, TodoResponse, UpdateTodoRequest,
};

use crate::error::ApiError;
use crate::extract::Json;
use crate::{AppState, blocking, notify, validate};

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let todos = blocking(move || db.todos_for_user(&claims.sub)).await?;
    Ok(Json(TodoListResponse { todos }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::non_empty("text", &req.text)?;

    let db = state.db.clone();
    let todo = blocking(move || db.create_todo(&claims.sub, &req)).await?;

    // Side effect only; a notification failure never fails the mutation.
    notify::todo_created(&state, &todo).await;

    Ok((StatusCode::CREATED, Json(TodoResponse { todo })))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let todo = blocking(move || db.todo_by_id(&id, &claims.sub)).await?;
    Ok(Json(TodoResponse { todo }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(text) = &req.text {
        validate::non_empty("text", text)?;
    }

    // Which notifications fire depends on what the payload touched.
    let content_touched =
        req.text.is_some() || req.deadline.is_some() || req.priority.is_some();

    let db = state.db.clone();
    let (before, after) = blocking(move || {
        let before = db.todo_by_id(&id, &claims.sub)?;
        let after = db.update_todo(&id, &claims.sub, &req)?;
        Ok((before, after))
    })
    .await?;

    notify::todo_updated(&state, &before, &after, content_touched).await;

    Ok(Json(TodoResponse { todo: after }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    blocking(move || db.delete_todo(&id, &claims.sub)).await?;
    Ok(StatusCode::NO_CONTENT)
}
