use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use taskdeck_types::api::{Claims, CreateStatusRequest, UpdateStatusRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::{AppState, blocking, validate};

/// Bare array, ascending by order — the client relies on this for column
/// layout.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let statuses = blocking(move || db.statuses_for_user(&claims.sub)).await?;
    Ok(Json(statuses))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::non_empty("name", &req.name)?;
    validate::color(&req.color)?;
    validate::sort_order(req.sort_order)?;

    let db = state.db.clone();
    let status = blocking(move || db.create_status(&claims.sub, &req)).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.name {
        validate::non_empty("name", name)?;
    }
    if let Some(color) = &req.color {
        validate::color(color)?;
    }
    if let Some(sort_order) = req.sort_order {
        validate::sort_order(sort_order)?;
    }

    let db = state.db.clone();
    let status = blocking(move || db.update_status(&id, &claims.sub, &req)).await?;
    Ok(Json(status))
}

/// 400 while any todo still references the status, 404 when it does not
/// exist (or belongs to someone else).
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    blocking(move || db.delete_status(&id, &claims.sub)).await?;
    Ok(StatusCode::NO_CONTENT)
}
