use axum::{Extension, extract::State, response::IntoResponse};

use taskdeck_types::api::{Claims, SettingsResponse, UpdateSettingsRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::{AppState, blocking};

/// Lazily creates the row with defaults on first read.
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let settings = blocking(move || db.settings_for_user(&claims.sub)).await?;
    Ok(Json(SettingsResponse { settings }))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let settings = blocking(move || db.update_settings(&claims.sub, &req)).await?;
    Ok(Json(SettingsResponse { settings }))
}
