use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use taskdeck_db::StoreError;
use taskdeck_types::api::{
    Claims, SubscribeRequest, SubscriptionListResponse, SubscriptionResponse, UnsubscribeRequest,
    VapidKeyResponse,
};

use crate::error::ApiError;
use crate::extract::Json;
use crate::{AppState, blocking, validate};

/// 503 until VAPID keys are configured; the client uses this to decide
/// whether to offer the push prompt at all.
pub async fn vapid_public_key(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let public_key = state
        .push
        .public_key()
        .ok_or(StoreError::PushNotConfigured)?
        .to_string();
    Ok(Json(VapidKeyResponse { public_key }))
}

pub async fn subscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::non_empty("endpoint", &req.endpoint)?;
    validate::non_empty("keys.p256dh", &req.keys.p256dh)?;
    validate::non_empty("keys.auth", &req.keys.auth)?;

    let db = state.db.clone();
    let subscription = blocking(move || {
        db.upsert_subscription(&claims.sub, &req.endpoint, &req.keys.p256dh, &req.keys.auth)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse { subscription })))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::non_empty("endpoint", &req.endpoint)?;

    let db = state.db.clone();
    blocking(move || db.delete_subscription(&claims.sub, &req.endpoint)).await?;
    Ok(Json(json!({ "message": "subscription removed" })))
}

pub async fn subscriptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let subscriptions = blocking(move || db.subscriptions_for_user(&claims.sub)).await?;
    Ok(Json(SubscriptionListResponse { subscriptions }))
}
