pub mod auth;
pub mod error;
mod extract;
pub mod middleware;
mod notify;
pub mod push;
pub mod settings;
pub mod statuses;
pub mod todos;
mod validate;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tracing::error;

use taskdeck_db::{Database, StoreError};
use taskdeck_push::PushDispatcher;

use crate::error::ApiError;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
    pub token_days: i64,
    pub push: PushDispatcher,
}

/// The full API surface. Everything except register/login sits behind the
/// bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/{id}",
            get(todos::get_by_id).put(todos::update).delete(todos::delete),
        )
        .route("/statuses", get(statuses::list).post(statuses::create))
        .route("/statuses/{id}", put(statuses::update).delete(statuses::delete))
        .route(
            "/settings/notifications",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/push/vapid-public-key", get(push::vapid_public_key))
        .route("/push/subscribe", post(push::subscribe))
        .route("/push/unsubscribe", post(push::unsubscribe))
        .route("/push/subscriptions", get(push::subscriptions))
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    public.merge(protected)
}

/// Runs blocking store work off the async runtime; the SQLite connection
/// lock queues callers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {e}");
            ApiError::internal("task failed")
        })?
        .map_err(ApiError::from)
}
