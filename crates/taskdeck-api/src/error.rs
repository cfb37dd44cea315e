use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use taskdeck_db::StoreError;
use taskdeck_types::api::ErrorBody;

/// The single place where domain failures become HTTP. Handlers return this
/// instead of status codes so the taxonomy stays out of domain code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "validation failed".into(),
            details: Some(json!([{ "field": field, "message": message }])),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or invalid token".into(),
            details: None,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Validation { .. } | StoreError::EmailTaken | StoreError::StatusInUse => {
                StatusCode::BAD_REQUEST
            }
            StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::PushNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Db(_) | StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &err {
            StoreError::Validation { field, message } => {
                Some(json!([{ "field": field, "message": message }]))
            }
            _ => None,
        };

        // Internal messages are only exposed outside production.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {err}");
            if in_production() {
                "internal server error".to_string()
            } else {
                err.to_string()
            }
        } else {
            err.to_string()
        };

        Self {
            status,
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

fn in_production() -> bool {
    std::env::var("TASKDECK_ENV").is_ok_and(|v| v == "production")
}
