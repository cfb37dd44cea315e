use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use taskdeck_db::StoreError;
use taskdeck_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use taskdeck_types::models::User;

use crate::error::ApiError;
use crate::extract::Json;
use crate::{AppState, blocking, validate};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::email(&req.email)?;
    validate::password(&req.password)?;
    validate::non_empty("name", &req.name)?;

    let db = state.db.clone();
    let user = blocking(move || {
        if db.user_by_email(&req.email)?.is_some() {
            return Err(StoreError::EmailTaken);
        }

        // Argon2id with a fresh salt; hashing is CPU-bound so it stays on
        // the blocking pool.
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| StoreError::Internal(format!("password hash: {e}")))?
            .to_string();

        let user = db.create_user(&req.email, &req.name, &hash)?;
        db.seed_default_statuses(&user.id)?;
        Ok(user)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse { user: user.into() }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let user = blocking(move || {
        // Same error whether the email is unknown or the password is wrong.
        let user = db
            .user_by_email(&req.email)?
            .ok_or(StoreError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| StoreError::Internal(format!("stored hash unreadable: {e}")))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .map_err(|_| StoreError::InvalidCredentials)?;

        Ok(user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, state.token_days, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let user = blocking(move || db.user_by_id(&claims.sub)?.ok_or(StoreError::NotFound("user")))
        .await?;

    Ok(Json(UserResponse { user: user.into() }))
}

fn create_token(secret: &str, days: i64, user: &User) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token encode failed: {e}");
        ApiError::internal("failed to issue token")
    })
}
