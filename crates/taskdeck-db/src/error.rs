use thiserror::Error;

/// Typed failure taxonomy raised by the store and domain services. The API
/// layer owns the mapping to HTTP status codes; nothing here knows about
/// HTTP, and callers must never branch on message text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("a user with this email already exists")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    /// Covers both true absence and rows owned by another user; the two are
    /// indistinguishable to callers so existence never leaks across users.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot delete a status that is used by existing tasks")]
    StatusInUse,

    #[error("push notifications are not configured")]
    PushNotConfigured,

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}
