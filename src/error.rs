// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 500 with a message the user should see (e.g., a failed submission)
    OperationFailed(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., quiz already submitted)
    Conflict(String),

    // 422 Unprocessable Entity (question sheet unusable)
    Unprocessable(String),

    // 503 Service Unavailable (question sheet unreachable)
    Unavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::OperationFailed(msg) => {
                tracing::error!("Operation failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Unavailable(msg) => {
                tracing::warn!("Dependency unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Failures while fetching or decoding the question sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The resource could not be fetched.
    Network(String),
    /// The resource holds no data rows.
    Empty,
    /// The header row (or a data row) could not be mapped to questions.
    Malformed(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(msg) => write!(f, "Failed to fetch questions: {}", msg),
            LoadError::Empty => write!(f, "No questions available"),
            LoadError::Malformed(msg) => write!(f, "Malformed question sheet: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Network(_) => AppError::Unavailable(err.to_string()),
            LoadError::Empty | LoadError::Malformed(_) => AppError::Unprocessable(err.to_string()),
        }
    }
}

/// Failures of a quiz submission. The session is left untouched on any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Unauthenticated,
    AlreadySubmitted { expires_at: DateTime<Utc> },
    StorageFailure(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Unauthenticated => write!(f, "Please log in to submit your answers."),
            SubmitError::AlreadySubmitted { .. } => {
                write!(f, "You have already submitted this quiz.")
            }
            SubmitError::StorageFailure(msg) => write!(
                f,
                "An error occurred while submitting your answers: {}",
                msg
            ),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        SubmitError::StorageFailure(err.to_string())
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Unauthenticated => AppError::AuthError(err.to_string()),
            SubmitError::AlreadySubmitted { .. } => AppError::Conflict(err.to_string()),
            SubmitError::StorageFailure(_) => AppError::OperationFailed(err.to_string()),
        }
    }
}

/// Authentication failures, each carrying a fixed user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredential,
    EmailInUse,
    UserNotFound,
    Unexpected(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AuthError::InvalidCredential => "Invalid email or password",
            AuthError::EmailInUse => "Email already in use, Please Login!",
            AuthError::UserNotFound => "User not found, Please Sign Up!",
            AuthError::Unexpected(_) => "An unexpected error occurred. Please try again.",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredential => AppError::AuthError(err.to_string()),
            AuthError::UserNotFound => AppError::NotFound(err.to_string()),
            AuthError::EmailInUse => AppError::Conflict(err.to_string()),
            AuthError::Unexpected(ref cause) => {
                tracing::error!("Unexpected authentication failure: {}", cause);
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Errors raised by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or the query failed.
    Unavailable(String),
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    /// A stored document could not be decoded.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StoreError::Conflict(msg) => write!(f, "storage conflict: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "corrupt document: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Invalid or missing configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value '{}'", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_errors_map_to_statuses() {
        let resp = AppError::from(SubmitError::Unauthenticated).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AppError::from(SubmitError::AlreadySubmitted {
            expires_at: Utc::now(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_storage_failure_reaches_client() {
        let resp = AppError::from(SubmitError::StorageFailure("db down".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["error"],
            "An error occurred while submitting your answers: db down"
        );
    }

    #[test]
    fn test_load_errors_map_to_statuses() {
        let resp = AppError::from(LoadError::Network("refused".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = AppError::from(LoadError::Empty).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_auth_messages() {
        assert_eq!(
            AuthError::EmailInUse.to_string(),
            "Email already in use, Please Login!"
        );
        assert_eq!(
            AuthError::Unexpected("boom".into()).to_string(),
            "An unexpected error occurred. Please try again."
        );
    }
}
