use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The primary error type for the application.
///
/// Every operation returns this type. It is translated into a JSON error body
/// with a machine-readable `code` at the HTTP boundary; nothing is retried.
#[derive(Debug, Error)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
    /// For client errors due to malformed requests.
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// For when a referenced book or borrow record does not exist for the caller.
    #[error("Not found: {0}")]
    NotFound(String),
    /// For a return attempted on a record that already carries a return date.
    #[error("{0}")]
    AlreadyReturned(String),
    /// For a borrow attempted while every copy of the book is lent out.
    #[error("{0}")]
    NoCopiesAvailable(String),
    /// For when a request conflicts with existing state (e.g. a taken username).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Missing, malformed, expired or otherwise invalid credentials.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    /// Authenticated, but the caller's role lacks the required capability.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// For when a service is temporarily unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// For errors related to database operations.
    #[error("Database error: {0}")]
    Database(String),
    /// For when a specific field in a request fails validation.
    #[error("Validation error on field '{field}': {message}")]
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::ValidationError { field: field.to_string(), message: message.into() }
    }

    /// Machine-readable kind carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyReturned(_) => "ALREADY_RETURNED",
            AppError::NoCopiesAvailable(_) => "NO_COPIES_AVAILABLE",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::AlreadyReturned(_) | AppError::ValidationError { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoCopiesAvailable(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            AppError::Internal(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(error.id = %error_id, error.cause_chain = ?e, "Internal error");
                (
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::Database(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(error.id = %error_id, "Database error: {}", msg);
                (
                    "A database error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::ValidationError { field, message } => (
                format!("Validation failed for field '{}': {}", field, message),
                Some(json!({ "field": field, "message": message })),
            ),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyReturned(msg)
            | AppError::NoCopiesAvailable(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::ServiceUnavailable(msg) => (msg, None),
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::Conflict(db_err.message().to_string())
                } else {
                    AppError::Database(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut => {
                AppError::ServiceUnavailable("Database connection pool timed out".to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("password hashing failed"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("blocking task failed"))
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// Converts an `Option` into a `NotFound` error carrying the given message.
pub trait OptionExt<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

/// Field-level request validation helpers.
pub mod validation {
    use super::*;

    /// Rejects empty (after trimming) or over-long text.
    pub fn validate_text(value: &str, field: &str, max_chars: usize) -> AppResult<()> {
        if value.trim().is_empty() {
            return Err(AppError::validation(field, "must not be empty"));
        }
        if value.chars().count() > max_chars {
            return Err(AppError::validation(field, format!("must be at most {} characters", max_chars)));
        }
        Ok(())
    }

    pub fn validate_non_negative(value: i64, field: &str) -> AppResult<()> {
        if value < 0 {
            return Err(AppError::validation(field, format!("must be >= 0, got {}", value)));
        }
        Ok(())
    }
}
