/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// to the appropriate HTTP status code. Every error body carries a stable
/// machine-readable code alongside the human-readable message:
///
/// ```json
/// { "error": "todo_not_found", "message": "Todo not found" }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use todoboard_shared::service::auth::AuthError as AuthServiceError;
use todoboard_shared::service::todos::TodoError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Validation errors (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Domain error with a stable machine-readable code
    Domain {
        /// HTTP status to respond with
        status: StatusCode,

        /// Stable error code (e.g. "duplicate_username")
        code: &'static str,

        /// Human-readable message
        message: String,
    },
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "todo_not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Domain { code, message, .. } => write!(f, "{}: {}", code, message),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Domain {
                status,
                code,
                message,
            } => (status, code, message, None),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

fn domain(status: StatusCode, code: &'static str, message: String) -> ApiError {
    ApiError::Domain {
        status,
        code,
        message,
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth service errors to API errors
///
/// A missing user and a wrong password both answer 401 but keep distinct
/// codes. Duplicate usernames answer 400.
impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        let message = err.to_string();
        match err {
            AuthServiceError::InvalidUsername(_) => {
                domain(StatusCode::BAD_REQUEST, "invalid_username", message)
            }
            AuthServiceError::InvalidPassword => {
                domain(StatusCode::BAD_REQUEST, "invalid_password", message)
            }
            AuthServiceError::InvalidName => {
                domain(StatusCode::BAD_REQUEST, "invalid_name", message)
            }
            AuthServiceError::DuplicateUsername => {
                domain(StatusCode::BAD_REQUEST, "duplicate_username", message)
            }
            AuthServiceError::UserNotFound => {
                domain(StatusCode::UNAUTHORIZED, "user_not_found", message)
            }
            AuthServiceError::InvalidCredentials => {
                domain(StatusCode::UNAUTHORIZED, "invalid_credentials", message)
            }
            AuthServiceError::TokenExpired => {
                domain(StatusCode::UNAUTHORIZED, "token_expired", message)
            }
            AuthServiceError::TokenInvalid => {
                domain(StatusCode::UNAUTHORIZED, "token_invalid", message)
            }
            AuthServiceError::Database(e) => {
                ApiError::InternalError(format!("Database error: {}", e))
            }
            AuthServiceError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
        }
    }
}

/// Convert board errors to API errors
impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        let message = err.to_string();
        match err {
            TodoError::MissingText => domain(StatusCode::BAD_REQUEST, "missing_text", message),
            TodoError::MissingAssignees => {
                domain(StatusCode::BAD_REQUEST, "missing_assignees", message)
            }
            TodoError::AssigneeNotFound(_) => {
                domain(StatusCode::BAD_REQUEST, "assignee_not_found", message)
            }
            TodoError::TodoNotFound => domain(StatusCode::NOT_FOUND, "todo_not_found", message),
            TodoError::InvalidStatus(_) => {
                domain(StatusCode::BAD_REQUEST, "invalid_status", message)
            }
            TodoError::PermissionDenied => {
                domain(StatusCode::FORBIDDEN, "delete_permission_denied", message)
            }
            TodoError::UserNotFound => domain(StatusCode::NOT_FOUND, "user_not_found", message),
            TodoError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}
