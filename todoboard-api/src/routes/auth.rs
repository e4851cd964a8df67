/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Token refresh
/// - Token verification
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Login and get a token
/// - `POST /auth/refresh` - Trade an authentic token for a fresh one
/// - `POST /auth/verify` - Check the bearer token and return its user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use todoboard_shared::{
    models::user::PublicUser,
    service::auth::{self, AuthSuccess},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters long"
    ))]
    pub username: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Previously issued token; may be expired but must be authentic
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Response carrying a token and its user
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed JWT
    pub token: String,

    /// Public view of the authenticated user
    pub user: PublicUser,
}

impl From<AuthSuccess> for AuthResponse {
    fn from(success: AuthSuccess) -> Self {
        Self {
            token: success.token,
            user: success.user,
        }
    }
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Public view of the token's subject
    pub user: PublicUser,
}

fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new user
///
/// Creates a new account and signs it in immediately.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "password123",
///   "name": "Alice Example"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "token": "eyJ...", "user": { ... } }`
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or username taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(validation_errors)?;

    let success = auth::register(
        &state.db,
        state.jwt_secret(),
        &req.username,
        &req.password,
        &req.name,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(success.into())))
}

/// Login endpoint
///
/// Authenticates a user and returns a JWT.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "password123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields
/// - `401 Unauthorized`: Unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_errors)?;

    let success = auth::login(&state.db, state.jwt_secret(), &req.username, &req.password).await?;

    Ok(Json(success.into()))
}

/// Token refresh endpoint
///
/// Exchanges an authentic (possibly expired) token for a fresh one.
///
/// # Endpoint
///
/// ```text
/// POST /auth/refresh
/// Content-Type: application/json
///
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing token
/// - `401 Unauthorized`: Bad signature or deleted user
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_errors)?;

    let success = auth::refresh(&state.db, state.jwt_secret(), &req.token).await?;

    Ok(Json(success.into()))
}

/// Token verification endpoint
///
/// Validates the bearer token and returns the current view of its user.
/// Reads the Authorization header directly so it can answer with the
/// token-specific error codes.
///
/// # Endpoint
///
/// ```text
/// POST /auth/verify
/// Authorization: Bearer eyJ...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing header, bad token, expired token, or
///   deleted user
pub async fn verify(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> ApiResult<Json<VerifyResponse>> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let user = auth::verify(&state.db, state.jwt_secret(), token).await?;

    Ok(Json(VerifyResponse { user }))
}
