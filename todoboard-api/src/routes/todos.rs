/// Board endpoints
///
/// This module provides the todo board endpoints. All routes require a
/// valid bearer token; the authenticated user arrives via the
/// `AuthContext` request extension.
///
/// # Endpoints
///
/// - `GET    /todos` - List all todos
/// - `POST   /todos` - Create a todo
/// - `GET    /todos/:id` - Read one todo
/// - `PUT    /todos/:id/status` - Move a todo between statuses
/// - `DELETE /todos/:id` - Delete a todo (creator only)

use crate::{
    app::AppState,
    error::{ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use todoboard_shared::{
    auth::middleware::AuthContext,
    models::todo::TodoWithDetails,
    service::todos,
};
use validator::Validate;

/// Create todo request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    /// Task description
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    /// Users to assign, at least one
    #[validate(length(min = 1, message = "At least one assignee is required"))]
    pub assignee_ids: Vec<i64>,
}

/// Status update request
///
/// The status arrives as a raw string so unknown values map to the
/// board's own invalid-status error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status: TODO, PROGRESS, or DONE
    pub status: String,
}

/// Delete response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// ID of the deleted todo
    pub deleted_id: String,
}

/// List all todos
///
/// Returns every todo on the board, newest first, with creator names and
/// assignees attached.
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<TodoWithDetails>>> {
    let todos = todos::list(&state.db).await?;
    Ok(Json(todos))
}

/// Create a todo
///
/// # Endpoint
///
/// ```text
/// POST /todos
/// Content-Type: application/json
///
/// {
///   "text": "Write the quarterly report",
///   "assignee_ids": [1, 2]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank text, no assignees, or an unknown assignee
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoWithDetails>)> {
    req.validate().map_err(|e| {
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
        crate::error::ApiError::ValidationError(errors)
    })?;

    let todo = todos::create(&state.db, auth.user_id, &req.text, &req.assignee_ids).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// Read one todo
///
/// # Errors
///
/// - `404 Not Found`: No todo with the given ID
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoWithDetails>> {
    let todo = todos::get(&state.db, &id).await?;
    Ok(Json(todo))
}

/// Move a todo between statuses
///
/// Any authenticated user may move any todo.
///
/// # Endpoint
///
/// ```text
/// PUT /todos/:id/status
/// Content-Type: application/json
///
/// { "status": "PROGRESS" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status value
/// - `404 Not Found`: No todo with the given ID
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TodoWithDetails>> {
    let todo = todos::update_status(&state.db, auth.user_id, &id, &req.status).await?;
    Ok(Json(todo))
}

/// Delete a todo
///
/// Only the creator may delete a todo; being an assignee is not enough.
///
/// # Errors
///
/// - `403 Forbidden`: Requester did not create the todo
/// - `404 Not Found`: No todo with the given ID
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    todos::delete(&state.db, auth.user_id, &id).await?;
    Ok(Json(DeleteResponse { deleted_id: id }))
}
