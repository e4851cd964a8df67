/// User endpoints
///
/// This module provides read-only user endpoints, mainly used by the board
/// UI to populate assignee pickers and per-user dashboards. All routes
/// require a valid bearer token.
///
/// # Endpoints
///
/// - `GET /users` - List all users
/// - `GET /users/me` - The authenticated user
/// - `GET /users/:id` - One user by ID
/// - `GET /users/:id/stats` - A user's board statistics

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use todoboard_shared::{
    auth::middleware::AuthContext,
    models::{
        todo::UserStats,
        user::{PublicUser, User},
    },
    service::todos,
};

/// List all users
///
/// Returns every account's public view, ordered by display name.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

/// The authenticated user
///
/// Re-reads the account so the response reflects the database, not just
/// the token claims.
///
/// # Errors
///
/// - `404 Not Found`: The account behind the token no longer exists
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| crate::error::ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// One user by ID
///
/// # Errors
///
/// - `404 Not Found`: No user with the given ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| crate::error::ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// A user's board statistics
///
/// Returns the user's assigned todos broken down by status, plus how many
/// todos they created.
///
/// # Response
///
/// ```json
/// {
///   "assigned": { "TODO": 2, "PROGRESS": 1, "DONE": 4 },
///   "created": 3,
///   "total_assigned": 7
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No user with the given ID
pub async fn user_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserStats>> {
    let stats = todos::stats_for_user(&state.db, id).await?;
    Ok(Json(stats))
}
