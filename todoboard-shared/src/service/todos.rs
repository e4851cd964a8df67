/// Todo board service
///
/// This module implements the board operations on top of the todo model:
/// listing, reading, transactional creation and deletion, status moves,
/// and per-user statistics.
///
/// # Rules
///
/// - A todo always has text and at least one assignee
/// - Creation is all-or-nothing: if any assignee is unknown, nothing is
///   written
/// - Any authenticated user may move a todo between statuses
/// - Only the creator may delete a todo

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::todo::{Todo, TodoStatus, TodoWithDetails, UserStats};
use crate::models::user::User;

/// Error type for board operations
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Todo text is missing or blank
    #[error("Text is required")]
    MissingText,

    /// No assignees were given
    #[error("At least one assignee is required")]
    MissingAssignees,

    /// An assignee ID does not refer to an existing user
    #[error("Assignee {0} does not exist")]
    AssigneeNotFound(i64),

    /// No todo with the given ID
    #[error("Todo not found")]
    TodoNotFound,

    /// Status string is not one of TODO, PROGRESS, DONE
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Requester is not allowed to perform this operation
    #[error("Only the creator may delete a todo")]
    PermissionDenied,

    /// No user with the given ID
    #[error("User not found")]
    UserNotFound,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lists all todos, newest first
///
/// # Errors
///
/// Returns an error on database failure
pub async fn list(pool: &SqlitePool) -> Result<Vec<TodoWithDetails>, TodoError> {
    Ok(Todo::list_with_details(pool).await?)
}

/// Reads a single todo
///
/// # Errors
///
/// Returns `TodoError::TodoNotFound` if no todo has the given ID
pub async fn get(pool: &SqlitePool, id: &str) -> Result<TodoWithDetails, TodoError> {
    Todo::find_with_details(pool, id)
        .await?
        .ok_or(TodoError::TodoNotFound)
}

/// Creates a todo assigned to one or more users
///
/// Duplicate assignee IDs are collapsed. The insert of the todo row and
/// all assignee links happens in one transaction; an unknown assignee
/// rolls the whole creation back.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `created_by` - ID of the authenticated creator
/// * `text` - Task description (leading/trailing whitespace is trimmed)
/// * `assignee_ids` - Users to assign, at least one
///
/// # Errors
///
/// Returns `TodoError::MissingText`, `TodoError::MissingAssignees`, or
/// `TodoError::AssigneeNotFound` with the first unknown ID
pub async fn create(
    pool: &SqlitePool,
    created_by: i64,
    text: &str,
    assignee_ids: &[i64],
) -> Result<TodoWithDetails, TodoError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TodoError::MissingText);
    }

    let assignees: BTreeSet<i64> = assignee_ids.iter().copied().collect();
    if assignees.is_empty() {
        return Err(TodoError::MissingAssignees);
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(TodoError::Database)?;

    Todo::insert(&mut tx, &id, text, created_by, now).await?;

    for user_id in &assignees {
        if !User::exists(&mut *tx, *user_id).await? {
            tx.rollback().await?;
            return Err(TodoError::AssigneeNotFound(*user_id));
        }
        Todo::add_assignee(&mut tx, &id, *user_id).await?;
    }

    tx.commit().await?;

    info!(todo_id = %id, created_by, assignees = assignees.len(), "Todo created");

    get(pool, &id).await
}

/// Moves a todo to a new status
///
/// Any authenticated user may move any todo; the requester is recorded in
/// the log, not checked for ownership.
///
/// # Errors
///
/// Returns `TodoError::InvalidStatus` for an unrecognized status string or
/// `TodoError::TodoNotFound` if no todo has the given ID
pub async fn update_status(
    pool: &SqlitePool,
    requester: i64,
    id: &str,
    status: &str,
) -> Result<TodoWithDetails, TodoError> {
    let status: TodoStatus = status
        .parse()
        .map_err(|_| TodoError::InvalidStatus(status.to_string()))?;

    let affected = Todo::set_status(pool, id, status, Utc::now()).await?;
    if affected == 0 {
        return Err(TodoError::TodoNotFound);
    }

    info!(todo_id = %id, requester, status = status.as_str(), "Todo status updated");

    get(pool, id).await
}

/// Deletes a todo and its assignee links
///
/// Only the creator may delete. The links and the todo row are removed in
/// one transaction.
///
/// # Errors
///
/// Returns `TodoError::TodoNotFound` if no todo has the given ID or
/// `TodoError::PermissionDenied` if the requester is not the creator
pub async fn delete(pool: &SqlitePool, requester: i64, id: &str) -> Result<(), TodoError> {
    let mut tx = pool.begin().await.map_err(TodoError::Database)?;

    // The creator check runs inside the same transaction as the deletes, so
    // a concurrent writer cannot slip in between the read and the removal.
    let creator = Todo::creator_of(&mut *tx, id)
        .await?
        .ok_or(TodoError::TodoNotFound)?;

    if creator != requester {
        return Err(TodoError::PermissionDenied);
    }

    Todo::remove_assignees(&mut tx, id).await?;
    Todo::remove(&mut tx, id).await?;
    tx.commit().await?;

    info!(todo_id = %id, requester, "Todo deleted");

    Ok(())
}

/// Computes a user's board statistics
///
/// Counts the user's assigned todos per status plus the todos they
/// created.
///
/// # Errors
///
/// Returns `TodoError::UserNotFound` if no user has the given ID
pub async fn stats_for_user(pool: &SqlitePool, user_id: i64) -> Result<UserStats, TodoError> {
    if !User::exists(pool, user_id).await? {
        return Err(TodoError::UserNotFound);
    }

    Ok(Todo::stats_for_user(pool, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::{create_pool, DatabaseConfig};
    use crate::models::user::CreateUser;

    async fn test_pool() -> SqlitePool {
        let pool = create_pool(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .expect("Should create pool");
        run_migrations(&pool).await.expect("Should migrate");
        pool
    }

    async fn create_user(pool: &SqlitePool, username: &str, name: &str) -> i64 {
        User::create(
            pool,
            CreateUser {
                username: username.to_string(),
                password_hash: "$argon2id$fake".to_string(),
                name: name.to_string(),
            },
        )
        .await
        .expect("Should create user")
        .id
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;
        let bob = create_user(&pool, "bob", "Bob").await;

        let todo = create(&pool, alice, "  Write report  ", &[bob, alice])
            .await
            .expect("Create should succeed");

        // Text is trimmed, status starts at TODO
        assert_eq!(todo.text, "Write report");
        assert_eq!(todo.status, TodoStatus::Todo);
        assert_eq!(todo.created_by, alice);
        assert_eq!(todo.assignees.len(), 2);

        let fetched = get(&pool, &todo.id).await.expect("Get should succeed");
        assert_eq!(fetched.id, todo.id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let result = create(&pool, alice, "   ", &[alice]).await;
        assert!(matches!(result, Err(TodoError::MissingText)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_assignees() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let result = create(&pool, alice, "Task", &[]).await;
        assert!(matches!(result, Err(TodoError::MissingAssignees)));
    }

    #[tokio::test]
    async fn test_create_deduplicates_assignees() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let todo = create(&pool, alice, "Task", &[alice, alice, alice])
            .await
            .expect("Create should succeed");
        assert_eq!(todo.assignees.len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_unknown_assignee_writes_nothing() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let result = create(&pool, alice, "Task", &[alice, 9999]).await;
        assert!(matches!(result, Err(TodoError::AssigneeNotFound(9999))));

        // The rollback left no todo and no links behind
        let todos = list(&pool).await.expect("List should succeed");
        assert!(todos.is_empty());

        let links: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo_assignees")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links.0, 0);
    }

    #[tokio::test]
    async fn test_update_status_by_non_creator() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;
        let bob = create_user(&pool, "bob", "Bob").await;

        let todo = create(&pool, alice, "Task", &[alice]).await.unwrap();

        // Bob may move Alice's todo
        let updated = update_status(&pool, bob, &todo.id, "PROGRESS")
            .await
            .expect("Update should succeed");
        assert_eq!(updated.status, TodoStatus::Progress);

        let updated = update_status(&pool, bob, &todo.id, "DONE").await.unwrap();
        assert_eq!(updated.status, TodoStatus::Done);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_status() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;
        let todo = create(&pool, alice, "Task", &[alice]).await.unwrap();

        let result = update_status(&pool, alice, &todo.id, "BLOCKED").await;
        assert!(matches!(result, Err(TodoError::InvalidStatus(_))));

        // Lowercase is not accepted either
        let result = update_status(&pool, alice, &todo.id, "done").await;
        assert!(matches!(result, Err(TodoError::InvalidStatus(_))));
    }

    #[tokio::test]
    async fn test_update_status_missing_todo() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let result = update_status(&pool, alice, "no-such-id", "DONE").await;
        assert!(matches!(result, Err(TodoError::TodoNotFound)));
    }

    #[tokio::test]
    async fn test_delete_requires_creator() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;
        let bob = create_user(&pool, "bob", "Bob").await;

        let todo = create(&pool, alice, "Task", &[alice, bob]).await.unwrap();

        // Bob is an assignee but not the creator
        let result = delete(&pool, bob, &todo.id).await;
        assert!(matches!(result, Err(TodoError::PermissionDenied)));
        assert!(get(&pool, &todo.id).await.is_ok());

        // Alice created it, so she may delete it
        delete(&pool, alice, &todo.id).await.expect("Delete should succeed");
        assert!(matches!(
            get(&pool, &todo.id).await,
            Err(TodoError::TodoNotFound)
        ));

        // Assignee links went with it
        let links: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo_assignees")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links.0, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_todo() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;

        let result = delete(&pool, alice, "no-such-id").await;
        assert!(matches!(result, Err(TodoError::TodoNotFound)));
    }

    #[tokio::test]
    async fn test_stats_for_user() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "Alice").await;
        let bob = create_user(&pool, "bob", "Bob").await;

        let t1 = create(&pool, alice, "One", &[alice]).await.unwrap();
        create(&pool, alice, "Two", &[alice, bob]).await.unwrap();
        let t3 = create(&pool, bob, "Three", &[alice]).await.unwrap();

        update_status(&pool, alice, &t1.id, "PROGRESS").await.unwrap();
        update_status(&pool, bob, &t3.id, "DONE").await.unwrap();

        let stats = stats_for_user(&pool, alice).await.expect("Stats should succeed");
        assert_eq!(stats.assigned.todo, 1);
        assert_eq!(stats.assigned.progress, 1);
        assert_eq!(stats.assigned.done, 1);
        assert_eq!(stats.total_assigned, 3);
        assert_eq!(stats.created, 2);
    }

    #[tokio::test]
    async fn test_stats_for_missing_user() {
        let pool = test_pool().await;

        let result = stats_for_user(&pool, 42).await;
        assert!(matches!(result, Err(TodoError::UserNotFound)));
    }
}
