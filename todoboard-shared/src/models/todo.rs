/// Todo model and database operations
///
/// This module provides the Todo model, its kanban status, and the query
/// operations behind the board. A todo is created by one user and assigned
/// to one or more users via the `todo_assignees` relation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id         TEXT PRIMARY KEY,
///     text       TEXT NOT NULL,
///     status     TEXT NOT NULL DEFAULT 'TODO'
///                CHECK (status IN ('TODO', 'PROGRESS', 'DONE')),
///     created_by INTEGER NOT NULL REFERENCES users (id),
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
///
/// CREATE TABLE todo_assignees (
///     todo_id TEXT NOT NULL REFERENCES todos (id),
///     user_id INTEGER NOT NULL REFERENCES users (id),
///     PRIMARY KEY (todo_id, user_id)
/// );
/// ```

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use super::user::PublicUser;

/// Kanban status of a todo
///
/// Stored and serialized in its uppercase wire form (`TODO`, `PROGRESS`,
/// `DONE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TodoStatus {
    /// Not started
    Todo,

    /// In progress
    Progress,

    /// Completed
    Done,
}

impl TodoStatus {
    /// Gets status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Todo => "TODO",
            TodoStatus::Progress => "PROGRESS",
            TodoStatus::Done => "DONE",
        }
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TodoStatus::Todo),
            "PROGRESS" => Ok(TodoStatus::Progress),
            "DONE" => Ok(TodoStatus::Done),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Todo row as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID (UUID v4 string)
    pub id: String,

    /// Task description
    pub text: String,

    /// Current kanban status
    pub status: TodoStatus,

    /// ID of the user who created the todo
    pub created_by: i64,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last changed
    pub updated_at: DateTime<Utc>,
}

/// Todo with creator name and assignee list attached
///
/// This is the shape the API returns for every todo read.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TodoWithDetails {
    /// Unique todo ID
    pub id: String,

    /// Task description
    pub text: String,

    /// Current kanban status
    pub status: TodoStatus,

    /// ID of the user who created the todo
    pub created_by: i64,

    /// Display name of the creator
    pub created_by_name: String,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last changed
    pub updated_at: DateTime<Utc>,

    /// Users the todo is assigned to, ordered by display name
    #[sqlx(skip)]
    pub assignees: Vec<PublicUser>,
}

/// Per-user aggregate counts for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    /// Assigned todos broken down by status
    pub assigned: StatusCounts,

    /// Number of todos the user created
    pub created: i64,

    /// Total number of todos assigned to the user
    pub total_assigned: i64,
}

/// Counts of todos per kanban status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Todos not yet started
    #[serde(rename = "TODO")]
    pub todo: i64,

    /// Todos in progress
    #[serde(rename = "PROGRESS")]
    pub progress: i64,

    /// Completed todos
    #[serde(rename = "DONE")]
    pub done: i64,
}

impl Todo {
    /// Inserts a new todo row
    ///
    /// Runs on a connection rather than the pool so it can participate in
    /// the creation transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert(
        conn: &mut SqliteConnection,
        id: &str,
        text: &str,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, text, status, created_by, created_at, updated_at)
            VALUES (?, ?, 'TODO', ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(text)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Links a user to a todo as an assignee
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate link)
    pub async fn add_assignee(
        conn: &mut SqliteConnection,
        todo_id: &str,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO todo_assignees (todo_id, user_id) VALUES (?, ?)")
            .bind(todo_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Lists all todos with creator names and assignees, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_with_details(pool: &SqlitePool) -> Result<Vec<TodoWithDetails>, sqlx::Error> {
        let mut todos = sqlx::query_as::<_, TodoWithDetails>(
            r#"
            SELECT t.id, t.text, t.status, t.created_by, u.name AS created_by_name,
                   t.created_at, t.updated_at
            FROM todos t
            JOIN users u ON u.id = t.created_by
            ORDER BY t.created_at DESC, t.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        // Hydrate assignees for all todos in one query.
        let links: Vec<(String, i64, String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT ta.todo_id, u.id, u.username, u.name, u.created_at
            FROM todo_assignees ta
            JOIN users u ON u.id = ta.user_id
            ORDER BY u.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut by_todo: HashMap<String, Vec<PublicUser>> = HashMap::new();
        for (todo_id, id, username, name, created_at) in links {
            by_todo.entry(todo_id).or_default().push(PublicUser {
                id,
                username,
                name,
                created_at,
            });
        }

        for todo in &mut todos {
            if let Some(assignees) = by_todo.remove(&todo.id) {
                todo.assignees = assignees;
            }
        }

        Ok(todos)
    }

    /// Finds a single todo with creator name and assignees
    ///
    /// # Returns
    ///
    /// The hydrated todo if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_with_details(
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<TodoWithDetails>, sqlx::Error> {
        let todo = sqlx::query_as::<_, TodoWithDetails>(
            r#"
            SELECT t.id, t.text, t.status, t.created_by, u.name AS created_by_name,
                   t.created_at, t.updated_at
            FROM todos t
            JOIN users u ON u.id = t.created_by
            WHERE t.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(mut todo) = todo else {
            return Ok(None);
        };

        todo.assignees = Self::assignees(pool, id).await?;
        Ok(Some(todo))
    }

    /// Lists a todo's assignees, ordered by display name
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn assignees(pool: &SqlitePool, todo_id: &str) -> Result<Vec<PublicUser>, sqlx::Error> {
        let assignees = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT u.id, u.username, u.name, u.created_at
            FROM todo_assignees ta
            JOIN users u ON u.id = ta.user_id
            WHERE ta.todo_id = ?
            ORDER BY u.name
            "#,
        )
        .bind(todo_id)
        .fetch_all(pool)
        .await?;

        Ok(assignees)
    }

    /// Sets a todo's status and bumps its `updated_at`
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 if the todo does not exist)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn set_status(
        pool: &SqlitePool,
        id: &str,
        status: TodoStatus,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE todos SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Looks up the creator of a todo
    ///
    /// Generic over the executor so the lookup can run inside the deletion
    /// transaction.
    ///
    /// # Returns
    ///
    /// The creator's user ID if the todo exists, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn creator_of<'e, E>(executor: E, id: &str) -> Result<Option<i64>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT created_by FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(row.map(|r| r.0))
    }

    /// Removes all assignee links for a todo
    ///
    /// Must run before [`Todo::remove`] in the same transaction to satisfy
    /// the foreign key constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn remove_assignees(
        conn: &mut SqliteConnection,
        todo_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM todo_assignees WHERE todo_id = ?")
            .bind(todo_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Removes a todo row
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 if the todo does not exist)
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn remove(conn: &mut SqliteConnection, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Computes per-status assigned counts and created count for a user
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn stats_for_user(pool: &SqlitePool, user_id: i64) -> Result<UserStats, sqlx::Error> {
        let rows: Vec<(TodoStatus, i64)> = sqlx::query_as(
            r#"
            SELECT t.status, COUNT(*)
            FROM todos t
            JOIN todo_assignees ta ON ta.todo_id = t.id
            WHERE ta.user_id = ?
            GROUP BY t.status
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut assigned = StatusCounts::default();
        for (status, count) in rows {
            match status {
                TodoStatus::Todo => assigned.todo = count,
                TodoStatus::Progress => assigned.progress = count,
                TodoStatus::Done => assigned.done = count,
            }
        }

        let created: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE created_by = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        let total_assigned = assigned.todo + assigned.progress + assigned.done;

        Ok(UserStats {
            assigned,
            created: created.0,
            total_assigned,
        })
    }
}
