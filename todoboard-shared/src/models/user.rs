/// User model and database operations
///
/// This module provides the User model and query operations for managing
/// user accounts.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id            INTEGER PRIMARY KEY AUTOINCREMENT,
///     username      TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     name          TEXT NOT NULL,
///     created_at    TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use todoboard_shared::models::user::{CreateUser, User};
/// use todoboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: "Alice Example".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (SQLite rowid)
    pub id: i64,

    /// Login name
    ///
    /// Must be unique across all users
    pub username: String,

    /// Argon2id password hash
    ///
    /// Never store plaintext passwords!
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

/// Public view of a user
///
/// This is the shape returned by the API; it never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    /// Unique user ID
    pub id: i64,

    /// Login name
    pub username: String,

    /// Display name
    pub name: String,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Display name
    pub name: String,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, name, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password_hash, name, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users as their public views, ordered by display name
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &SqlitePool) -> Result<Vec<PublicUser>, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, username, name, created_at
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Checks whether a user with the given ID exists
    ///
    /// Generic over the executor so it can run inside a transaction,
    /// which the todo creation path relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(row.is_some())
    }
}
