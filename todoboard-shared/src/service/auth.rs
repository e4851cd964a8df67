/// Authentication service
///
/// This module implements the account flows: registration, login, token
/// verification, and token refresh. It owns the credential policy
/// (username shape, password length) and issues JWTs carrying the user's
/// identity.
///
/// # Flows
///
/// - **register**: validate input, reject duplicate usernames, hash the
///   password, store the user, and sign a token
/// - **login**: look up the user and verify the password in constant time
/// - **verify**: validate a token's signature and expiration, then confirm
///   the subject still exists
/// - **refresh**: accept an expired-but-authentic token and trade it for a
///   fresh one, re-reading the user so renamed accounts get current claims

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::jwt::{create_token, decode_ignoring_expiry, validate_token, Claims, JwtError};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{CreateUser, PublicUser, User};

/// Username length bounds
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;

/// Minimum password length
const PASSWORD_MIN: usize = 6;

/// Error type for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Username fails the format policy
    #[error("{0}")]
    InvalidUsername(String),

    /// Password fails the length policy
    #[error("Password must be at least {PASSWORD_MIN} characters long")]
    InvalidPassword,

    /// Display name is missing or blank
    #[error("Name is required")]
    InvalidName,

    /// Username is already taken
    #[error("Username is already taken")]
    DuplicateUsername,

    /// No account with the given username or ID
    #[error("User not found")]
    UserNotFound,

    /// Password does not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is past its expiration
    #[error("Token has expired")]
    TokenExpired,

    /// Token failed validation
    #[error("Invalid token")]
    TokenInvalid,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Underlying password hashing failure
    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}

/// Result of a successful register, login, or refresh
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSuccess {
    /// Signed JWT for the user
    pub token: String,

    /// Public view of the authenticated user
    pub user: PublicUser,
}

/// Validates a username against the account policy
///
/// Usernames are 3-30 characters of ASCII letters, digits, and underscores.
///
/// # Errors
///
/// Returns `AuthError::InvalidUsername` describing the violated rule
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be between {} and {} characters long",
            USERNAME_MIN, USERNAME_MAX
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthError::InvalidUsername(
            "Username may only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password against the account policy
///
/// # Errors
///
/// Returns `AuthError::InvalidPassword` if the password is too short
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < PASSWORD_MIN {
        return Err(AuthError::InvalidPassword);
    }
    Ok(())
}

fn issue_token(user: &User, secret: &str) -> Result<String, AuthError> {
    let claims = Claims::new(user.id, &user.username, &user.name);
    Ok(create_token(&claims, secret)?)
}

/// Registers a new account and signs it in
///
/// Validates the username, password, and display name, rejects duplicate
/// usernames, hashes the password, and stores the user. On success the new
/// account is immediately authenticated.
///
/// # Errors
///
/// Returns a validation error, `AuthError::DuplicateUsername`, or an
/// underlying database/hashing error
pub async fn register(
    pool: &SqlitePool,
    secret: &str,
    username: &str,
    password: &str,
    name: &str,
) -> Result<AuthSuccess, AuthError> {
    let username = username.trim();
    let name = name.trim();

    validate_username(username)?;
    validate_password(password)?;
    if name.is_empty() {
        return Err(AuthError::InvalidName);
    }

    if User::find_by_username(pool, username).await?.is_some() {
        warn!(username, "Registration rejected: username taken");
        return Err(AuthError::DuplicateUsername);
    }

    let password_hash = hash_password(password)?;

    let user = User::create(
        pool,
        CreateUser {
            username: username.to_string(),
            password_hash,
            name: name.to_string(),
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "User registered");

    let token = issue_token(&user, secret)?;
    Ok(AuthSuccess {
        token,
        user: user.into(),
    })
}

/// Authenticates a user by username and password
///
/// # Errors
///
/// Returns `AuthError::UserNotFound` if no account exists with the
/// username, or `AuthError::InvalidCredentials` if the password does not
/// match
pub async fn login(
    pool: &SqlitePool,
    secret: &str,
    username: &str,
    password: &str,
) -> Result<AuthSuccess, AuthError> {
    let user = User::find_by_username(pool, username.trim())
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = user.id, username = %user.username, "User logged in");

    let token = issue_token(&user, secret)?;
    Ok(AuthSuccess {
        token,
        user: user.into(),
    })
}

/// Verifies a token and returns the current view of its subject
///
/// The token must be authentic and unexpired, and the subject must still
/// exist.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired`, `AuthError::TokenInvalid`, or
/// `AuthError::UserNotFound`
pub async fn verify(pool: &SqlitePool, secret: &str, token: &str) -> Result<PublicUser, AuthError> {
    let claims = validate_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(user.into())
}

/// Trades an authentic token for a fresh one
///
/// The presented token may be expired; only its signature must check out.
/// The subject is re-read from the database so the new token carries
/// current account details, and deleted accounts cannot refresh.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` for a bad signature or
/// `AuthError::UserNotFound` if the subject no longer exists
pub async fn refresh(
    pool: &SqlitePool,
    secret: &str,
    token: &str,
) -> Result<AuthSuccess, AuthError> {
    let claims =
        decode_ignoring_expiry(token, secret).map_err(|_| AuthError::TokenInvalid)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    info!(user_id = user.id, "Token refreshed");

    let token = issue_token(&user, secret)?;
    Ok(AuthSuccess {
        token,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::{create_pool, DatabaseConfig};
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

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

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice_123").is_ok());
        assert!(validate_username("ab").is_err()); // too short
        assert!(validate_username(&"a".repeat(31)).is_err()); // too long
        assert!(validate_username("alice!").is_err()); // bad character
        assert!(validate_username("al ice").is_err()); // space
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let pool = test_pool().await;

        let registered = register(&pool, SECRET, "alice", "password123", "Alice Example")
            .await
            .expect("Register should succeed");
        assert_eq!(registered.user.username, "alice");
        assert!(!registered.token.is_empty());

        // The issued token verifies
        let verified = verify(&pool, SECRET, &registered.token)
            .await
            .expect("Verify should succeed");
        assert_eq!(verified.id, registered.user.id);

        let logged_in = login(&pool, SECRET, "alice", "password123")
            .await
            .expect("Login should succeed");
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_trims_input() {
        let pool = test_pool().await;

        let result = register(&pool, SECRET, "  alice  ", "password123", "  Alice  ")
            .await
            .expect("Register should succeed");
        assert_eq!(result.user.username, "alice");
        assert_eq!(result.user.name, "Alice");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let pool = test_pool().await;

        register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("First register should succeed");

        let result = register(&pool, SECRET, "alice", "other-password", "Other Alice").await;
        assert!(matches!(result, Err(AuthError::DuplicateUsername)));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let pool = test_pool().await;

        let result = register(&pool, SECRET, "a", "password123", "Alice").await;
        assert!(matches!(result, Err(AuthError::InvalidUsername(_))));

        let result = register(&pool, SECRET, "alice", "short", "Alice").await;
        assert!(matches!(result, Err(AuthError::InvalidPassword)));

        let result = register(&pool, SECRET, "alice", "password123", "   ").await;
        assert!(matches!(result, Err(AuthError::InvalidName)));
    }

    #[tokio::test]
    async fn test_login_distinguishes_missing_user_from_bad_password() {
        let pool = test_pool().await;

        register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("Register should succeed");

        let result = login(&pool, SECRET, "ghost", "password123").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));

        let result = login(&pool, SECRET, "alice", "wrong-password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_and_tampered_tokens() {
        let pool = test_pool().await;

        let registered = register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("Register should succeed");

        // Expired token (past the 60s validation leeway)
        let expired_claims = Claims::with_expiration(
            registered.user.id,
            "alice",
            "Alice",
            Duration::seconds(-3600),
        );
        let expired = create_token(&expired_claims, SECRET).unwrap();
        let result = verify(&pool, SECRET, &expired).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));

        // Token signed with a different secret
        let forged = create_token(
            &Claims::new(registered.user.id, "alice", "Alice"),
            "some-other-secret-key-32-bytes-xx",
        )
        .unwrap();
        let result = verify(&pool, SECRET, &forged).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_accepts_expired_token() {
        let pool = test_pool().await;

        let registered = register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("Register should succeed");

        let expired_claims = Claims::with_expiration(
            registered.user.id,
            "alice",
            "Alice",
            Duration::seconds(-3600),
        );
        let expired = create_token(&expired_claims, SECRET).unwrap();

        let refreshed = refresh(&pool, SECRET, &expired)
            .await
            .expect("Refresh should succeed");
        assert_eq!(refreshed.user.id, registered.user.id);

        // The replacement token is good again
        let verified = verify(&pool, SECRET, &refreshed.token)
            .await
            .expect("New token should verify");
        assert_eq!(verified.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_refresh_rejects_tampered_token() {
        let pool = test_pool().await;

        register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("Register should succeed");

        let forged = create_token(
            &Claims::new(1, "alice", "Alice"),
            "some-other-secret-key-32-bytes-xx",
        )
        .unwrap();

        let result = refresh(&pool, SECRET, &forged).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_deleted_user() {
        let pool = test_pool().await;

        let registered = register(&pool, SECRET, "alice", "password123", "Alice")
            .await
            .expect("Register should succeed");

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(registered.user.id)
            .execute(&pool)
            .await
            .expect("Delete should succeed");

        let result = refresh(&pool, SECRET, &registered.token).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }
}
