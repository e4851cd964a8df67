/// JWT token generation and validation module
///
/// This module provides JWT (JSON Web Token) functionality for user authentication.
/// Tokens are signed using HS256 (HMAC-SHA256) and carry the user's identity so
/// request handlers never need a database round-trip to know who is calling.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable (default 24 hours)
/// - **Validation**: Signature and expiration checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use todoboard_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, "alice", "Alice Example");
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom Claims
///
/// - `username`: Login name of the subject
/// - `name`: Display name of the subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: i64,

    /// Login name (custom claim)
    pub username: String,

    /// Display name (custom claim)
    pub name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Default token lifetime
    pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

    /// Creates new claims with the default 24-hour expiration
    ///
    /// # Arguments
    ///
    /// * `user_id` - User ID (subject)
    /// * `username` - Login name
    /// * `name` - Display name
    ///
    /// # Example
    ///
    /// ```
    /// use todoboard_shared::auth::jwt::Claims;
    ///
    /// let claims = Claims::new(1, "alice", "Alice Example");
    /// assert_eq!(claims.sub, 1);
    /// ```
    pub fn new(user_id: i64, username: &str, name: &str) -> Self {
        Self::with_expiration(
            user_id,
            username,
            name,
            Duration::hours(Self::DEFAULT_LIFETIME_HOURS),
        )
    }

    /// Creates claims with a custom expiration
    ///
    /// A negative duration produces an already-expired token, which is
    /// useful for exercising the refresh path in tests.
    pub fn with_expiration(user_id: i64, username: &str, name: &str, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            username: username.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Arguments
///
/// * `claims` - Token claims
/// * `secret` - Secret key for signing (should be at least 32 bytes)
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies that the signature is valid and the token has not expired.
///
/// # Arguments
///
/// * `token` - JWT token string
/// * `secret` - Secret key used for signing
///
/// # Errors
///
/// Returns `JwtError::Expired` if the token is past its expiration, or
/// `JwtError::ValidationError` for any other validation failure (bad
/// signature, malformed token, wrong algorithm).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Decodes a token while ignoring its expiration
///
/// The signature is still verified; only the `exp` check is skipped. This
/// backs the refresh flow, where an expired-but-authentic token is traded
/// for a fresh one.
///
/// # Errors
///
/// Returns `JwtError::ValidationError` if the signature is invalid or the
/// token is malformed.
pub fn decode_ignoring_expiry(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| JwtError::ValidationError(format!("Token validation failed: {}", e)))?;

    Ok(token_data.claims)
}
