/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory test database with migrations applied
/// - Router construction with a fixed test configuration
/// - Request helpers that drive the router through `tower::Service`
/// - Registration/login shortcuts

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use todoboard_api::app::{build_router, AppState};
use todoboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use todoboard_shared::db::migrations::run_migrations;
use todoboard_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use tower::Service as _;

/// JWT secret used by every test context
pub const TEST_SECRET: &str = "integration-test-secret-key-32-bytes-min";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context with a fresh in-memory database
    ///
    /// The pool is capped at one connection: every connection to
    /// `sqlite::memory:` opens its own database, so a second connection
    /// would see an empty schema.
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_pool(PoolConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await?;

        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends a request and returns the status plus the parsed JSON body
    ///
    /// An empty response body parses as `Value::Null`.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("Should build request"),
            None => builder.body(Body::empty()).expect("Should build request"),
        };

        let response = self
            .app
            .clone()
            .call(request)
            .await
            .expect("Request should not fail at the transport level");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body should be JSON")
        };

        (status, json)
    }

    /// Registers a user and returns the response body (token + user)
    pub async fn register(&self, username: &str, password: &str, name: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "password": password,
                    "name": name,
                })),
            )
            .await;

        assert_eq!(
            status,
            StatusCode::CREATED,
            "Registration of '{}' failed: {}",
            username,
            body
        );
        body
    }
}

/// Extracts the token string from an auth response body
pub fn token_of(auth_body: &Value) -> &str {
    auth_body["token"].as_str().expect("Body should carry a token")
}

/// Extracts the user id from an auth response body
pub fn user_id_of(auth_body: &Value) -> i64 {
    auth_body["user"]["id"].as_i64().expect("Body should carry a user id")
}
