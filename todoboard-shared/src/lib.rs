//! # Todoboard Shared Library
//!
//! This crate contains the storage layer, models, authentication primitives,
//! and business logic shared by the Todoboard API server.
//!
//! ## Module Organization
//!
//! - `db`: SQLite connection pool and migrations
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, bearer tokens, and the auth request context
//! - `service`: The auth and todo services with their typed error taxonomies

pub mod auth;
pub mod db;
pub mod models;
pub mod service;

/// Current version of the todoboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
