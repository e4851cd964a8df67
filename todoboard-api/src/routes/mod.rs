/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, verify)
/// - `todos`: Board endpoints
/// - `users`: User endpoints

pub mod auth;
pub mod health;
pub mod todos;
pub mod users;
