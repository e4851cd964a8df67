/// Database schema migrations
///
/// Migrations live in the crate's `migrations/` directory and are embedded
/// into the binary at compile time, so a deployed binary can bring any
/// database up to date without shipping SQL files alongside it.

use sqlx::SqlitePool;
use tracing::info;

/// Runs all pending migrations against the database
///
/// Migrations are applied in order and each is recorded in the
/// `_sqlx_migrations` table, so running this repeatedly is a no-op once the
/// schema is current.
///
/// # Errors
///
/// Returns an error if a migration fails to apply
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations completed");
    Ok(())
}
