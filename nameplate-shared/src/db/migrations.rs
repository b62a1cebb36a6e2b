/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root, one `.sql` file
/// per schema step, and are embedded at compile time.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
