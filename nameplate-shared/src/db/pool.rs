/// Database connection pool management
///
/// # Example
///
/// ```no_run
/// use nameplate_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig {
///     url: std::env::var("DATABASE_URL").unwrap(),
///     ..Default::default()
/// };
///
/// let pool = create_pool(config).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connect_timeout_seconds: 30,
        }
    }
}

/// Creates a PostgreSQL connection pool and verifies connectivity before
/// returning it.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        connect_timeout_seconds = config.connect_timeout_seconds,
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Executes a trivial query to verify the database is reachable.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if one == 1 {
        Ok(())
    } else {
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}
